// src/config/vars.rs

//! `$(NAME)` / `${NAME}` expansion for recipe lines.
//!
//! A name is looked up in `[vars]` first, then in the process environment,
//! the way make falls back to environment variables. `$$` produces a literal
//! `$`. Any other `$` (for example `$HOME` or `$1`) is passed through
//! untouched so the shell can expand it.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\(([A-Za-z_][A-Za-z0-9_]*)\)|\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("variable reference pattern is valid")
});

/// Expand variable references in `input`.
///
/// Returns the name of the first variable defined neither in `vars` nor in
/// the environment as the error.
pub fn expand(input: &str, vars: &IndexMap<String, String>) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for caps in VAR_REF.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&input[last..whole.start()]);
        last = whole.end();

        let name = caps.get(1).or_else(|| caps.get(2));
        match name {
            None => out.push('$'),
            Some(name) => out.push_str(&lookup(name.as_str(), vars)?),
        }
    }

    out.push_str(&input[last..]);
    Ok(out)
}

fn lookup(name: &str, vars: &IndexMap<String, String>) -> Result<String, String> {
    if let Some(value) = vars.get(name) {
        return Ok(value.clone());
    }
    std::env::var(name).map_err(|_| name.to_string())
}
