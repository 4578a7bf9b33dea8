#![allow(dead_code)]

use indexmap::IndexMap;
use makedag::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use makedag::types::{RecipeSpec, TaskKindSpec};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                include: Vec::new(),
                config: ConfigSection::default(),
                vars: IndexMap::new(),
                task: IndexMap::new(),
            },
        }
    }

    /// Declare (or redeclare, replacing) a task.
    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.config.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_default_task(mut self, name: &str) -> Self {
        self.config.config.default_task = Some(name.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A phony task with no recipe.
    pub fn new() -> Self {
        Self {
            task: TaskConfig {
                kind: TaskKindSpec::Phony,
                deps: vec![],
                cmd: RecipeSpec::Lines(vec![]),
            },
        }
    }

    /// A phony task with a one-line recipe.
    pub fn phony(cmd: &str) -> Self {
        Self::new().cmd(cmd)
    }

    /// A file-backed task with a one-line recipe.
    pub fn file(cmd: &str) -> Self {
        let mut builder = Self::new().cmd(cmd);
        builder.task.kind = TaskKindSpec::File;
        builder
    }

    pub fn dep(mut self, dep: &str) -> Self {
        self.task.deps.push(dep.to_string());
        self
    }

    /// Append a recipe line.
    pub fn cmd(mut self, line: &str) -> Self {
        let mut lines = self.task.cmd.lines();
        lines.push(line.to_string());
        self.task.cmd = RecipeSpec::Lines(lines);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The zeroconf developer workflow, as shipped in `Makedag.toml` after the
/// release layer has been applied.
pub fn zeroconf_workflow() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_var("MAX_LINE_LENGTH", "110")
        .with_task(
            "virtualenv",
            TaskConfigBuilder::new().dep("env/requirements.built").build(),
        )
        .with_task("env", TaskConfigBuilder::phony("virtualenv env").build())
        .with_task(
            "./env/requirements.built",
            TaskConfigBuilder::file("./env/bin/pip install -r requirements-dev.txt")
                .cmd("cp requirements-dev.txt ./env/requirements.built")
                .dep("env")
                .dep("requirements-dev.txt")
                .build(),
        )
        .with_task(
            "flake8",
            TaskConfigBuilder::phony("flake8 --max-line-length=$(MAX_LINE_LENGTH) examples *.py")
                .build(),
        )
        .with_task("test", TaskConfigBuilder::phony("nosetests -v").build())
        .with_task(
            "test_coverage",
            TaskConfigBuilder::phony("nosetests -v --with-coverage --cover-package=zeroconf")
                .build(),
        )
        .with_task(
            "autopep8",
            TaskConfigBuilder::phony("autopep8 --max-line-length=$(MAX_LINE_LENGTH) -i examples *.py")
                .build(),
        )
        .with_task("clean", TaskConfigBuilder::phony("-rm -rf dist").build())
        .with_task(
            "dist",
            TaskConfigBuilder::phony("python setup.py sdist --formats=gztar > /dev/null")
                .cmd("python setup.py bdist_wheel")
                .cmd("ls -l dist")
                .dep("clean")
                .build(),
        )
        .with_task(
            "release",
            TaskConfigBuilder::phony("twine upload --sign dist/*")
                .dep("dist")
                .build(),
        )
        .build()
}
