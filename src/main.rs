// src/main.rs

use makedag::engine::InvocationOutcome;
use makedag::errors::Result;
use makedag::{cli, exit_status, logging, run};

#[tokio::main]
async fn main() {
    let result = run_main().await;
    match &result {
        Ok(outcome) => report(outcome),
        Err(err) => eprintln!("makedag: *** {err}"),
    }
    std::process::exit(exit_status(&result));
}

async fn run_main() -> Result<InvocationOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

fn report(outcome: &InvocationOutcome) {
    match outcome {
        InvocationOutcome::Succeeded => {}
        InvocationOutcome::Failed { task, exit_code } => {
            eprintln!("makedag: *** [{task}] Error {exit_code}");
        }
        InvocationOutcome::Interrupted => eprintln!("makedag: *** Interrupted"),
    }
}
