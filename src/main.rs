// src/main.rs

use std::process::ExitCode;

use cmdpipe::{cli, logging, run};

fn main() -> ExitCode {
    match run_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("cmdpipe error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)
}
