use clap::Parser;
use intake_publisher::cli::{self, Args};
use intake_publisher::core::error::AppError;
use intake_publisher::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    let _guard = match logging::init(&args.command) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("warning: logging disabled: {:#}", err);
            None
        }
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<AppError>() {
        Some(app) => {
            eprintln!("error[{}]: {}", app.code, app.message);
            if let Some(details) = &app.details {
                match serde_json::to_string_pretty(details) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("{}", details),
                }
            }
        }
        None => eprintln!("error: {:#}", err),
    }
}
