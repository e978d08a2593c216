use clap::Parser;
use std::process::ExitCode;
use tabula_app::{cli::Cli, commands, logging};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(logging::default_config().with_json_logs(cli.log_file)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
