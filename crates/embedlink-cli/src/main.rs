mod cli;
mod download;
mod logging;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init_logging() {
        eprintln!("embedlink: logging disabled: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("embedlink error: {:#}", err);
        std::process::exit(1);
    }
}
