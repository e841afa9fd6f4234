mod application;
mod domain;
mod infrastructure;
mod presentation;

use clap::Parser;
use crate::infrastructure::http_client::HyperHttpClient;
use crate::infrastructure::{logging, signals};
use crate::presentation::cli::Cli;
use crate::presentation::exit::ExitStatus;

/// http CLI: send one HTTP request and render the response
///
/// Builds the request from the method, URL, merged `-H`/`-Q` arguments and at
/// most one body source, then prints the status line and headers. Known binary
/// payloads (png, jpeg, pdf, webm) are saved to fixed file names; anything else
/// is decoded and printed under `BODY:`. Ctrl+C removes partial files and exits.
#[tokio::main]
async fn main() -> ExitStatus {
    let cancel = signals::install_interrupt_handler();
    let cli = Cli::parse();
    let config = cli.config();

    if let Err(err) = logging::init(config.verbose) {
        eprintln!("{:#}", err);
    }

    let request_service = HyperHttpClient::new().create_request_service();

    let status = cli.execute(&request_service, config, &cancel, std::io::stdout()).await;
    if status == ExitStatus::Interrupted {
        // File guards have already run; a body read stuck in the blocking pool
        // would otherwise hold up runtime shutdown.
        std::process::exit(ExitStatus::Interrupted as i32);
    }
    status
}
