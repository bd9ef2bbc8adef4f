//! Entry point for the `tft` binary.
#![forbid(unsafe_code)]

use tft_cli::CliError;

#[tokio::main]
async fn main() {
    match tft_cli::run().await {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("tft: {err}");
            std::process::exit(1);
        }
    }
}
