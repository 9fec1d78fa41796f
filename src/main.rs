use clap::Parser;
use thumbforge::config::setup_logging;
use thumbforge::web::AppState;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = thumbforge::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let state = AppState::new(
        cli.backends.composer(),
        cli.backends.content_generator(),
    );

    if let Err(err) = thumbforge::web::setup_server(&cli.listen_address, cli.port, state).await {
        error!("Application error: {}", err);
    }
}
