use clap::Parser;
use mandala::config::setup_logging;
use mandala::generation::GenerationClient;
use tracing::error;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = mandala::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }

    let client = match GenerationClient::new(&cli.generation) {
        Ok(client) => client,
        Err(err) => {
            error!("Failed to set up the image API client: {}", err);
            return;
        }
    };

    if let Err(err) = mandala::web::setup_server(
        &cli.listen_address,
        cli.port,
        client,
        cli.generation.prompt_mode,
    )
    .await
    {
        error!("Application error: {}", err);
    }
}
