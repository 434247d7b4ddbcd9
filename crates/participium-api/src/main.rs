mod api_doc;
mod constants;
mod error;
mod handlers;
mod services;
mod setup;
mod state;
mod telemetry;
mod tus;

use participium_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env in development; ignore if absent
    dotenvy::dotenv().ok();

    telemetry::init_tracing();

    let config = Config::from_env()?;

    // Initialize the application (database, services, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, router).await?;

    Ok(())
}
