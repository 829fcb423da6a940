use anyhow::Context;
use loupe::{api::ApiClient, config::Config, logging, ui::run_ui, App};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let _logger = logging::init(&config.log_level).context("failed to start logging")?;
    log::info!("starting loupe against {}", config.endpoint);

    let api = ApiClient::new(&config);
    let app = App::new(config.page_length);
    run_ui(api, app).await
}
