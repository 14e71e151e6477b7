use std::sync::Arc;

use frameshop_api::app::{build_app, AppState};
use frameshop_api::config::ApiConfig;
use frameshop_catalog::CatalogService;
use frameshop_orders::OrderWorkflow;
use frameshop_sellsy::{SellsyApi, SellsyConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    frameshop_observability::init();

    let config = ApiConfig::from_env();
    let sellsy = SellsyApi::over_http(SellsyConfig::from_env()?)?;

    let state = AppState {
        catalog: CatalogService::new(&config.data_dir),
        submitter: Arc::new(OrderWorkflow::new(sellsy)),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_dir = %config.data_dir.display(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
