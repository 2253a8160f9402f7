use std::sync::Arc;

use dotenvy::dotenv;
use lambda_runtime::{service_fn, LambdaEvent};
use notes_resolver::{
    api,
    infrastructure::{config::Config, state::AppState},
    telemetry,
};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    telemetry::init();
    let config = Arc::new(Config::from_env()?);
    let state = Arc::new(AppState::from_config(Arc::clone(&config)).await?);
    info!(
        provider = %config.store.provider,
        table = %config.store.table_name,
        "starting notes resolver"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        api::handle_event(Arc::clone(&state), event)
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}
