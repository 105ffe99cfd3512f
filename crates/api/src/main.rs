use anyhow::Context;

use paydesk_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    paydesk_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        fee_rate = %config.wallet.fee_rate,
        seed_balance = %config.wallet.seed_balance,
        "wallet configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let app = paydesk_api::app::build_app(config.wallet);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
