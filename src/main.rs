use std::sync::Arc;
use std::time::Duration;

use hostlink::api::{ApiService, Dispatcher, RegistryBuilder};
use hostlink::audit::AuditLog;
use hostlink::config::Config;
use hostlink::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let registry = RegistryBuilder::new().build();
    let mut dispatcher = Dispatcher::new(registry);
    if let Some(path) = &cfg.api_log_path {
        dispatcher = dispatcher.with_audit(AuditLog::open(path)?);
    }

    let mut server = Server::new(cfg.server.clone(), Arc::new(ApiService::new(dispatcher)));
    server.listen()?;

    let mut tick = tokio::time::interval(Duration::from_millis(cfg.tick_interval_ms));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                server.advance();
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                server.close();
                break;
            }
        }
    }

    Ok(())
}
