use tracing::{error, info};
use window_stats::observability::init_tracing;
use window_stats::server::StatsServer;
use window_stats::{Config, EvictionScheduler, StatsEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!(
        window_ms = config.window.window_ms,
        tick_ms = config.window.tick_interval.as_millis() as u64,
        policy = ?config.window.eviction_policy,
        "starting window-stats"
    );

    let engine = StatsEngine::new(config.window.clone());
    let scheduler = EvictionScheduler::new(engine.clone()).spawn();

    let server = StatsServer::bind(&config.server, engine).await?;

    tokio::select! {
        _ = server.run() => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                error!("Failed to listen for ctrl-c: {}", e);
            }
            info!("shutdown requested");
        }
    }

    scheduler.shutdown().await;
    Ok(())
}
