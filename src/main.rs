use squat_tracker::{
    router, AppState, CompletionTracker, FileMedium, PersistentStore, TrackerConfig,
};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let config = TrackerConfig::from_env()?;
    fs::create_dir_all(&config.data_dir).await?;

    let medium = FileMedium::new(config.data_dir.clone());
    info!(path = %medium.path_for(&config.storage_key).display(), "using data file");

    let mut tracker = CompletionTracker::new(PersistentStore::new(medium, config.storage_key));
    tracker.initialize().await;

    info!(
        start = config.window.start(),
        end = config.window.end(),
        "tracking hours"
    );
    let app = router(AppState::new(config.window, tracker));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` when it is set and valid, `info` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn log_filter_keeps_quieter_env_level() {
        let filter = log_filter(Some("warn".to_string()));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
