//! Watch a page for new deployments and print a notice when one lands.
//!
//! Run with:
//! ```bash
//! RUST_LOG=deploy_watch=debug cargo run --example watch_page -- https://example.com/ 30
//! ```
//!
//! The second argument is the check interval in seconds (default 60).
//! Settings can also come from `deploy-watch.toml` or `DEPLOY_WATCH_*`
//! environment variables.

use deploy_watch::prelude::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let page_url = args
        .next()
        .unwrap_or_else(|| "https://example.com/".to_string());
    let interval_secs = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(60);

    let settings = SettingsLoader::new()
        .with_optional_file("deploy-watch.toml")
        .with_env_overrides("DEPLOY_WATCH")
        .load()?;

    println!("=== deploy-watch demo ===\n");
    println!("Watching {} every {}s", page_url, interval_secs);
    println!("Press Ctrl+C to stop\n");

    let mut monitor = UpdateMonitor::builder()
        .with_page_url(&page_url)
        .with_environment(RuntimeEnvironment::Production)
        .with_settings(&settings)
        .with_check_interval(Duration::from_secs(interval_secs))
        .on_new_version_available(|| {
            println!("A new version has been deployed. Reload to update.");
        })
        .build()?;

    let config = monitor.start()?;
    println!("Polling {} in {} mode", config.url, config.update_mode);

    tokio::signal::ctrl_c().await?;

    monitor.stop().await;
    println!("\nStopped.");
    Ok(())
}
