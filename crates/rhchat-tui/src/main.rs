// rhchat entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, the terminal belongs to the TUI)
// 2. Load config
// 3. Build the API client
// 4. Create channels and the session
// 5. Spawn the session loop
// 6. Run the TUI until the user quits
// 7. Wait briefly for the session loop to finish

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use rhchat_api::ApiClient;
use rhchat_app::{app, Session};
use rhchat_core::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("rhchat starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: {} v{}", config.app.name, config.app.version);

    let client = ApiClient::from_config(&config).context("failed to build HTTP client")?;
    info!("HTTP client ready for {}", client.base_url());

    let (api_tx, api_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let session = Session::new(config.chat.clone(), Arc::new(client), api_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(api_rx, cmd_rx, ui_tx, session).await {
            error!("Session loop error: {}", e);
        }
    });

    if let Err(e) = rhchat_tui::run(ui_rx, cmd_tx, &config).await {
        error!("TUI error: {}", e);
    }

    // The TUI dropped its command sender, so the session loop is winding down.
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    info!("rhchat shut down cleanly");
    Ok(())
}

/// Log to `logs/rhchat.log`; stdout is owned by the TUI.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("rhchat.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("rhchat=info,rhchat_core=info,rhchat_api=info,rhchat_app=info,rhchat_tui=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
