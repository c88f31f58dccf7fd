//! RGSM frontend - headless shell for the game save manager state layer
//!
//! # Overview
//!
//! Wires the library together the way the desktop UI does, with toasts going
//! to the log and prompts to the terminal:
//! - Application settings ([`AppSettings`]) and logging
//! - Tokio runtime
//! - Shared context (state, notifications, loading stack)
//! - Host probe: the file-backed [`LocalBackend`] when `RGSM_HOST_IPC` is set,
//!   preview mode otherwise
//! - [`ConfigStore`] load, device registration and per-game path checks
//!
//! # Execution Flow
//!
//! 1. Load `rgsm.yaml` + `RGSM_*` settings
//! 2. Initialize logging -> logs/rgsm.<date>
//! 3. Build the context and probe the host
//! 4. Load the configuration document and register this device
//! 5. Offer to copy missing save paths for every game
//! 6. Wait for Ctrl+C, then dispose and log metrics

use anyhow::{Context, Result};
use rgsm_frontend::logging::{self, LOG_PREFIX};
use rgsm_frontend::services::check_current_device_save_paths;
use rgsm_frontend::ui::{ConsolePrompter, RenderBridge, TracingToastRenderer};
use rgsm_frontend::{
    APP_NAME, AppContext, AppSettings, Backend, ConfigStore, Host, LocalBackend, SoundPreferenceEditor,
    Translator, VERSION,
};
use std::sync::Arc;

const DEFAULT_LOCALE: &str = "en_US";

fn main() -> Result<()> {
    let settings = AppSettings::load()?;

    let _log_guard = logging::setup_logging_with_console(
        &settings.log_dir,
        LOG_PREFIX,
        settings.debug_mode,
        settings.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("rgsm-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(run(settings));

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    tracing::info!("Application shutdown complete");

    result
}

async fn run(settings: AppSettings) -> Result<()> {
    let translator = match &settings.locale_dir {
        Some(dir) => Translator::load(dir, DEFAULT_LOCALE)?,
        None => Translator::builtin(),
    };
    tracing::debug!("Messages for locale {}", translator.locale());

    let (bridge, render_loop) = RenderBridge::spawn(TracingToastRenderer);
    let ctx = AppContext::new(Arc::new(bridge), translator, settings.notification_settings());

    let device = settings.device()?;
    let config_file = settings.config_file.clone();
    let host = Host::probe(move || Arc::new(LocalBackend::new(&config_file, device)) as Arc<dyn Backend>);

    let forwarder = host
        .backend()
        .map(|backend| ctx.notifications.forward_backend_events(backend.subscribe()));

    let store = ConfigStore::new(host, ctx.clone());
    store.init().await;

    // Failures here have already been shown to the user
    match store.register_current_device().await {
        Ok(Some(device)) => reconcile_all(&store, &device.id).await,
        Ok(None) => tracing::debug!("No device to register in preview mode"),
        Err(e) => tracing::warn!("Skipping path checks: {}", e),
    }

    let sounds = SoundPreferenceEditor::new(Arc::clone(&store));
    if matches!(sounds.ensure_defaults(), Ok(true)) {
        let _ = store.save_config().await;
    }

    tracing::info!("Ready, press Ctrl+C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    tracing::info!("Shutting down");
    store.dispose();
    if let Some(forwarder) = forwarder {
        forwarder.abort();
    }
    ctx.notifications.shutdown();
    render_loop.abort();
    ctx.metrics.log_summary();

    Ok(())
}

async fn reconcile_all(store: &ConfigStore, device_id: &str) {
    let games: Vec<String> = store
        .read(|config| config.games.iter().map(|g| g.name.clone()).collect())
        .unwrap_or_default();

    let prompter = ConsolePrompter::new();
    for name in games {
        match check_current_device_save_paths(store, &prompter, &name, device_id).await {
            Ok(outcome) => tracing::debug!("Path check for {}: {:?}", name, outcome),
            Err(e) => tracing::warn!("Path check for {} failed: {}", name, e),
        }
    }
}
