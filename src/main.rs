//! Thoth Studio - Main Entry Point
//!
//! Desktop editor for Thoth data-processing pipelines. Pipelines are stored
//! on the Brain server; the editor talks to it from a background thread.

use thoth_studio::{
    backend::{spawn_worker, BrainClient},
    config::{self, AppConfig, AppState},
    frontend::ThothApp,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Log to stdout and, when the data dir is writable, to a daily file.
    let (file_layer, _log_guard) = match config::ensure_app_data_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), "thoth-studio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,thoth_studio=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Starting Thoth Studio");

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();

    let client = BrainClient::new(&config.backend)?;
    let (bridge, worker) = spawn_worker(Box::new(client))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Thoth Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "Thoth Studio",
        native_options,
        Box::new(move |cc| {
            let mut style = (*cc.egui_ctx.style()).clone();
            style.visuals.window_shadow.offset = [0, 0];
            cc.egui_ctx.set_style(style);

            Ok(Box::new(ThothApp::new(
                cc,
                bridge,
                Some(worker),
                config,
                app_state,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    tracing::info!("Shutting down...");
    Ok(())
}
