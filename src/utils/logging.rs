/// Logging helpers
///
/// Subscriber setup plus the banner and formatting helpers used by the
/// orchestrator.
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, RunMode};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
/// Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Log the startup banner
///
/// # Arguments
/// - `config`: loaded configuration; secrets are never printed
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Image Prompt Generator starting");
    info!("🤖 Model: {}", config.gemini_model_name);
    info!(
        "📊 Spreadsheet: {} (append -> {}, reserved -> {})",
        config.spreadsheet_name, config.process_worksheet, config.done_worksheet
    );
    info!(
        "🔁 Retries per step: {} (delay {}s)",
        config.task_retries, config.retry_delay_secs
    );
    match config.run_mode {
        RunMode::Once => info!("⏰ Mode: run once"),
        RunMode::Serve => info!("⏰ Mode: serve, every {}s", config.serve_interval_secs),
    }
    info!("{}", "=".repeat(60));
}

/// Log the serve-mode summary on shutdown
pub fn print_final_stats(success: usize, failed: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 Serve mode stopped");
    info!(
        "Stopped at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ Successful runs: {}", success);
    info!("❌ Failed runs: {}", failed);
    info!("{}", "=".repeat(60));
}

/// Truncate long text for log display
///
/// # Arguments
/// - `text`: input text
/// - `max_len`: maximum number of characters kept
///
/// # Returns
/// The first `max_len` characters followed by `...`, or the text unchanged
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
