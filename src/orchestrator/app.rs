//! Application - orchestration layer
//!
//! ## Responsibilities
//!
//! 1. **Initialization**: build both remote clients from the configuration once
//! 2. **Run mode**: a single run for external cron, or a fixed-interval loop
//! 3. **Exit status**: a failed single run becomes a non-zero exit
//!
//! Runs never overlap. In serve mode the next tick waits for the current run.

use std::future::Future;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::clients::{GeminiClient, SheetsClient, SpreadsheetBackend, TextGeneration};
use crate::config::{Config, RunMode};
use crate::services::{PromptGenerator, SheetAppender};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::{PromptFlow, RunCtx};

/// Application
pub struct App<G, B> {
    config: Config,
    flow: PromptFlow<G, B>,
}

/// Outcome counts for serve mode
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub success: usize,
    pub failed: usize,
}

impl App<GeminiClient, SheetsClient> {
    /// Build the live application. Key file and HTTP client problems surface here.
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let gemini = GeminiClient::new(&config)?;
        let sheets = SheetsClient::new(&config)?;
        info!("🔐 Spreadsheet access as {}", sheets.client_email());

        let flow = PromptFlow::new(
            PromptGenerator::new(gemini),
            SheetAppender::new(sheets, config.spreadsheet_name.clone(), config.worksheet_names()),
            config.retry_policy(),
        );

        Ok(Self::with_flow(config, flow))
    }
}

impl<G: TextGeneration, B: SpreadsheetBackend> App<G, B> {
    pub fn with_flow(config: Config, flow: PromptFlow<G, B>) -> Self {
        Self { config, flow }
    }

    pub fn flow(&self) -> &PromptFlow<G, B> {
        &self.flow
    }

    /// Run according to the configured mode
    pub async fn run(&self) -> Result<()> {
        match self.config.run_mode {
            RunMode::Once => self.run_once().await,
            RunMode::Serve => {
                self.serve(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Could not listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
                Ok(())
            }
        }
    }

    /// One run; a halted flow is an error
    pub async fn run_once(&self) -> Result<()> {
        self.flow.run(&RunCtx::new(1)).await?;
        Ok(())
    }

    /// Run on the configured interval until `shutdown` resolves.
    ///
    /// Failed runs are counted and the loop continues.
    pub async fn serve(&self, shutdown: impl Future<Output = ()>) -> Result<ServeStats> {
        let mut ticker = interval(self.config.serve_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut stats = ServeStats::default();
        let mut run_number = 0u64;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested, leaving serve mode");
                    break;
                }
                _ = ticker.tick() => {
                    run_number += 1;
                    match self.flow.run(&RunCtx::new(run_number)).await {
                        Ok(_) => stats.success += 1,
                        Err(_) => stats.failed += 1,
                    }
                }
            }
        }

        print_final_stats(stats.success, stats.failed);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::{FakeGenerator, FakeSheets};
    use crate::error::{FlowHalt, RemoteFault};
    use crate::infrastructure::RetryPolicy;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn app(generator: FakeGenerator, sheets: FakeSheets, config: Config) -> App<FakeGenerator, FakeSheets> {
        let flow = PromptFlow::new(
            PromptGenerator::new(generator),
            SheetAppender::new(sheets, config.spreadsheet_name.clone(), config.worksheet_names()),
            RetryPolicy::none(),
        );
        App::with_flow(config, flow)
    }

    #[tokio::test]
    async fn test_run_once_success() {
        let app = app(FakeGenerator::replying("X"), FakeSheets::healthy(), Config::default());

        assert_ok!(app.run().await);
        assert_eq!(app.flow().appender().backend().appended().len(), 1);
    }

    #[tokio::test]
    async fn test_run_once_failure_carries_only_sanitized_halt() {
        let app = app(
            FakeGenerator::failing(RemoteFault::from_description("403 key AIzaSyLEAKED")),
            FakeSheets::healthy(),
            Config::default(),
        );

        let err = assert_err!(app.run_once().await);

        assert_eq!(err.downcast_ref::<FlowHalt>(), Some(&FlowHalt::Permission));
        assert!(!format!("{:#}", err).contains("AIzaSy"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_runs_until_shutdown_and_survives_failures() {
        let config = Config {
            run_mode: RunMode::Serve,
            serve_interval_secs: 1,
            ..Config::default()
        };
        let generator = FakeGenerator::scripted(vec![
            Err(RemoteFault::http(500, "boom")),
            Ok(Some("X".to_string())),
        ]);
        let app = app(generator, FakeSheets::healthy(), config);

        // Paused clock: first tick fires immediately, second after one second
        let stats = app
            .serve(tokio::time::sleep(Duration::from_millis(1500)))
            .await
            .unwrap();

        assert_eq!(stats, ServeStats { success: 1, failed: 1 });
        assert_eq!(app.flow().appender().backend().appended().len(), 1);
    }
}
