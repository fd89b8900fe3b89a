//! Prompt flow - workflow layer
//!
//! Defines one complete run:
//! 1. generate a prompt (retried)
//! 2. re-check it
//! 3. append it to the intake worksheet (retried)
//!
//! Any failure is reduced to a flow-level `FlowHalt`.

use tracing::{error, info, warn};

use crate::classification::classify_flow;
use crate::clients::{SpreadsheetBackend, TextGeneration};
use crate::error::{FlowError, FlowHalt, Step};
use crate::infrastructure::RetryPolicy;
use crate::models::GeneratedPrompt;
use crate::services::{PromptGenerator, SheetAppender};
use crate::workflow::run_ctx::RunCtx;

/// Prompt flow
///
/// - sequences the two steps, each under the retry policy
/// - holds no state between runs
/// - only depends on the services
pub struct PromptFlow<G, B> {
    generator: PromptGenerator<G>,
    appender: SheetAppender<B>,
    retry: RetryPolicy,
}

impl<G: TextGeneration, B: SpreadsheetBackend> PromptFlow<G, B> {
    pub fn new(
        generator: PromptGenerator<G>,
        appender: SheetAppender<B>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            appender,
            retry,
        }
    }

    pub fn generator(&self) -> &PromptGenerator<G> {
        &self.generator
    }

    pub fn appender(&self) -> &SheetAppender<B> {
        &self.appender
    }

    /// Execute one run. Returns the stored prompt on success.
    pub async fn run(&self, ctx: &RunCtx) -> Result<GeneratedPrompt, FlowHalt> {
        info!("{} ▶️ Flow started", ctx);

        match self.run_steps(ctx).await {
            Ok(prompt) => {
                info!("{} ✅ Flow completed successfully.", ctx);
                Ok(prompt)
            }
            Err(err) => {
                let halt = classify_flow(&err);
                error!("{} {}", ctx, halt);
                Err(halt)
            }
        }
    }

    async fn run_steps(&self, ctx: &RunCtx) -> Result<GeneratedPrompt, FlowError> {
        // ========== Step 1: generate ==========
        info!("{} 🎨 Generating image prompt...", ctx);
        let prompt = self
            .retry
            .run(&Step::Generate.to_string(), |_| self.generator.generate())
            .await?;

        // GeneratedPrompt already guarantees this; the flow does not rely on it
        if prompt.as_str().trim().is_empty() {
            warn!("{} ⚠️ Flow Interrupted: Generated prompt is invalid.", ctx);
            return Err(FlowError::InvalidGeneratorOutput);
        }

        // ========== Step 2: append ==========
        info!("{} 📤 Appending prompt to spreadsheet...", ctx);
        self.retry
            .run(&Step::Append.to_string(), |_| {
                self.appender.append(Some(prompt.as_str()))
            })
            .await?;

        Ok(prompt)
    }
}
