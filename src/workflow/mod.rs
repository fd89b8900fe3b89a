pub mod prompt_flow;
pub mod run_ctx;

pub use prompt_flow::PromptFlow;
pub use run_ctx::RunCtx;
