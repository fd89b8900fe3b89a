//! # Prompt Sheet Flow
//!
//! Generates one AI image prompt with Gemini and appends it to a Google Sheet.
//!
//! ## Architecture
//!
//! ### ① Infrastructure
//! - `infrastructure/` - retry policy, service-account token exchange
//!
//! ### ② Clients
//! - `clients/` - the two remote services behind `TextGeneration` and `SpreadsheetBackend`
//!
//! ### ③ Services
//! - `PromptGenerator` - one prompt, validated and sanitized
//! - `SheetAppender` - one row into the intake worksheet
//!
//! ### ④ Workflow
//! - `PromptFlow` - generate → check → append, then flow-level classification
//!
//! ### ⑤ Orchestration
//! - `App` - run once or serve on an interval
//!
//! Failures are classified by `classification` into the fixed `ErrorCategory`
//! set; no component lets raw remote error text escape.

pub mod classification;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

pub use config::{Config, RunMode};
pub use error::{ErrorCategory, FlowError, FlowHalt, RemoteFault, StepError};
pub use models::GeneratedPrompt;
pub use orchestrator::App;
pub use workflow::{PromptFlow, RunCtx};
