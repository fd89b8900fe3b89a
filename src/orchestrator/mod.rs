//! Orchestration layer
//!
//! ```text
//! orchestrator::App      (run mode, lifecycle)
//!     ↓
//! workflow::PromptFlow   (one run)
//!     ↓
//! services               (generate / append)
//!     ↓
//! clients                (Gemini / Sheets)
//!     ↓
//! infrastructure         (retry, service-account auth)
//! ```

pub mod app;

pub use app::{App, ServeStats};
