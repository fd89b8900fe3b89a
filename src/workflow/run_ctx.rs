//! Run context
//!
//! Wraps "which run is this" for log lines

use std::fmt::Display;

use chrono::{DateTime, Local};

/// Context of one run
#[derive(Debug, Clone)]
pub struct RunCtx {
    /// 1-based, counts runs since process start
    pub run_number: u64,

    pub started_at: DateTime<Local>,
}

impl RunCtx {
    pub fn new(run_number: u64) -> Self {
        Self {
            run_number,
            started_at: Local::now(),
        }
    }
}

impl Display for RunCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[run #{} @ {}]",
            self.run_number,
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
