pub mod gemini_client;
pub mod sheets_client;

pub use gemini_client::{GeminiClient, TextGeneration};
pub use sheets_client::{SheetsClient, SpreadsheetBackend};
