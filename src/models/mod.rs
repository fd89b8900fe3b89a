pub mod prompt;
pub mod worksheet;

pub use prompt::GeneratedPrompt;
pub use worksheet::{WorksheetHandle, WorksheetNames, WorksheetPair};
