pub mod prompt_generator;
pub mod sheet_appender;

pub use prompt_generator::{PromptGenerator, PROMPT_INSTRUCTION};
pub use sheet_appender::SheetAppender;
