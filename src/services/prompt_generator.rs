//! Prompt generator - service layer
//!
//! Only knows how to get one image prompt out of the model. No retries, no
//! spreadsheet, no flow.

use tracing::{error, info, warn};

use crate::classification::classify_generation;
use crate::clients::TextGeneration;
use crate::error::StepError;
use crate::models::GeneratedPrompt;

/// Fixed instruction sent on every run
pub const PROMPT_INSTRUCTION: &str = r#"You are an expert AI Art Director.
Your task is to generate EXACTLY ONE creative image prompt.

### STYLE GUIDELINES:
1. Structure: A descriptive main subject followed by comma-separated artistic keywords (lighting, style, vibe).
2. Creativity: Choose a random theme (Cyberpunk, Fantasy, Horror, Realistic, or Abstract).
3. Format: Output ONLY the raw text. Do not use quotes (""), do not use Markdown (**), do not add introductory text.

### EXAMPLES (Follow this pattern):
- A rice field terrace in Bali but in a floating island setting, waterfalls falling into the void, fantasy art style, vibrant colors.
- A silhouette of a woman standing at the end of a dark hallway, glowing eyes in the shadow, holding a lantern, horror mystery vibe, cinematic lighting.
- Isometric view of a dream gaming room, RGB lighting, shelves full of robot figures, cozy atmosphere, digital art, 4k render.

### YOUR TASK:
Generate 1 new, unique image prompt now."#;

/// Prompt generator
///
/// Responsibilities:
/// - send the fixed instruction, exactly once per call
/// - trim and validate the answer
/// - turn any fault into a sanitized `StepError`
pub struct PromptGenerator<G> {
    generator: G,
}

impl<G: TextGeneration> PromptGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// One attempt at a prompt
    pub async fn generate(&self) -> Result<GeneratedPrompt, StepError> {
        match self.generator.generate(PROMPT_INSTRUCTION).await {
            Ok(text) => match text.as_deref().and_then(GeneratedPrompt::new) {
                Some(prompt) => {
                    info!("✅ Generated Prompt: {}", prompt);
                    Ok(prompt)
                }
                None => {
                    warn!("⚠️ Warning: Gemini returned an empty response.");
                    Err(StepError::EmptyGenerationResult)
                }
            },
            Err(fault) => {
                let err = StepError::Generation(classify_generation(&fault));
                error!("{}", err);
                Err(err)
            }
        }
    }
}
