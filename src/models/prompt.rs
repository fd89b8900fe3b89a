use std::fmt;

/// A generated image prompt.
///
/// Always trimmed and never empty; the only constructor enforces both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrompt(String);

impl GeneratedPrompt {
    /// Trim `raw` and wrap it, or `None` if nothing is left
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeneratedPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims() {
        let prompt = GeneratedPrompt::new("\n  A neon koi pond, rain, cyberpunk vibe \t").unwrap();
        assert_eq!(prompt.as_str(), "A neon koi pond, rain, cyberpunk vibe");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(GeneratedPrompt::new("").is_none());
        assert!(GeneratedPrompt::new("   \n\t ").is_none());
    }
}
