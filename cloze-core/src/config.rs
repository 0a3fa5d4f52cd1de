use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One line of the exercise: the blank sits between the two halves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    #[serde(default)]
    pub text_before: String,
    #[serde(default)]
    pub text_after: String,
}

impl Sentence {
    pub fn new(text_before: impl Into<String>, text_after: impl Into<String>) -> Self {
        Sentence {
            text_before: text_before.into(),
            text_after: text_after.into(),
        }
    }
}

/// Exercise definition as supplied by the host page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseConfig {
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answers: Vec<String>,
}

impl ExerciseConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: ExerciseConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Number of blanks, one per correct answer.
    pub fn slot_count(&self) -> usize {
        self.correct_answers.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.correct_answers.is_empty() {
            return Err(ConfigError::NoSlots);
        }
        if self.sentences.len() != self.correct_answers.len() {
            return Err(ConfigError::SentenceCountMismatch {
                sentences: self.sentences.len(),
                answers: self.correct_answers.len(),
            });
        }
        let mut seen = HashSet::new();
        for opt in &self.options {
            if !seen.insert(opt.as_str()) {
                return Err(ConfigError::DuplicateOption(opt.clone()));
            }
        }
        Ok(())
    }
}
