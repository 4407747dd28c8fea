//! System instructions per input language
//!
//! Every turn is steered by one hidden system instruction chosen from the
//! label the classifier assigned to the user's message. The built-in table
//! can be overridden from a TOML file.
//!
//! # Example Prompt File
//!
//! ```toml
//! [prompts]
//! english = "You are HH.gpt. Reply only in English."
//! roman_urdu = "Aap HH.gpt hain. Hamesha Roman Urdu mein jawab dein."
//! # urdu is omitted, so the built-in instruction is kept
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::language::Label;

/// Built-in instructions that don't require files
pub mod builtin {
    /// Urdu script only
    pub const URDU: &str = "You are HH.gpt, a helpful assistant. Respond only in Urdu using the Urdu (Nastaliq/Arabic) script. \
Do not use English or any other language in your reply, and do not transliterate Urdu into Latin letters.";

    /// Urdu written in Latin letters, casual register
    pub const ROMAN_URDU: &str = "You are HH.gpt, a friendly assistant. The user is writing Roman Urdu (Urdu written with English letters). \
Respond in Roman Urdu only, in a warm and conversational tone, the way friends chat. Do not switch to Urdu script.";

    /// English, professional register
    pub const ENGLISH: &str = "You are HH.gpt, a knowledgeable assistant. Respond only in English, \
in a clear and professional tone. Be concise and accurate.";
}

/// Built-in instruction for a label.
pub fn select_prompt(label: Label) -> &'static str {
    match label {
        Label::Urdu => builtin::URDU,
        Label::RomanUrdu => builtin::ROMAN_URDU,
        Label::English => builtin::ENGLISH,
    }
}

/// One system instruction per label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSet {
    #[serde(default = "default_english")]
    pub english: String,

    #[serde(default = "default_urdu")]
    pub urdu: String,

    #[serde(default = "default_roman_urdu")]
    pub roman_urdu: String,
}

fn default_english() -> String {
    select_prompt(Label::English).to_string()
}

fn default_urdu() -> String {
    select_prompt(Label::Urdu).to_string()
}

fn default_roman_urdu() -> String {
    select_prompt(Label::RomanUrdu).to_string()
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            english: default_english(),
            urdu: default_urdu(),
            roman_urdu: default_roman_urdu(),
        }
    }
}

/// On-disk layout: everything lives under `[prompts]`
#[derive(Debug, Default, Deserialize)]
struct PromptFile {
    #[serde(default)]
    prompts: PromptSet,
}

impl PromptSet {
    /// Instruction for a label
    pub fn select(&self, label: Label) -> &str {
        match label {
            Label::English => &self.english,
            Label::Urdu => &self.urdu,
            Label::RomanUrdu => &self.roman_urdu,
        }
    }

    /// Parse overrides from TOML; missing keys keep the built-in text
    pub fn from_toml(content: &str) -> Result<Self, PromptError> {
        let file: PromptFile =
            toml::from_str(content).map_err(|e| PromptError::ParseError(e.to_string()))?;
        file.prompts.validate()?;
        Ok(file.prompts)
    }

    /// Load overrides from a file
    pub async fn load_from_file(path: &Path) -> Result<Self, PromptError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PromptError::IoError(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), PromptError> {
        for label in Label::ALL {
            if self.select(label).trim().is_empty() {
                return Err(PromptError::Empty(label));
            }
        }
        Ok(())
    }
}

/// Errors from prompt loading
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Prompt for {0} is empty")]
    Empty(Label),
}
