use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Code shown in the editor before the candidate types anything.
pub const DEFAULT_CODE_TEMPLATE: &str = "def solve():\n    # Your code here\n    pass";
pub const DEFAULT_LANGUAGE: &str = "python";

/// Requested difficulty of the generated coding question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "Unknown difficulty '{other}'. Expected one of: Easy, Medium, Hard"
            )),
        }
    }
}

/// Skills and experience extracted from a resume.
///
/// Never partially trusted: the reply parser fills every field, so an
/// unknown experience is `0` and missing skills are an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub skills: Vec<String>,
    pub experience_years: u32,
}

impl ExtractedProfile {
    pub fn skills_display(&self) -> String {
        self.skills.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub text: String,
    pub difficulty: Difficulty,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSubmission {
    pub text: String,
    pub language: String,
}

impl CodeSubmission {
    /// Blank code and the untouched editor template both count as "nothing submitted".
    pub fn is_blank(&self) -> bool {
        let trimmed = self.text.trim();
        trimmed.is_empty() || trimmed == DEFAULT_CODE_TEMPLATE.trim()
    }
}

/// Editor state carried between requests so the candidate's draft survives navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    pub language: String,
    pub code: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            code: DEFAULT_CODE_TEMPLATE.to_string(),
        }
    }
}
