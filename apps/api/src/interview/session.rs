//! Session state for one candidate's pass through the wizard.
//!
//! All transitions are pure: they take the current state by value and return the
//! next one. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StageError, TransitionError};
use crate::interview::orchestrator::{AnalysisOutcome, EvaluationOutcome};
use crate::models::evaluation::EvaluationResult;
use crate::models::interview::{CodeSubmission, EditorSettings, ExtractedProfile, GeneratedQuestion};

pub const TOTAL_STEPS: u8 = 3;

/// The three wizard stages, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    ResumeAnalysis,
    CodingChallenge,
    Feedback,
}

impl Stage {
    pub fn step_number(&self) -> u8 {
        match self {
            Stage::ResumeAnalysis => 1,
            Stage::CodingChallenge => 2,
            Stage::Feedback => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-visible message about the last action taken on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: &str) -> Self {
        Self {
            level,
            code: None,
            message: message.to_string(),
        }
    }

    fn from_error(error: &StageError) -> Self {
        let level = match error {
            StageError::ValidationDefaulted { .. } => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        };
        Self {
            level,
            code: Some(error.code().to_string()),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    /// Bumped whenever the session starts over, so results computed for an
    /// earlier revision can be recognised as stale.
    pub revision: u64,
    pub stage: Stage,
    pub resume_filename: Option<String>,
    pub profile: Option<ExtractedProfile>,
    pub question: Option<GeneratedQuestion>,
    pub editor: EditorSettings,
    pub submission: Option<CodeSubmission>,
    pub evaluation: Option<EvaluationResult>,
    pub notices: Vec<Notice>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            revision: 0,
            stage: Stage::ResumeAnalysis,
            resume_filename: None,
            profile: None,
            question: None,
            editor: EditorSettings::default(),
            submission: None,
            evaluation: None,
            notices: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Clears every produced entity and returns to stage 1 with default editor settings.
    pub fn restart(self) -> Self {
        Self {
            notices: vec![Notice::new(
                NoticeLevel::Info,
                "Started over. Upload a new resume to begin.",
            )],
            revision: self.revision + 1,
            ..Self::new(self.id, self.created_at)
        }
    }

    /// A new upload starts from a cleared session, keeping only the chosen language.
    pub fn begin_analysis(self, filename: &str, language: &str) -> Self {
        let mut next = Self::new(self.id, self.created_at);
        next.revision = self.revision + 1;
        next.resume_filename = Some(filename.to_string());
        next.editor.language = language.to_string();
        next
    }

    pub fn with_analysis(mut self, outcome: AnalysisOutcome) -> Self {
        self.stage = Stage::ResumeAnalysis;
        self.notices = match outcome {
            AnalysisOutcome::Complete {
                profile,
                question,
                notices,
            } => {
                self.profile = Some(profile);
                self.question = Some(question);
                std::iter::once(Notice::new(
                    NoticeLevel::Success,
                    "Resume processed and question generated!",
                ))
                .chain(notices.iter().map(Notice::from_error))
                .collect()
            }
            AnalysisOutcome::ProfileOnly {
                profile,
                error,
                notices,
            } => {
                self.profile = Some(profile);
                self.question = None;
                std::iter::once(Notice::new(
                    NoticeLevel::Warning,
                    "Skills extracted, but question generation failed.",
                ))
                .chain(std::iter::once(Notice::from_error(&error)))
                .chain(notices.iter().map(Notice::from_error))
                .collect()
            }
            AnalysisOutcome::Failed { error } => {
                self.profile = None;
                self.question = None;
                vec![
                    Notice::new(
                        NoticeLevel::Error,
                        "Failed to process resume and generate question.",
                    ),
                    Notice::from_error(&error),
                ]
            }
        };
        self
    }

    /// Stage 2 precondition: a question exists and the submission is not blank.
    pub fn check_submission(&self, submission: &CodeSubmission) -> Result<(), TransitionError> {
        if self.question.is_none() {
            return Err(TransitionError::QuestionMissing);
        }
        if submission.is_blank() {
            return Err(TransitionError::EmptySubmission);
        }
        Ok(())
    }

    /// Records a submission and its evaluation. A resubmission replaces the prior result.
    pub fn with_submission(
        mut self,
        submission: CodeSubmission,
        outcome: Result<EvaluationOutcome, StageError>,
    ) -> Self {
        self.stage = Stage::CodingChallenge;
        self.editor = EditorSettings {
            language: submission.language.clone(),
            code: submission.text.clone(),
        };
        self.submission = Some(submission);
        self.evaluation = None;
        self.notices = match outcome {
            Ok(EvaluationOutcome { result, notices }) => {
                self.evaluation = Some(result);
                std::iter::once(Notice::new(NoticeLevel::Success, "Evaluation complete!"))
                    .chain(notices.iter().map(Notice::from_error))
                    .collect()
            }
            Err(error) => vec![
                Notice::new(NoticeLevel::Error, "Failed to get evaluation feedback."),
                Notice::from_error(&error),
            ],
        };
        self
    }

    pub fn with_editor(mut self, editor: EditorSettings) -> Self {
        self.editor = editor;
        self.notices.clear();
        self
    }

    /// Moves to `target`. Going back is always allowed and never discards results;
    /// going forward requires the target stage's inputs.
    pub fn navigate(mut self, target: Stage) -> Result<Self, TransitionError> {
        if target > self.stage {
            if target >= Stage::CodingChallenge && (self.profile.is_none() || self.question.is_none()) {
                return Err(TransitionError::QuestionMissing);
            }
            if target == Stage::Feedback && self.evaluation.is_none() {
                return Err(TransitionError::EvaluationMissing);
            }
        }
        self.stage = target;
        self.notices.clear();
        Ok(self)
    }

    /// Completed steps out of `TOTAL_STEPS`.
    pub fn progress(&self) -> u8 {
        if self.evaluation.is_some() {
            3
        } else if self.submission.is_some() {
            2
        } else if self.question.is_some() {
            1
        } else {
            0
        }
    }

    pub fn caption(&self) -> &'static str {
        match self.stage {
            Stage::ResumeAnalysis if self.question.is_none() => {
                "Step 1 of 3: Upload and analyze your resume."
            }
            Stage::ResumeAnalysis => {
                "Step 1 of 3 Complete: Resume analyzed. Click 'Next' to proceed."
            }
            Stage::CodingChallenge if self.submission.is_none() => {
                "Step 2 of 3: Solve the coding challenge."
            }
            Stage::CodingChallenge => {
                "Step 2 of 3 Complete: Code submitted. Click 'Next' to view feedback."
            }
            Stage::Feedback if self.evaluation.is_none() => "Step 3 of 3: View evaluation feedback.",
            Stage::Feedback => "Workflow complete! Evaluation feedback received.",
        }
    }

    /// The furthest stage the session may currently move forward to.
    pub fn next_stage(&self) -> Option<Stage> {
        match self.stage {
            Stage::ResumeAnalysis if self.profile.is_some() && self.question.is_some() => {
                Some(Stage::CodingChallenge)
            }
            Stage::CodingChallenge if self.evaluation.is_some() => Some(Stage::Feedback),
            _ => None,
        }
    }
}
