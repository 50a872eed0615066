//! Orchestrator: sequences Extract → LLM → Parse → LLM → Parse for each wizard stage.
//!
//! Every external failure is caught here and returned as a `StageError`; callers
//! fold outcomes into the session with the pure transitions in `session`.

use tracing::{info, warn};

use crate::errors::StageError;
use crate::extraction::extract_text;
use crate::interview::prompts::{evaluation_prompt, question_prompt, resume_analysis_prompt};
use crate::llm_client::TextGenerator;
use crate::models::evaluation::EvaluationResult;
use crate::models::interview::{CodeSubmission, Difficulty, ExtractedProfile, GeneratedQuestion};
use crate::models::resume::ResumeDocument;
use crate::parsing::{
    clean_question_text, parse_reply, upstream_error, ParsedReply, ReplyStatus, StructuredReply,
};

/// Result of stage 1. A profile without a question is kept and shown.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete {
        profile: ExtractedProfile,
        question: GeneratedQuestion,
        notices: Vec<StageError>,
    },
    ProfileOnly {
        profile: ExtractedProfile,
        error: StageError,
        notices: Vec<StageError>,
    },
    Failed {
        error: StageError,
    },
}

/// A successful evaluation plus any non-fatal notices raised while parsing it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOutcome {
    pub result: EvaluationResult,
    pub notices: Vec<StageError>,
}

/// Stage 1: extract the resume, derive a profile, then generate a question for it.
pub async fn analyze_resume(
    generator: &dyn TextGenerator,
    document: ResumeDocument,
    difficulty: Difficulty,
    language: &str,
) -> AnalysisOutcome {
    info!(
        filename = document.filename(),
        %difficulty,
        "Analyzing resume and generating question"
    );

    let resume_text = match extract_off_runtime(document).await {
        Ok(text) => text,
        Err(error) => return AnalysisOutcome::Failed { error },
    };

    let (profile, notices) = match request_structured::<ExtractedProfile>(
        generator,
        &resume_analysis_prompt(&resume_text),
    )
    .await
    {
        Ok(parsed) => parsed,
        Err(error) => return AnalysisOutcome::Failed { error },
    };

    if profile.skills.is_empty() {
        warn!("Resume analysis returned no skills");
        return AnalysisOutcome::Failed {
            error: StageError::NoSkillsFound,
        };
    }

    info!(
        skills = %profile.skills_display(),
        experience_years = profile.experience_years,
        "Extracted profile"
    );

    match generate_question(generator, &profile, difficulty, language).await {
        Ok(question) => AnalysisOutcome::Complete {
            profile,
            question,
            notices,
        },
        Err(error) => {
            warn!("Question generation failed, keeping extracted profile: {error}");
            AnalysisOutcome::ProfileOnly {
                profile,
                error,
                notices,
            }
        }
    }
}

/// Document parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_off_runtime(document: ResumeDocument) -> Result<String, StageError> {
    let format = document.format().label();
    tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .map_err(|e| StageError::DecodeFailure {
            format,
            message: format!("extraction task failed: {e}"),
        })?
}

async fn generate_question(
    generator: &dyn TextGenerator,
    profile: &ExtractedProfile,
    difficulty: Difficulty,
    language: &str,
) -> Result<GeneratedQuestion, StageError> {
    let reply = generator
        .generate(&question_prompt(profile, difficulty, language))
        .await
        .map_err(|e| StageError::UpstreamApi(e.to_string()))?;

    if let Some(message) = upstream_error(&reply) {
        return Err(StageError::UpstreamApi(message.to_string()));
    }

    let text = clean_question_text(&reply);
    if text.is_empty() {
        return Err(StageError::EmptyQuestion);
    }

    Ok(GeneratedQuestion {
        text,
        difficulty,
        target_language: language.to_string(),
    })
}

/// Stage 2: grade a submission against the question it answers.
pub async fn evaluate_submission(
    generator: &dyn TextGenerator,
    question: &GeneratedQuestion,
    submission: &CodeSubmission,
) -> Result<EvaluationOutcome, StageError> {
    info!(
        language = %submission.language,
        chars = submission.text.chars().count(),
        "Evaluating code submission"
    );

    let (result, notices) = request_structured::<EvaluationResult>(
        generator,
        &evaluation_prompt(&question.text, submission),
    )
    .await?;

    info!("Evaluation complete");
    Ok(EvaluationOutcome { result, notices })
}

/// One LLM round trip whose reply must be a structured record.
async fn request_structured<T: StructuredReply>(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<(T, Vec<StageError>), StageError> {
    let reply = generator
        .generate(prompt)
        .await
        .map_err(|e| StageError::UpstreamApi(e.to_string()))?;

    let ParsedReply {
        record,
        status,
        defaulted,
    } = parse_reply::<T>(&reply);

    match status {
        ReplyStatus::Parsed => {
            let notices = if defaulted.is_empty() {
                Vec::new()
            } else {
                warn!(fields = ?defaulted, "Structured reply had missing or invalid fields");
                vec![StageError::ValidationDefaulted { fields: defaulted }]
            };
            Ok((record, notices))
        }
        ReplyStatus::Empty => Err(StageError::UpstreamApi(
            "Empty response from API".to_string(),
        )),
        ReplyStatus::UpstreamError(message) => Err(StageError::UpstreamApi(message)),
        ReplyStatus::Malformed(message) => {
            warn!("Failed to parse structured reply: {message}; raw reply: {reply}");
            Err(StageError::MalformedStructuredReply(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::models::evaluation::EvaluationCategory;

    const PROFILE_REPLY: &str =
        "```json\n{\"skills\": [\"Rust\", \"Postgres\"], \"experience_years\": 6}\n```";
    const EVALUATION_REPLY: &str = r#"{
        "evaluation_summary": "Correct but untested.",
        "scores": {
            "problem_understanding": "9 / 10",
            "problem_solving_approach": "8 / 10",
            "code_structure_readability": "7 / 10",
            "syntax_language_usage": "8 / 10",
            "test_coverage_edge_cases": "3 / 10"
        },
        "category_feedback": {
            "problem_understanding_feedback": "Clear grasp.",
            "problem_solving_approach_feedback": "Reasonable.",
            "code_structure_readability_feedback": "Could use helpers.",
            "syntax_language_usage_feedback": "Idiomatic.",
            "test_coverage_edge_cases_feedback": "No tests."
        }
    }"#;

    fn resume() -> ResumeDocument {
        ResumeDocument::new(b"Rust and Postgres engineer, 6 years".to_vec(), "cv.txt")
    }

    fn question() -> GeneratedQuestion {
        GeneratedQuestion {
            text: "Implement an LRU cache.".to_string(),
            difficulty: Difficulty::Medium,
            target_language: "python".to_string(),
        }
    }

    fn submission() -> CodeSubmission {
        CodeSubmission {
            text: "class LRU: ...".to_string(),
            language: "python".to_string(),
        }
    }

    #[tokio::test]
    async fn test_analysis_produces_profile_and_question() {
        let generator = ScriptedGenerator::new([PROFILE_REPLY, "```\nDesign a rate limiter.\n```"]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Hard, "rust").await;

        match outcome {
            AnalysisOutcome::Complete {
                profile,
                question,
                notices,
            } => {
                assert_eq!(profile.skills, vec!["Rust", "Postgres"]);
                assert_eq!(profile.experience_years, 6);
                assert_eq!(question.text, "Design a rate limiter.");
                assert_eq!(question.difficulty, Difficulty::Hard);
                assert_eq!(question.target_language, "rust");
                assert!(notices.is_empty());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("Rust and Postgres engineer"));
        assert!(prompts[1].contains("Rust, Postgres and 6 years"));
    }

    #[tokio::test]
    async fn test_question_failure_keeps_profile() {
        let generator = ScriptedGenerator::new([PROFILE_REPLY]).then_fail("quota exceeded");
        let outcome = analyze_resume(&generator, resume(), Difficulty::Easy, "python").await;

        match outcome {
            AnalysisOutcome::ProfileOnly { profile, error, .. } => {
                assert_eq!(profile.skills, vec!["Rust", "Postgres"]);
                assert!(matches!(error, StageError::UpstreamApi(m) if m.contains("quota exceeded")));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_question_is_profile_only() {
        let generator = ScriptedGenerator::new([PROFILE_REPLY, "   "]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Easy, "python").await;
        assert!(matches!(
            outcome,
            AnalysisOutcome::ProfileOnly {
                error: StageError::EmptyQuestion,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_sentinel_error_reply_fails_analysis() {
        let generator = ScriptedGenerator::new(["Error: quota exceeded"]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Medium, "python").await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                error: StageError::UpstreamApi("Error: quota exceeded".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_profile_fails_analysis() {
        let generator = ScriptedGenerator::new(["Sure! Here are the skills: Rust"]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Medium, "python").await;
        assert!(matches!(
            outcome,
            AnalysisOutcome::Failed {
                error: StageError::MalformedStructuredReply(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_no_skills_fails_analysis() {
        let generator = ScriptedGenerator::new(["{\"skills\": [], \"experience_years\": 3}"]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Medium, "python").await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                error: StageError::NoSkillsFound
            }
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_the_api() {
        let generator = ScriptedGenerator::new([PROFILE_REPLY]);
        let empty = ResumeDocument::new(b"   ".to_vec(), "cv.txt");
        let outcome = analyze_resume(&generator, empty, Difficulty::Medium, "python").await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                error: StageError::EmptyExtractedText
            }
        );
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_pdf_resume_is_extracted_on_the_blocking_pool() {
        let generator = ScriptedGenerator::new([PROFILE_REPLY, "Design a rate limiter."]);
        let pdf = ResumeDocument::new(
            crate::extraction::fixtures::pdf_bytes(&["Postgres tuning"]),
            "cv.pdf",
        );
        let outcome = analyze_resume(&generator, pdf, Difficulty::Hard, "go").await;
        assert!(matches!(outcome, AnalysisOutcome::Complete { .. }));
        assert!(generator.prompts()[0].contains("Postgres tuning"));
    }

    #[tokio::test]
    async fn test_extraction_errors_survive_the_blocking_pool() {
        let corrupt = ResumeDocument::new(b"not a pdf at all".to_vec(), "cv.pdf");
        assert!(matches!(
            extract_off_runtime(corrupt).await,
            Err(StageError::DecodeFailure { format: "PDF", .. })
        ));
    }

    #[tokio::test]
    async fn test_defaulted_fields_are_reported_as_notices() {
        let generator = ScriptedGenerator::new([
            "{\"skills\": \"Go\", \"experience_years\": \"5\"}",
            "Write a URL shortener.",
        ]);
        let outcome = analyze_resume(&generator, resume(), Difficulty::Medium, "go").await;
        match outcome {
            AnalysisOutcome::Complete {
                profile, notices, ..
            } => {
                assert_eq!(profile.skills, vec!["Go"]);
                assert_eq!(profile.experience_years, 0);
                assert_eq!(
                    notices,
                    vec![StageError::ValidationDefaulted {
                        fields: vec!["skills".to_string(), "experience_years".to_string()]
                    }]
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluation_parses_structured_reply() {
        let generator = ScriptedGenerator::new([EVALUATION_REPLY]);
        let outcome = evaluate_submission(&generator, &question(), &submission())
            .await
            .unwrap();
        assert_eq!(outcome.result.summary, "Correct but untested.");
        assert_eq!(
            outcome.result.score(EvaluationCategory::TestCoverageEdgeCases),
            "3 / 10"
        );
        assert!(outcome.notices.is_empty());
        assert!(generator.prompts()[0].contains("Implement an LRU cache."));
    }

    #[tokio::test]
    async fn test_evaluation_failures_are_typed() {
        let generator = ScriptedGenerator::new(["not json"]);
        let err = evaluate_submission(&generator, &question(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::MalformedStructuredReply(_)));

        let generator = ScriptedGenerator::new([""]);
        let err = evaluate_submission(&generator, &question(), &submission())
            .await
            .unwrap_err();
        assert_eq!(err, StageError::UpstreamApi("Empty response from API".to_string()));

        let generator = ScriptedGenerator::default().then_fail("boom");
        let err = evaluate_submission(&generator, &question(), &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::UpstreamApi(_)));
    }
}
