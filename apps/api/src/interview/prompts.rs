// Prompt templates for the interview wizard.
// Templates use `{placeholder}` markers, filled in a single pass by `fill_template`.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};
use crate::models::evaluation::EvaluationCategory;
use crate::models::interview::{CodeSubmission, Difficulty, ExtractedProfile};

/// Resume analysis prompt. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_TEMPLATE: &str = r#"Analyze the following resume text and extract the key skills and total years of professional experience.
Provide the output as a JSON object with two keys: 'skills' (a list of strings for technical skills) and 'experience_years' (an integer representing the total number of years of professional experience).
If specific years of experience cannot be determined, use null for 'experience_years'.

Resume Text:
```
{resume_text}
```

{format_instruction}
JSON Output:"#;

/// Question generation prompt. Replace `{difficulty}`, `{skills}`, `{experience}`, `{language}`.
pub const QUESTION_TEMPLATE: &str = r#"Generate a {difficulty}-difficulty coding question suitable for a candidate with the following skills: {skills} and {experience} years of experience.
The candidate will answer in {language}.
The question should be solvable in approximately 30-45 minutes for its difficulty level and focus on practical problem-solving.
{format_instruction}"#;

/// Code evaluation prompt. Replace `{score_keys}`, `{feedback_keys}`, `{question}`, `{language}`, `{code}`.
pub const EVALUATION_TEMPLATE: &str = r#"Analyze the following code submission based on the provided coding question.
Provide a detailed evaluation as a JSON object.

The JSON object must have the following top-level keys:
- "evaluation_summary": A brief overall summary of the code submission (string).
- "scores": An object containing scores for different categories.
- "category_feedback": An object containing qualitative feedback for each category.

The "scores" object must contain these keys, with values as strings representing scores (e.g., "X / 10"):
{score_keys}

The "category_feedback" object must contain these keys, with string values providing specific feedback:
{feedback_keys}

Coding Question:
```
{question}
```

Candidate's Code Submission:
```{language}
{code}
```

{format_instruction}
JSON Output:"#;

pub fn resume_analysis_prompt(resume_text: &str) -> String {
    fill_template(
        RESUME_ANALYSIS_TEMPLATE,
        &[
            ("format_instruction", JSON_ONLY_INSTRUCTION),
            ("resume_text", resume_text),
        ],
    )
}

pub fn question_prompt(
    profile: &ExtractedProfile,
    difficulty: Difficulty,
    language: &str,
) -> String {
    let experience = profile.experience_years.to_string();
    let skills = profile.skills_display();
    fill_template(
        QUESTION_TEMPLATE,
        &[
            ("format_instruction", PLAIN_TEXT_INSTRUCTION),
            ("difficulty", difficulty.as_str()),
            ("experience", experience.as_str()),
            ("language", language),
            ("skills", skills.as_str()),
        ],
    )
}

pub fn evaluation_prompt(question: &str, submission: &CodeSubmission) -> String {
    let score_keys = bullet_list(EvaluationCategory::ALL.iter().map(|c| c.key().to_string()));
    let feedback_keys = bullet_list(EvaluationCategory::ALL.iter().map(|c| c.feedback_key()));

    fill_template(
        EVALUATION_TEMPLATE,
        &[
            ("format_instruction", JSON_ONLY_INSTRUCTION),
            ("score_keys", score_keys.as_str()),
            ("feedback_keys", feedback_keys.as_str()),
            ("language", submission.language.as_str()),
            ("question", question),
            ("code", submission.text.as_str()),
        ],
    )
}

/// Replaces each `{key}` marker in `template` with its value. Substituted text is
/// never rescanned, so markers inside user input stay literal. Unknown markers
/// and stray braces are copied through.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let marker = &rest[open + 1..];
        let hit = values.iter().find(|(key, _)| {
            marker.starts_with(key) && marker[key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &marker[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = marker;
            }
        }
    }

    out.push_str(rest);
    out
}

fn bullet_list(keys: impl Iterator<Item = String>) -> String {
    keys.map(|k| format!("- \"{k}\"")).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_prompt_embeds_text() {
        let prompt = resume_analysis_prompt("Ten years of Haskell");
        assert!(prompt.contains("Ten years of Haskell"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_question_prompt_fills_every_placeholder() {
        let profile = ExtractedProfile {
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            experience_years: 4,
        };
        let prompt = question_prompt(&profile, Difficulty::Hard, "rust");
        assert!(prompt.contains("Hard-difficulty"));
        assert!(prompt.contains("Rust, SQL and 4 years"));
        assert!(prompt.contains("answer in rust"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_evaluation_prompt_lists_all_categories() {
        let submission = CodeSubmission {
            text: "print('{question}')".to_string(),
            language: "python".to_string(),
        };
        let prompt = evaluation_prompt("Sum two numbers", &submission);
        for category in EvaluationCategory::ALL {
            assert!(prompt.contains(&format!("- \"{}\"", category.key())));
            assert!(prompt.contains(&format!("- \"{}\"", category.feedback_key())));
        }
        assert!(prompt.contains("```python\nprint('{question}')"));
        assert!(prompt.contains("Sum two numbers"));
    }

    #[test]
    fn test_markers_inside_user_input_stay_literal() {
        let profile = ExtractedProfile {
            skills: vec!["{language}".to_string()],
            experience_years: 1,
        };
        let prompt = question_prompt(&profile, Difficulty::Easy, "go {skills}");
        assert!(prompt.contains("following skills: {language} and 1 years"));
        assert!(prompt.contains("answer in go {skills}."));
    }

    #[test]
    fn test_fill_template_copies_unknown_markers_and_stray_braces() {
        assert_eq!(
            fill_template("{a} {b} { {a", &[("a", "x")]),
            "x {b} { {a"
        );
    }
}
