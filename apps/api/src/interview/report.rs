//! Render-ready views of a session: progress, captions and the markdown evaluation report.

use serde::Serialize;

use crate::interview::session::{SessionState, Stage, TOTAL_STEPS};
use crate::models::evaluation::{EvaluationCategory, EvaluationResult};

/// Everything a client needs to draw the current wizard step without
/// checking for missing fields itself.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: SessionState,
    pub step: u8,
    pub total_steps: u8,
    pub progress: u8,
    pub progress_fraction: f32,
    pub caption: &'static str,
    pub next_stage: Option<Stage>,
    pub skills_display: Option<String>,
    pub evaluation_markdown: Option<String>,
}

impl From<SessionState> for SessionView {
    fn from(session: SessionState) -> Self {
        let progress = session.progress();
        Self {
            step: session.stage.step_number(),
            total_steps: TOTAL_STEPS,
            progress,
            progress_fraction: f32::from(progress) / f32::from(TOTAL_STEPS),
            caption: session.caption(),
            next_stage: session.next_stage(),
            skills_display: session.profile.as_ref().map(|p| p.skills_display()),
            evaluation_markdown: session.evaluation.as_ref().map(render_evaluation_markdown),
            session,
        }
    }
}

/// Markdown report: summary, a score table, then per-category feedback.
pub fn render_evaluation_markdown(result: &EvaluationResult) -> String {
    let mut md = format!("### Overall Summary:\n{}\n\n", result.summary);

    md.push_str("### Detailed Evaluation Scores:\n");
    md.push_str("| Category | Score |\n");
    md.push_str("| --- | --- |\n");
    for category in EvaluationCategory::ALL {
        md.push_str(&format!(
            "| {} | {} |\n",
            category.title(),
            table_cell(result.score(category))
        ));
    }

    md.push_str("\n### Category Specific Feedback:\n");
    for category in EvaluationCategory::ALL {
        md.push_str(&format!(
            "- **{}:** {}\n",
            category.title(),
            result.feedback_for(category)
        ));
    }

    md.trim_end().to_string()
}

/// Pipes and newlines would break the table row.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
