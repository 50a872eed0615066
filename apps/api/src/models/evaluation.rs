use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SUMMARY_DEFAULT: &str = "Summary not provided.";
pub const FIELD_DEFAULT: &str = "N/A";

/// The fixed rubric every code submission is graded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCategory {
    ProblemUnderstanding,
    ProblemSolvingApproach,
    CodeStructureReadability,
    SyntaxLanguageUsage,
    TestCoverageEdgeCases,
}

impl EvaluationCategory {
    pub const ALL: [EvaluationCategory; 5] = [
        EvaluationCategory::ProblemUnderstanding,
        EvaluationCategory::ProblemSolvingApproach,
        EvaluationCategory::CodeStructureReadability,
        EvaluationCategory::SyntaxLanguageUsage,
        EvaluationCategory::TestCoverageEdgeCases,
    ];

    /// Key used in the `scores` object of the evaluation reply.
    pub fn key(&self) -> &'static str {
        match self {
            EvaluationCategory::ProblemUnderstanding => "problem_understanding",
            EvaluationCategory::ProblemSolvingApproach => "problem_solving_approach",
            EvaluationCategory::CodeStructureReadability => "code_structure_readability",
            EvaluationCategory::SyntaxLanguageUsage => "syntax_language_usage",
            EvaluationCategory::TestCoverageEdgeCases => "test_coverage_edge_cases",
        }
    }

    /// Key used in the `category_feedback` object of the evaluation reply.
    pub fn feedback_key(&self) -> String {
        format!("{}_feedback", self.key())
    }

    pub fn title(&self) -> &'static str {
        match self {
            EvaluationCategory::ProblemUnderstanding => "Problem Understanding",
            EvaluationCategory::ProblemSolvingApproach => "Problem Solving Approach",
            EvaluationCategory::CodeStructureReadability => "Code Structure & Readability",
            EvaluationCategory::SyntaxLanguageUsage => "Syntax & Language Usage",
            EvaluationCategory::TestCoverageEdgeCases => "Test Coverage & Edge Cases",
        }
    }
}

/// Structured evaluation of a code submission. Both maps always hold every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub summary: String,
    pub scores: BTreeMap<EvaluationCategory, String>,
    pub feedback: BTreeMap<EvaluationCategory, String>,
}

impl Default for EvaluationResult {
    fn default() -> Self {
        let filled = || {
            EvaluationCategory::ALL
                .iter()
                .map(|c| (*c, FIELD_DEFAULT.to_string()))
                .collect()
        };
        Self {
            summary: SUMMARY_DEFAULT.to_string(),
            scores: filled(),
            feedback: filled(),
        }
    }
}

impl EvaluationResult {
    pub fn score(&self, category: EvaluationCategory) -> &str {
        self.scores
            .get(&category)
            .map(String::as_str)
            .unwrap_or(FIELD_DEFAULT)
    }

    pub fn feedback_for(&self, category: EvaluationCategory) -> &str {
        self.feedback
            .get(&category)
            .map(String::as_str)
            .unwrap_or(FIELD_DEFAULT)
    }
}
