use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::models::evaluation::{
    EvaluationCategory, EvaluationResult, FIELD_DEFAULT, SUMMARY_DEFAULT,
};
use crate::models::interview::ExtractedProfile;

/// A record that can be pulled out of a decoded JSON object field by field,
/// with a named default for every field.
pub trait StructuredReply: Default + Sized {
    /// Builds the record, pushing the name of every missing or coerced field onto `defaulted`.
    fn from_value(value: &Value, defaulted: &mut Vec<String>) -> Self;
}

impl StructuredReply for ExtractedProfile {
    fn from_value(value: &Value, defaulted: &mut Vec<String>) -> Self {
        let skills = match value.get("skills") {
            Some(Value::Array(items)) => {
                if items.iter().any(|item| !item.is_string()) {
                    defaulted.push("skills".to_string());
                }
                items.iter().filter_map(scalar_text).collect()
            }
            Some(Value::Null) | None => {
                defaulted.push("skills".to_string());
                Vec::new()
            }
            Some(single) => {
                defaulted.push("skills".to_string());
                scalar_text(single).into_iter().collect()
            }
        };

        let experience_years = match value.get("experience_years") {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(years) => u32::try_from(years).unwrap_or(u32::MAX),
                None => {
                    defaulted.push("experience_years".to_string());
                    n.as_f64()
                        .filter(|years| years.is_finite() && *years > 0.0)
                        .map(|years| years.trunc().min(f64::from(u32::MAX)) as u32)
                        .unwrap_or(0)
                }
            },
            _ => {
                defaulted.push("experience_years".to_string());
                0
            }
        };

        ExtractedProfile {
            skills,
            experience_years,
        }
    }
}

impl StructuredReply for EvaluationResult {
    fn from_value(value: &Value, defaulted: &mut Vec<String>) -> Self {
        let summary = match value.get("evaluation_summary") {
            Some(Value::String(s)) => s.clone(),
            other => {
                defaulted.push("evaluation_summary".to_string());
                other
                    .and_then(scalar_text)
                    .unwrap_or_else(|| SUMMARY_DEFAULT.to_string())
            }
        };

        let scores = category_map(value, "scores", defaulted, |category| {
            vec![category.key().to_string()]
        });
        let feedback = category_map(value, "category_feedback", defaulted, |category| {
            vec![category.feedback_key(), category.key().to_string()]
        });

        EvaluationResult {
            summary,
            scores,
            feedback,
        }
    }
}

/// Reads one entry per category from the object at `section`, trying each candidate key in turn.
fn category_map<F>(
    value: &Value,
    section: &str,
    defaulted: &mut Vec<String>,
    candidate_keys: F,
) -> BTreeMap<EvaluationCategory, String>
where
    F: Fn(EvaluationCategory) -> Vec<String>,
{
    let empty = Map::new();
    let (object, present) = match value.get(section) {
        Some(Value::Object(object)) => (object, true),
        _ => {
            defaulted.push(section.to_string());
            (&empty, false)
        }
    };

    EvaluationCategory::ALL
        .iter()
        .map(|&category| {
            let found = candidate_keys(category)
                .iter()
                .find_map(|key| object.get(key.as_str()));
            let text = match found {
                Some(Value::String(s)) => s.clone(),
                other => {
                    if present {
                        defaulted.push(format!("{section}.{}", category.key()));
                    }
                    other
                        .and_then(scalar_text)
                        .unwrap_or_else(|| FIELD_DEFAULT.to_string())
                }
            };
            (category, text)
        })
        .collect()
}

/// String form of a JSON value; `null` has none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
