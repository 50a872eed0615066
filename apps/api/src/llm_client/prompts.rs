// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts alongside it;
// this file only holds the cross-cutting output-format instructions.

/// Appended to prompts whose reply must decode as a single JSON object.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Ensure the output is a single, valid JSON object only. \
Do NOT include explanations or apologies outside the JSON object.";

/// Appended to prompts whose reply is shown to the user verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
Provide only the requested text itself, without any preamble, labels, \
explanations, or markdown formatting.";
