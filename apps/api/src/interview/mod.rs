// Interview wizard: resume analysis → coding challenge → feedback.
// All LLM calls go through llm_client; all reply parsing goes through parsing.

pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod session;
pub mod store;
