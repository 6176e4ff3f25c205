// AI drafting of resume content.
// All LLM calls go through llm_client, no direct provider calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
