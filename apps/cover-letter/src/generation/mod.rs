// Cover letter generation: input loading, prompt assembly, the single LLM call,
// and the output artifact write.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod generator;
pub mod inputs;
pub mod prompts;
