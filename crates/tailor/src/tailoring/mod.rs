// The CV-tailoring pipeline: requirement extraction → skill matching →
// content selection → content adaptation → draft assembly.
// All capability calls go through llm_client — no direct HTTP here.

pub mod adapter;
pub mod assembler;
pub mod pipeline;
pub mod prompts;
pub mod requirements;
pub mod selector;
pub mod skills;
pub mod terms;
