//! CV-tailoring pipeline.
//!
//! Given a candidate's master profile and a free-text job description, produce
//! a tailored CV draft that emphasizes relevant profile content, rewords it
//! toward the job description's terminology, and never invents facts not
//! present in the original profile.
//!
//! The pipeline is a strict five-stage flow — requirement extraction → skill
//! matching → content selection → content adaptation → draft assembly — with a
//! cross-cutting text-generation capability ([`llm_client::TextRewriter`])
//! used by several stages. Every stage that uses the capability must keep
//! working via heuristics alone when it is unconfigured or failing.
//!
//! Entry point: [`tailoring::pipeline::generate`].

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod tailoring;
