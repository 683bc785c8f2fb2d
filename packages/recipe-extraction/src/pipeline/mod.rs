//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Content retrieval through the router
//! - Judgment with graceful degradation
//! - At most one follow-up hop to a linked recipe page
//! - Record assembly and the generate-from-knowledge fallback

pub mod assemble;
pub mod controller;
pub mod generate;
pub mod judge;
pub mod prompts;

pub use assemble::assemble_record;
pub use controller::{decide_follow_up, FollowUpDecision, RecipeExtractor};
pub use generate::{extract_name_or_degrade, generate_from_knowledge};
pub use judge::judge_or_degrade;
pub use prompts::{format_generate_prompt, format_judge_prompt};
