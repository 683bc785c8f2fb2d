//! Reference model implementations.
//!
//! Enable with the `openai` feature.

mod openai;
pub mod schema;

pub use openai::OpenAI;
pub use schema::StructuredOutput;
