//! Data contracts between the router, the judge and the controller.

pub mod config;
pub mod generation;
pub mod judgment;
pub mod recipe;
pub mod result;
