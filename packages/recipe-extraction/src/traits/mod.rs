//! Seams between the pipeline and its collaborators.
//!
//! Each trait is injectable so the controller can be driven by scripted
//! fakes (see [`crate::testing`]).

pub mod extractor;
pub mod judge;
pub mod video;
