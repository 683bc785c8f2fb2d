//! Recipe Extraction Library
//!
//! Turns a URL (a recipe blog, an Instagram post, a YouTube or TikTok video)
//! into a structured recipe, or an explanation of why none was found.
//!
//! # Flow
//!
//! 1. The [`router`] classifies the URL and dispatches to a per-source extractor
//! 2. A [`RecipeJudge`] decides whether the text is a complete recipe
//! 3. If not, the controller may follow one discovered link
//! 4. Accepted recipes are assembled into a [`PersistedRecipeRecord`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use recipe_extraction::{ExtractionRouter, RecipeConfig, RecipeExtractor};
//! use recipe_extraction::ai::OpenAI;
//!
//! let config = RecipeConfig::from_env()?;
//! let router = ExtractionRouter::from_config(&config)?;
//! let judge = OpenAI::new(config.require_openai()?.clone());
//!
//! let extractor = RecipeExtractor::new(router, judge).with_config(config.pipeline.clone());
//! let result = extractor.extract_and_process("https://www.instagram.com/p/Cx1y2z3/").await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for extractors, the judge, the generator and video tools
//! - [`types`] - Data contracts between stages
//! - [`extractors`] - Generic web, Instagram and video extractors
//! - [`router`] - URL classification and dispatch
//! - [`pipeline`] - Judgment, follow-up control and assembly
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod retry;
pub mod router;
pub mod security;
pub mod session;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use config::RecipeConfig;
pub use error::{ConfigError, ExtractError, JudgeError};
pub use retry::RetryPolicy;
pub use router::{classify, ExtractionRouter, SourceFamily};
pub use session::SessionCache;
pub use traits::{
    extractor::{ContentSource, ExtractedText, Extractor, PageFetcher},
    judge::{RecipeGenerator, RecipeJudge},
    video::{VideoLookup, VideoMetadata, VideoMetadataTool},
};
pub use types::{
    config::{FetchConfig, PipelineConfig, MAX_FOLLOW_UP_DEPTH},
    generation::{
        GeneratedRecipeResult, GenerationRequest, NameConfidence, RecipeNameExtraction,
        RecipeSource,
    },
    judgment::{JudgmentRequest, JudgmentResponse},
    recipe::{Ingredient, PersistedRecipeRecord, Quantity, StructuredRecipe},
    result::{ExtractionOutcome, ExtractionStatus, UnifiedResult},
};

// Re-export pipeline components
pub use pipeline::{
    assemble_record, decide_follow_up, extract_name_or_degrade, generate_from_knowledge,
    judge_or_degrade, FollowUpDecision, RecipeExtractor,
};

// Re-export extractors
pub use extractors::{GenericExtractor, HttpFetcher, InstagramExtractor, VideoExtractor, YtDlp};

// Re-export testing utilities
pub use testing::{MockContentSource, MockJudge, TestScenario};
