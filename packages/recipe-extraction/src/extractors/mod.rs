//! Per-source extractors and their helpers.

pub mod generic;
pub mod html;
pub mod http;
pub mod instagram;
pub mod video;
pub mod ytdlp;

pub use generic::GenericExtractor;
pub use http::HttpFetcher;
pub use instagram::{InstagramExtractor, InstagramSessionCache};
pub use video::{VideoExtractor, VideoPlatform};
pub use ytdlp::YtDlp;
