//! Label Module - Label authenticity verification
//!
//! So khớp vùng nhãn với vùng xung quanh trên ảnh sản phẩm.
//! Nhãn thật được in/may liền với sản phẩm nên chia sẻ texture với vùng
//! xung quanh; nhãn dán lại thường không khớp.
//!
//! ## Structure
//! - `types`: Region, MatchResult, LabelError
//! - `preprocess`: base64 decoding, grayscale + CLAHE
//! - `keypoints`: FAST corners + BRIEF descriptors
//! - `matcher`: ratio-test matching and score policy
//! - `analyzer`: end-to-end pipeline
//!
//! ## Usage
//! ```ignore
//! use truetag_core::logic::label::{LabelAnalyzer, Region};
//!
//! let analyzer = LabelAnalyzer::new();
//! let result = analyzer.analyze(&image_base64, &Region::new(100.0, 100.0, 200.0, 100.0));
//! if result.label_match {
//!     println!("label looks authentic ({:.2})", result.score);
//! }
//! ```

pub mod analyzer;
pub mod keypoints;
pub mod matcher;
pub mod preprocess;
pub mod types;

pub use analyzer::{LabelAnalyzer, LabelAnalyzerConfig};
pub use keypoints::{DetectorConfig, KeypointSet};
pub use preprocess::ClaheConfig;
pub use types::{LabelError, MatchResult, Region};
