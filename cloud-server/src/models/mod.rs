//! Request/response models

pub mod analysis;
pub mod training;

pub use analysis::*;
pub use training::*;
