//! Bias Detector: audits a job requirement's wording.
//!
//! Independent of candidate data, so it can run alongside analysis and matching.

pub mod detector;
pub mod phrases;

pub use detector::{BiasDetector, BiasFlag, BiasReport};
pub use phrases::{BiasCategory, Severity};
