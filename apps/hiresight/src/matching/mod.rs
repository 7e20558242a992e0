pub mod compatibility;
pub mod engine;

pub use compatibility::StyleCompatibility;
pub use engine::MatchingEngine;
