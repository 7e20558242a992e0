pub mod analysis;
pub mod bundle;
pub mod job;
pub mod matching;
