#![forbid(unsafe_code)]

pub mod analytics;
pub mod error;
pub mod heuristic;
pub mod insights;
pub mod model;
pub mod question_bank;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
