//! Core business logic abstractions

pub mod analytics;
pub mod cache;
pub mod config;
pub mod currency;
pub mod frequency;
pub mod log;
pub mod notify;
pub mod runway;
pub mod subscription;

// Re-export main types for cleaner imports
pub use currency::{RateTable, RateTableProvider};
pub use frequency::Frequency;
pub use subscription::{Status, Subscription};
