pub mod client;
pub mod dates;
pub mod error;
pub mod types;

pub use client::{HttpTrackerApi, TrackerApi};
pub use dates::CanonicalDate;
pub use error::ApiError;
