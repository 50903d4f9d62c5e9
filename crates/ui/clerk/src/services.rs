pub mod cache;
pub mod duplicates;
pub mod mutations;
pub mod session;
