pub mod aggregate;
pub mod artifacts;
pub mod error;
pub mod writer;
