pub mod clean;
pub mod error;
pub mod interpolate;
pub mod loader;
