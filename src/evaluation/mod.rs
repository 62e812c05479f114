pub mod harness;
pub mod metrics;
