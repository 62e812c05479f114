pub mod annotate;
pub mod error;
pub mod lag;
