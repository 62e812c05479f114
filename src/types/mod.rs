pub mod classification;
pub mod layout;
pub mod model_kind;
pub mod variant;
