pub mod canvas;
pub mod config;
pub mod effects;
pub mod error;

pub use config::Config;
pub use error::GlyphworksError;
