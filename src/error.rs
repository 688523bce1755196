use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GlyphworksError {
    #[error("could not read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config {path} is not valid TOML: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid hex color {0:?} (expected RRGGBB, e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("could not read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} is not a usable TrueType/OpenType font")]
    FontParse(PathBuf),
}

pub type Result<T> = std::result::Result<T, GlyphworksError>;
