use thiserror::Error;

#[derive(Error, Debug)]
pub enum EaselError {
    #[error("No current path. Use beginpath() first.")]
    NoCurrentPath,
    #[error("Only RGB and HSB colormodes are supported (got '{0}')")]
    InvalidColorMode(String),
    #[error("{what}: invalid input '{value}'")]
    InvalidMode { what: &'static str, value: String },
    #[error("'{0}' is an invalid output extension (expected png, svg, ps or pdf)")]
    UnsupportedFormat(String),
    #[error("pop() called with an empty transform stack")]
    TransformStackEmpty,
    #[error("No font available. Call font() with a font file or set EASEL_FONT")]
    FontUnavailable,
    #[error("Font error: {0}")]
    Font(String),
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    #[error("Image error: {0}")]
    Image(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Script error: {0}")]
    Script(String),
    #[error("Failed to create surface")]
    SurfaceFailure,
    #[error("Graphics error: {0}")]
    Graphics(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T, E = EaselError> = std::result::Result<T, E>;
