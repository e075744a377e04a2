//! Engine error type

use thiserror::Error;

/// Errors raised by sprite lookup, configuration loading and entity steps.
///
/// All of these are authoring errors (a misconfigured entity or asset);
/// nothing in the engine retries them.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A visual key that the sprite sheet does not define
    #[error("unknown sprite: {0}")]
    UnknownSprite(String),

    /// Sprite metadata could not be parsed
    #[error("invalid sprite data: {0}")]
    SpriteData(#[source] serde_json::Error),

    /// Settings file could not be parsed or written
    #[error("invalid settings: {0}")]
    Settings(#[source] serde_json::Error),

    /// IO error while reading or writing configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
