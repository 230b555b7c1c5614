pub type RingframeResult<T> = Result<T, RingframeError>;

#[derive(thiserror::Error, Debug)]
pub enum RingframeError {
    #[error("validation error: {0}")]
    Validation(String),

    /// User-facing: the selected file could not be interpreted as an image.
    #[error("could not open this image ({0}); try a JPEG, PNG, or WebP file")]
    Decode(String),

    #[error("png encode error: {0}")]
    Encode(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RingframeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
