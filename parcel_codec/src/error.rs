#[derive(thiserror::Error)]
pub enum Error {
    // dependency errors
    #[cfg(feature = "json")]
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expect base64 encoded data")]
    Base64,

    #[error("expect hex encoded data")]
    Hex,

    // std errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("utf8 conversion: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // crate errors
    #[error("expect 16, 24 or 32 byte AES key but got {0} bytes")]
    InvalidKey(usize),

    #[error("expect {} byte nonce but got {0} bytes", super::NONCE_LEN)]
    InvalidNonce(usize),

    #[error(
        "envelope of {0} bytes is shorter than nonce and tag ({} bytes)",
        super::NONCE_LEN + super::TAG_LEN
    )]
    InvalidEnvelope(usize),

    #[error("authentication tag mismatch (tampered data or wrong key)")]
    AuthenticationFailure,

    #[error("{0}")]
    Other(&'static str),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
