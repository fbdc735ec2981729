use thiserror::Error;

/// Errors produced while mapping a (token, file name) pair to a storage path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// No token was supplied
    #[error("Missing user token")]
    EmptyToken,

    /// Token cannot be used as a single directory segment
    #[error("Invalid user token")]
    InvalidToken,

    /// File name is empty or still contains a traversal sequence after base-name extraction
    #[error("Invalid file name: {name:?}")]
    InvalidFileName { name: String },
}

/// Errors raised by the image codecs
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Bytes are present but are not a valid image of an allowed format
    #[error("Invalid image data: {message}")]
    Decode { message: String },

    /// Re-encoding a decoded image failed
    #[error("Failed to encode {format} image: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// Image format was recognized but is not on the allow-list (should map to HTTP 415)
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },
}

/// Errors that terminate an image retrieval request
#[derive(Debug, Clone, Error)]
pub enum RetrieveError {
    /// Request carried no user token
    #[error("Unauthorized")]
    Unauthorized,

    /// Token or file name rejected by the locator
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// A width or height query parameter could not be used
    #[error("Invalid {name} parameter {value:?}: {reason}")]
    InvalidDimension {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The resolved path has no backing file
    #[error("File not found: {file_name}")]
    NotFound { file_name: String },

    /// The file exists but could not be opened or read
    #[error("Unable to open file: {message}")]
    Io { message: String },

    /// Decoding, encoding, or format allow-list failure
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The blocking image task was cancelled or panicked
    #[error("Image processing task failed: {message}")]
    Task { message: String },
}

/// Errors that terminate an upload request
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    /// Request carried no user token
    #[error("Unauthorized: Missing user token")]
    Unauthorized,

    /// Token or file name rejected by the locator
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// The multipart body could not be parsed
    #[error("Invalid form: {message}")]
    InvalidForm { message: String },

    /// The form did not contain a `file` field
    #[error("Invalid file: missing \"file\" field")]
    MissingFile,

    /// The request body exceeds the configured upload limit
    #[error("File too large (max: {max_size} bytes)")]
    TooLarge { max_size: usize },

    /// The uploaded payload is not an allowed image format
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Writing the file to disk failed
    #[error("Failed to save image: {message}")]
    Io { message: String },
}
