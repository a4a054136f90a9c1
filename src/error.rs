//! # Error Handling
//!
//! Error types for the frame pipeline and the binary codecs.
//!
//! ## Error Classification
//!
//! Every failure in the pipeline falls into one of a few categories:
//!
//! - **Geometry**: the input frame cannot be normalized (zero width or height,
//!   pixel buffer disagreeing with the declared size)
//! - **Encoding**: the encoder was given input it cannot represent (an empty
//!   pixel sequence, a frame count past `u32::MAX`, a frame of the wrong kind)
//! - **Format**: a byte stream does not decode to a valid frame or container
//! - **Scale**: the resize primitive failed
//! - **Io**: reading input or writing output failed
//! - **Config**: invalid configuration, reported before any work starts
//!
//! Nothing in the pipeline is retried. A failing frame is surfaced to the
//! caller together with its [`ErrorContext`].
//!
//! ## Usage
//!
//! ```rust
//! use lcd_video::error::VidError;
//!
//! let error = VidError::format("rle_decode", "stream ended after 8000 of 8192 pixels")
//!     .with_frame_index(12)
//!     .with_context("reading video.bin");
//!
//! assert_eq!(error.category(), "format");
//! assert_eq!(error.context().frame_index, Some(12));
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt};

use mono_scale::ScaleError;

/// Metadata about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional free-form context
    pub context: Option<String>,
    /// Zero-based index of the frame being processed, if any
    pub frame_index: Option<u64>,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base error type for the pipeline and codecs.
#[derive(Debug)]
pub enum VidError {
    /// Frame geometry cannot be normalized
    Geometry {
        width: u32,
        height: u32,
        reason: String,
        context: ErrorContext,
    },
    /// Input cannot be encoded
    Encoding {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Encoded bytes are malformed
    Format {
        operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Resize primitive failure
    Scale {
        source: ScaleError,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
}

impl VidError {
    /// Create a geometry error
    pub fn geometry(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::Geometry {
            width,
            height,
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encoding error
    pub fn encoding(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a format error
    pub fn format(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            operation: operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error bound to a file path
    pub fn io_at(
        operation: impl Into<String>,
        path: impl AsRef<std::path::Path>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: Some(path.as_ref().display().to_string()),
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Record which frame was being processed
    pub fn with_frame_index(mut self, index: u64) -> Self {
        self.context_mut().frame_index = Some(index);
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Geometry { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Format { context, .. } => context,
            Self::Scale { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Config { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Geometry { context, .. } => context,
            Self::Encoding { context, .. } => context,
            Self::Format { context, .. } => context,
            Self::Scale { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Config { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Geometry { .. } => "geometry",
            Self::Encoding { .. } => "encoding",
            Self::Format { .. } => "format",
            Self::Scale { .. } => "scale",
            Self::Io { .. } => "io",
            Self::Config { .. } => "config",
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry { .. })
    }

    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

impl fmt::Display for VidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VidError::Geometry {
                width,
                height,
                reason,
                ..
            } => write!(f, "Invalid frame geometry {}x{}: {}", width, height, reason)?,
            VidError::Encoding {
                operation, reason, ..
            } => write!(f, "Encoding failed during {}: {}", operation, reason)?,
            VidError::Format {
                operation, reason, ..
            } => write!(f, "Malformed data during {}: {}", operation, reason)?,
            VidError::Scale { source, .. } => write!(f, "Frame scaling failed: {}", source)?,
            VidError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(f, "I/O error during {} on '{}': {}", operation, path, source)?
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)?
                }
            }
            VidError::Config {
                field,
                value,
                reason,
                ..
            } => write!(
                f,
                "Configuration error in '{}': {} (value: {})",
                field, reason, value
            )?,
        }
        if let Some(index) = self.context().frame_index {
            write!(f, " [frame {}]", index)?;
        }
        Ok(())
    }
}

impl StdError for VidError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Scale { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type VidResult<T> = Result<T, VidError>;

impl From<std::io::Error> for VidError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<ScaleError> for VidError {
    fn from(error: ScaleError) -> Self {
        match error {
            ScaleError::ZeroDimension { w, h } => {
                Self::geometry(w, h, "width and height must be non-zero")
            }
            source => Self::Scale {
                source,
                context: ErrorContext::new(),
            },
        }
    }
}
