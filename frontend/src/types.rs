//! Common types used across the frontend application.
//!
//! # Categories
//!
//! - **Selection Types** - metadata of the file picked by the user
//! - **View Types** - which panel of the widget is visible
//! - **API Types** - the pre-signed upload descriptor
//! - **Error Types** - upload failures and guard rejections

use serde::Deserialize;
use thiserror::Error;

// =============================================================================
// Selection Types
// =============================================================================

/// Platform-independent view of the selected file.
///
/// The bytes stay inside the browser `File`; only what the UI and the
/// state machine need is copied out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the browser
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Copy metadata out of a browser file handle.
    pub fn from_file(file: &web_sys::File) -> Self {
        // Blob sizes are reported as f64 by the DOM.
        Self::new(file.name(), file.size().max(0.0) as u64)
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Visible panel of the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Drop zone waiting for a file
    #[default]
    Drop,
    /// File chosen, waiting for the user to confirm the upload
    Confirm,
}

// =============================================================================
// API Types
// =============================================================================

/// Pre-signed POST descriptor returned by `GET /u` in external mode.
///
/// The storage provider validates the form fields against the policy, so
/// they are forwarded verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadDescriptor {
    /// Object key issued by the server; also the public file identifier
    pub key: String,
    /// Storage endpoint the form is posted to
    pub url: String,
    #[serde(rename = "x-amz-algorithm")]
    pub algorithm: String,
    #[serde(rename = "x-amz-credential")]
    pub credential: String,
    #[serde(rename = "x-amz-date")]
    pub date: String,
    pub policy: String,
    #[serde(rename = "x-amz-signature")]
    pub signature: String,
}

impl UploadDescriptor {
    /// Signing fields in the order they precede the file in the form.
    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("key", self.key.as_str()),
            ("x-amz-algorithm", self.algorithm.as_str()),
            ("x-amz-credential", self.credential.as_str()),
            ("x-amz-date", self.date.as_str()),
            ("policy", self.policy.as_str()),
            ("x-amz-signature", self.signature.as_str()),
        ]
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Upload failures and rejected widget operations.
///
/// Every variant produced by the transfer itself ends in the same generic
/// error dialog; the distinction only reaches the console log.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Transport-level failure (connection refused, CORS, aborted).
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a status other than the expected one.
    #[error("Unexpected response status {status} (expected {expected})")]
    Status { status: u16, expected: u16 },

    /// Direct upload answered 200 with a blank body.
    #[error("Server returned an empty file identifier")]
    EmptyIdentifier,

    /// Descriptor body could not be parsed.
    #[error("Invalid upload descriptor: {0}")]
    Descriptor(String),

    /// A browser API refused an operation (FormData, XHR setup, navigation).
    #[error("Browser error: {0}")]
    Browser(String),

    /// `upload` was called while a transfer is in flight.
    #[error("An upload is already in progress")]
    AlreadyUploading,

    /// `upload` was called after the file was stored; the page is leaving.
    #[error("The file has already been uploaded")]
    AlreadyUploaded,

    /// `upload` was called without a selected file.
    #[error("No file selected")]
    NoFileSelected,
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Descriptor(err.to_string())
    }
}

/// Result type alias for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_deserialization() {
        let json = r#"{
            "url": "https://storage.example.com/file_transfer",
            "key": "8734621197",
            "x-amz-algorithm": "AWS4-HMAC-SHA256",
            "x-amz-credential": "AKIA/20240101/eu-central-1/s3/aws4_request",
            "x-amz-date": "20240101T000000Z",
            "policy": "eyJleHBpcmF0aW9uIjoi",
            "x-amz-signature": "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        }"#;

        let descriptor: UploadDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.key, "8734621197");
        assert_eq!(descriptor.url, "https://storage.example.com/file_transfer");
        assert_eq!(descriptor.algorithm, "AWS4-HMAC-SHA256");

        let names: Vec<&str> = descriptor.form_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["key", "x-amz-algorithm", "x-amz-credential", "x-amz-date", "policy", "x-amz-signature"]
        );
        assert_eq!(descriptor.form_fields()[0].1, "8734621197");
    }

    #[test]
    fn test_descriptor_missing_signature_is_rejected() {
        let json = r#"{"url": "https://s3", "key": "1", "policy": "p"}"#;
        let err: UploadError = serde_json::from_str::<UploadDescriptor>(json).unwrap_err().into();
        assert!(matches!(err, UploadError::Descriptor(_)));
    }

    #[test]
    fn test_view_state_default() {
        assert_eq!(ViewState::default(), ViewState::Drop);
    }
}
