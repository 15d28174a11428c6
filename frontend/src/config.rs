//! Application configuration.
//!
//! Endpoints and element identifiers are fixed at compile time. The
//! destination mode is chosen per page: the server template renders a
//! `<meta name="filedrop-mode">` tag, and the `external` cargo feature
//! decides what happens when the tag is missing.

use std::fmt;
use std::str::FromStr;

/// Upload endpoint on the local server.
///
/// `POST` in direct mode, `GET` for the signed descriptor in external mode.
pub const UPLOAD_ENDPOINT: &str = "/u";

/// Prefix of the file page the browser is sent to after a successful upload.
pub const FILE_PAGE_PREFIX: &str = "/f/";

/// Name of the meta tag carrying the destination mode.
pub const MODE_META_NAME: &str = "filedrop-mode";

/// Multipart field holding the file itself.
pub const FILE_FIELD: &str = "file";

/// Element identifiers referenced by the widget.
pub mod ids {
    pub const FILE_INPUT: &str = "file-input";
    pub const DROP_ZONE: &str = "drop_zone";
    pub const DROP_CONTAINER: &str = "drop_container";
    pub const UPLOAD_DIALOG: &str = "upload_dialog";
    pub const FILE_NAME: &str = "file_name";
    pub const PROGRESS: &str = "progress";
    pub const ERROR_MODAL: &str = "error-modal";
}

/// Where the file bytes are sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadMode {
    /// Multipart `POST` straight to [`UPLOAD_ENDPOINT`].
    Direct,
    /// Fetch a pre-signed descriptor from [`UPLOAD_ENDPOINT`], then post
    /// to the storage URL it names.
    External,
}

impl UploadMode {
    /// Mode used when the page gives no hint.
    pub const fn compiled_default() -> Self {
        if cfg!(feature = "external") {
            UploadMode::External
        } else {
            UploadMode::Direct
        }
    }

    /// Resolve the mode from an optional page hint.
    ///
    /// Unknown values fall back to the compiled default.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("Unknown upload mode '{}', using default", value);
                Self::compiled_default()
            }),
            None => Self::compiled_default(),
        }
    }

    /// Read the mode from the current document.
    pub fn detect() -> Self {
        let hint = gloo_utils::document()
            .query_selector(&format!("meta[name=\"{}\"]", MODE_META_NAME))
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("content"));
        Self::from_hint(hint.as_deref())
    }
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The server template historically renders `extern = true|false`.
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" | "false" => Ok(UploadMode::Direct),
            "external" | "extern" | "true" => Ok(UploadMode::External),
            other => Err(format!("unknown upload mode: {}", other)),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Direct => write!(f, "direct"),
            UploadMode::External => write!(f, "external"),
        }
    }
}

/// Page the browser lands on once `identifier` is stored.
pub fn file_page_url(identifier: &str) -> String {
    format!("{}{}", FILE_PAGE_PREFIX, identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("direct".parse::<UploadMode>(), Ok(UploadMode::Direct));
        assert_eq!("External".parse::<UploadMode>(), Ok(UploadMode::External));
        assert_eq!(" true ".parse::<UploadMode>(), Ok(UploadMode::External));
        assert_eq!("false".parse::<UploadMode>(), Ok(UploadMode::Direct));
        assert!("s3".parse::<UploadMode>().is_err());
    }

    #[test]
    fn test_mode_from_hint() {
        assert_eq!(UploadMode::from_hint(Some("external")), UploadMode::External);
        assert_eq!(UploadMode::from_hint(Some("direct")), UploadMode::Direct);
        assert_eq!(UploadMode::from_hint(None), UploadMode::compiled_default());
        assert_eq!(UploadMode::from_hint(Some("bogus")), UploadMode::compiled_default());
    }

    #[test]
    fn test_file_page_url() {
        assert_eq!(file_page_url("abc123"), "/f/abc123");
    }
}
