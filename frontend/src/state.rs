//! Upload state machine.
//!
//! Holds everything the widget decides, independent of the DOM, so the
//! component only forwards browser events here and renders the result.
//!
//! ```text
//! Idle ──select──▶ FileSelected ──upload──▶ Uploading ──204/200──▶ Succeeded(redirect)
//!  ▲                   ▲   │                    │
//!  └──────reset────────┘   │                    └──error──▶ Failed ──upload──▶ Uploading
//!                          └──select (replace)
//! ```

use crate::config::{file_page_url, UploadMode};
use crate::types::{SelectedFile, UploadDescriptor, UploadError, UploadResult, ViewState};

/// HTTP status the local server answers a direct upload with.
pub const DIRECT_SUCCESS_STATUS: u16 = 200;

/// HTTP status the storage provider answers a pre-signed POST with.
pub const EXTERNAL_SUCCESS_STATUS: u16 = 204;

/// Phase of the current upload cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Uploading,
    /// Transfer accepted; holds the page to navigate to.
    Succeeded(String),
    /// Transfer failed; the file is kept for a manual retry.
    Failed,
}

/// Result of handing a file list to the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Exactly one file, now pending confirmation.
    Accepted,
    /// Empty list; nothing changes.
    Ignored,
    /// More than one file; nothing changes, the user is told why.
    TooManyFiles(usize),
    /// A transfer is in flight or already succeeded; the selection is locked.
    Busy,
}

/// Terminal outcome of a transfer. Consumed exactly once by [`UploadFlow::finish`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Redirect(String),
    Failed(UploadError),
}

impl Completion {
    /// Direct mode: `200` carries the file identifier as plain text.
    pub fn from_direct_response(status: u16, body: &str) -> Self {
        if status != DIRECT_SUCCESS_STATUS {
            return Completion::Failed(UploadError::Status {
                status,
                expected: DIRECT_SUCCESS_STATUS,
            });
        }
        let identifier = body.trim();
        if identifier.is_empty() {
            return Completion::Failed(UploadError::EmptyIdentifier);
        }
        Completion::Redirect(file_page_url(identifier))
    }

    /// External mode: only `204` counts, and the file lives under the issued key.
    pub fn from_external_response(status: u16, key: &str) -> Self {
        if status == EXTERNAL_SUCCESS_STATUS {
            Completion::Redirect(file_page_url(key))
        } else {
            Completion::Failed(UploadError::Status {
                status,
                expected: EXTERNAL_SUCCESS_STATUS,
            })
        }
    }
}

impl From<UploadResult<Completion>> for Completion {
    fn from(result: UploadResult<Completion>) -> Self {
        result.unwrap_or_else(Completion::Failed)
    }
}

/// Parse the reply to `GET /u`. Any non-2xx status fails before a body is read.
pub fn parse_descriptor(status: u16, body: &str) -> UploadResult<UploadDescriptor> {
    if !(200..300).contains(&status) {
        return Err(UploadError::Status {
            status,
            expected: 200,
        });
    }
    Ok(serde_json::from_str(body)?)
}

/// Percentage shown by the progress indicator, clamped to `[0, 100]`.
pub fn progress_percent(loaded: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() || !loaded.is_finite() {
        return 0.0;
    }
    (100.0 * loaded / total).clamp(0.0, 100.0)
}

/// Widget state: at most one file, at most one transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadFlow {
    mode: UploadMode,
    phase: UploadPhase,
    file: Option<SelectedFile>,
    /// `None` while the indicator is hidden.
    progress: Option<f64>,
    error: Option<UploadError>,
    notice: Option<String>,
}

impl UploadFlow {
    pub fn new(mode: UploadMode) -> Self {
        Self {
            mode,
            phase: UploadPhase::Idle,
            file: None,
            progress: None,
            error: None,
            notice: None,
        }
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// No further interaction while a transfer runs or once it succeeded;
    /// the page is about to be replaced.
    pub fn is_locked(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading | UploadPhase::Succeeded(_))
    }

    /// Confirm view whenever a file is pending, including after a failure.
    pub fn view(&self) -> ViewState {
        if self.file.is_some() {
            ViewState::Confirm
        } else {
            ViewState::Drop
        }
    }

    /// Current progress value, `0` when hidden.
    pub fn progress(&self) -> f64 {
        self.progress.unwrap_or(0.0)
    }

    pub fn progress_visible(&self) -> bool {
        self.progress.is_some()
    }

    /// Error shown in the modal, if any.
    pub fn error(&self) -> Option<&UploadError> {
        self.error.as_ref()
    }

    /// Inline message for rejected drops.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Offer a list of files from the picker or a drop.
    pub fn select(&mut self, files: Vec<SelectedFile>) -> SelectionOutcome {
        if self.is_locked() {
            return SelectionOutcome::Busy;
        }
        match files.len() {
            0 => SelectionOutcome::Ignored,
            1 => {
                self.file = files.into_iter().next();
                self.phase = UploadPhase::FileSelected;
                self.notice = None;
                SelectionOutcome::Accepted
            }
            count => {
                self.notice = Some(format!(
                    "Only one file can be uploaded at a time ({} were dropped)",
                    count
                ));
                SelectionOutcome::TooManyFiles(count)
            }
        }
    }

    /// Back to the drop zone. Refused while a transfer is in flight,
    /// since it cannot be aborted, and after it succeeded.
    pub fn reset(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.file = None;
        self.phase = UploadPhase::Idle;
        self.progress = None;
        self.error = None;
        self.notice = None;
        true
    }

    /// Enter `Uploading` and show the indicator at 0.
    ///
    /// Returns the file being sent so the caller can log it.
    pub fn begin_upload(&mut self) -> UploadResult<SelectedFile> {
        match self.phase {
            UploadPhase::Uploading => return Err(UploadError::AlreadyUploading),
            UploadPhase::Succeeded(_) => return Err(UploadError::AlreadyUploaded),
            _ => {}
        }
        let file = self.file.clone().ok_or(UploadError::NoFileSelected)?;
        self.phase = UploadPhase::Uploading;
        self.progress = Some(0.0);
        self.error = None;
        Ok(file)
    }

    /// Record a progress event; ignored outside a transfer.
    pub fn record_progress(&mut self, loaded: f64, total: f64) -> f64 {
        if !self.is_uploading() {
            return self.progress();
        }
        let percent = progress_percent(loaded, total);
        self.progress = Some(percent);
        percent
    }

    /// Close the cycle. Returns the navigation target on success.
    ///
    /// A completion arriving when no transfer is running is dropped.
    pub fn finish(&mut self, completion: Completion) -> Option<String> {
        if !self.is_uploading() {
            return None;
        }
        match completion {
            Completion::Redirect(target) => {
                self.progress = Some(100.0);
                self.phase = UploadPhase::Succeeded(target.clone());
                Some(target)
            }
            Completion::Failed(err) => {
                self.progress = None;
                self.error = Some(err);
                self.phase = UploadPhase::Failed;
                None
            }
        }
    }

    /// Close the error modal. The file stays selected.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Record a failure that happened outside `finish`, e.g. the
    /// navigation call itself.
    pub fn fail(&mut self, err: UploadError) {
        self.progress = None;
        self.error = Some(err);
        if self.file.is_some() {
            self.phase = UploadPhase::Failed;
        }
    }
}
