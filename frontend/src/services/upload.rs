//! HTTP service for sending the selected file.
//!
//! One upload cycle is written once against [`UploadTransport`]. The
//! browser implementation fetches the descriptor through `gloo-net` and
//! sends the form with `XMLHttpRequest`, because `fetch` reports no
//! upload progress; its callbacks are bridged into a `Promise` so the
//! caller can `await` it.

use gloo_net::http::Request;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, ProgressEvent, XmlHttpRequest};

use crate::config::{UploadMode, FILE_FIELD, UPLOAD_ENDPOINT};
use crate::state::{parse_descriptor, Completion};
use crate::types::{UploadDescriptor, UploadError, UploadResult};

/// Multipart form for one transfer: text fields first, then the file.
#[derive(Debug)]
pub struct UploadForm<F> {
    pub fields: Vec<(&'static str, String)>,
    pub file: F,
    /// Name the file is sent under; the browser's own name when `None`.
    pub file_name: Option<String>,
}

/// Status and body of a finished transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReply {
    pub status: u16,
    pub body: String,
}

/// Network operations an upload cycle needs.
#[allow(async_fn_in_trait)]
pub trait UploadTransport {
    /// Handle to the file bytes.
    type File;

    /// `GET /u?name=<file name>`, parsed into a descriptor.
    async fn fetch_descriptor(&self, file_name: &str) -> UploadResult<UploadDescriptor>;

    /// POST `form` to `url`. `on_progress` receives `(loaded, total)` byte counts.
    async fn send_form(
        &self,
        url: &str,
        form: UploadForm<Self::File>,
        on_progress: impl Fn(f64, f64) + 'static,
    ) -> UploadResult<TransferReply>;
}

/// Run one upload cycle in the given mode and report how it ended.
pub async fn upload_with<T: UploadTransport>(
    transport: &T,
    mode: UploadMode,
    file: T::File,
    file_name: &str,
    on_progress: impl Fn(f64, f64) + 'static,
) -> Completion {
    let result = match mode {
        UploadMode::Direct => upload_direct(transport, file, on_progress).await,
        UploadMode::External => upload_external(transport, file, file_name, on_progress).await,
    };
    result.into()
}

/// Multipart `POST /u`; the server answers with the file identifier.
async fn upload_direct<T: UploadTransport>(
    transport: &T,
    file: T::File,
    on_progress: impl Fn(f64, f64) + 'static,
) -> UploadResult<Completion> {
    let form = UploadForm {
        fields: Vec::new(),
        file,
        file_name: None,
    };
    let reply = transport.send_form(UPLOAD_ENDPOINT, form, on_progress).await?;
    Ok(Completion::from_direct_response(reply.status, &reply.body))
}

/// Fetch a signed descriptor, then post the file to the storage provider.
async fn upload_external<T: UploadTransport>(
    transport: &T,
    file: T::File,
    file_name: &str,
    on_progress: impl Fn(f64, f64) + 'static,
) -> UploadResult<Completion> {
    let descriptor = transport.fetch_descriptor(file_name).await?;
    log::info!("📝 Descriptor issued for key {}", descriptor.key);

    let form = UploadForm {
        fields: descriptor
            .form_fields()
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect(),
        file,
        // The object is stored under the issued key, not the local file name.
        file_name: Some(descriptor.key.clone()),
    };
    let reply = transport.send_form(&descriptor.url, form, on_progress).await?;
    Ok(Completion::from_external_response(reply.status, &descriptor.key))
}

/// Upload a browser file with [`BrowserTransport`].
pub async fn upload_file(
    mode: UploadMode,
    file: File,
    on_progress: impl Fn(f64, f64) + 'static,
) -> Completion {
    let name = file.name();
    upload_with(&BrowserTransport, mode, file, &name, on_progress).await
}

/// Transport backed by `fetch` and `XMLHttpRequest`.
pub struct BrowserTransport;

impl UploadTransport for BrowserTransport {
    type File = File;

    async fn fetch_descriptor(&self, file_name: &str) -> UploadResult<UploadDescriptor> {
        let response = Request::get(UPLOAD_ENDPOINT)
            .query([("name", file_name)])
            .send()
            .await
            .map_err(|e| UploadError::Network(format!("Descriptor request failed: {}", e)))?;

        let status = response.status();
        if !response.ok() {
            return parse_descriptor(status, "");
        }
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to read descriptor: {}", e)))?;
        parse_descriptor(status, &body)
    }

    async fn send_form(
        &self,
        url: &str,
        form: UploadForm<File>,
        on_progress: impl Fn(f64, f64) + 'static,
    ) -> UploadResult<TransferReply> {
        let form_data = to_form_data(&form)?;
        send_xhr(url, &form_data, on_progress).await
    }
}

fn to_form_data(form: &UploadForm<File>) -> UploadResult<FormData> {
    let form_data = FormData::new()
        .map_err(|e| UploadError::Browser(format!("Failed to create FormData: {:?}", e)))?;
    for (name, value) in &form.fields {
        form_data
            .append_with_str(name, value)
            .map_err(|e| UploadError::Browser(format!("Failed to append {}: {:?}", name, e)))?;
    }
    let appended = match &form.file_name {
        Some(file_name) => form_data.append_with_blob_and_filename(FILE_FIELD, &form.file, file_name),
        None => form_data.append_with_blob(FILE_FIELD, &form.file),
    };
    appended.map_err(|e| UploadError::Browser(format!("Failed to append file: {:?}", e)))?;
    Ok(form_data)
}

/// POST a form with `XMLHttpRequest`, forwarding upload progress.
///
/// Resolves once `load` fires (any status) and rejects on `error`/`abort`.
async fn send_xhr(
    url: &str,
    form_data: &FormData,
    on_progress: impl Fn(f64, f64) + 'static,
) -> UploadResult<TransferReply> {
    let xhr = XmlHttpRequest::new()
        .map_err(|e| UploadError::Browser(format!("Failed to create request: {:?}", e)))?;

    let progress = Closure::wrap(Box::new(move |event: ProgressEvent| {
        if event.length_computable() {
            on_progress(event.loaded(), event.total());
        }
    }) as Box<dyn FnMut(ProgressEvent)>);
    xhr.upload()
        .map_err(|e| UploadError::Browser(format!("Upload target unavailable: {:?}", e)))?
        .set_onprogress(Some(progress.as_ref().unchecked_ref()));

    // Settle a promise from the XHR callbacks. The closures must outlive
    // the request, so they are kept alive until the await below returns.
    let mut callbacks: Vec<Closure<dyn FnMut(web_sys::Event)>> = Vec::new();
    let settled = Promise::new(&mut |resolve: Function, reject: Function| {
        let onload = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let _ = resolve.call0(&JsValue::NULL);
        }) as Box<dyn FnMut(web_sys::Event)>);
        xhr.set_onload(Some(onload.as_ref().unchecked_ref()));

        let fail = reject.clone();
        let onerror = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let _ = fail.call1(&JsValue::NULL, &JsValue::from_str("transport error"));
        }) as Box<dyn FnMut(web_sys::Event)>);
        xhr.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let onabort = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("request aborted"));
        }) as Box<dyn FnMut(web_sys::Event)>);
        xhr.set_onabort(Some(onabort.as_ref().unchecked_ref()));

        callbacks.push(onload);
        callbacks.push(onerror);
        callbacks.push(onabort);
    });

    xhr.open("POST", url)
        .map_err(|e| UploadError::Browser(format!("Failed to open request: {:?}", e)))?;
    xhr.send_with_opt_form_data(Some(form_data))
        .map_err(|e| UploadError::Network(format!("Failed to send request: {:?}", e)))?;

    let outcome = JsFuture::from(settled).await;
    drop(callbacks);
    drop(progress);

    outcome.map_err(|e| {
        UploadError::Network(e.as_string().unwrap_or_else(|| "Unknown transport error".to_string()))
    })?;

    let status = xhr
        .status()
        .map_err(|e| UploadError::Browser(format!("Failed to read status: {:?}", e)))?;
    let body = xhr
        .response_text()
        .map_err(|e| UploadError::Browser(format!("Failed to read response: {:?}", e)))?
        .unwrap_or_default();

    Ok(TransferReply { status, body })
}

/// Send the browser to `target`, replacing the upload page in history.
pub fn navigate_to(target: &str) -> UploadResult<()> {
    gloo_utils::window()
        .location()
        .replace(target)
        .map_err(|e| UploadError::Browser(format!("Navigation failed: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::UploadFlow;
    use crate::types::SelectedFile;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// One recorded `send_form` call.
    #[derive(Debug, Clone, PartialEq)]
    struct SentForm {
        url: String,
        fields: Vec<(&'static str, String)>,
        file: String,
        file_name: Option<String>,
    }

    /// Transport answering from canned values and recording every call.
    struct RecordingTransport {
        descriptor: (u16, &'static str),
        reply: UploadResult<TransferReply>,
        fetched: RefCell<Vec<String>>,
        sent: RefCell<Vec<SentForm>>,
    }

    impl RecordingTransport {
        fn new(descriptor: (u16, &'static str), reply: UploadResult<TransferReply>) -> Self {
            Self {
                descriptor,
                reply,
                fetched: RefCell::new(Vec::new()),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn replying(status: u16, body: &str) -> Self {
            Self::new(
                (200, DESCRIPTOR),
                Ok(TransferReply {
                    status,
                    body: body.to_string(),
                }),
            )
        }
    }

    impl UploadTransport for RecordingTransport {
        type File = String;

        async fn fetch_descriptor(&self, file_name: &str) -> UploadResult<UploadDescriptor> {
            self.fetched.borrow_mut().push(file_name.to_string());
            parse_descriptor(self.descriptor.0, self.descriptor.1)
        }

        async fn send_form(
            &self,
            url: &str,
            form: UploadForm<String>,
            on_progress: impl Fn(f64, f64) + 'static,
        ) -> UploadResult<TransferReply> {
            on_progress(512.0, 1024.0);
            on_progress(1024.0, 1024.0);
            self.sent.borrow_mut().push(SentForm {
                url: url.to_string(),
                fields: form.fields,
                file: form.file,
                file_name: form.file_name,
            });
            self.reply.clone()
        }
    }

    const DESCRIPTOR: &str = r#"{
        "url": "https://storage.example.com/file_transfer",
        "key": "8734621197",
        "x-amz-algorithm": "AWS4-HMAC-SHA256",
        "x-amz-credential": "AKIA/20240101/eu-central-1/s3/aws4_request",
        "x-amz-date": "20240101T000000Z",
        "policy": "eyJleHBpcmF0aW9uIjoi",
        "x-amz-signature": "5d672d79c15b"
    }"#;

    fn run(transport: &RecordingTransport, mode: UploadMode) -> Completion {
        block_on(upload_with(transport, mode, "bytes".to_string(), "report.pdf", |_, _| {}))
    }

    #[test]
    fn test_external_unavailable_descriptor_never_posts() {
        let transport = RecordingTransport::new((503, "Service Unavailable"), Err(UploadError::NoFileSelected));

        let completion = run(&transport, UploadMode::External);

        assert_eq!(
            completion,
            Completion::Failed(UploadError::Status { status: 503, expected: 200 })
        );
        assert_eq!(*transport.fetched.borrow(), ["report.pdf"]);
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_external_malformed_descriptor_never_posts() {
        let transport = RecordingTransport::new((200, "<html>"), Err(UploadError::NoFileSelected));

        let completion = run(&transport, UploadMode::External);

        assert!(matches!(completion, Completion::Failed(UploadError::Descriptor(_))));
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn test_external_204_redirects_to_issued_key() {
        let transport = RecordingTransport::replying(204, "");

        let completion = run(&transport, UploadMode::External);
        assert_eq!(completion, Completion::Redirect("/f/8734621197".to_string()));

        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://storage.example.com/file_transfer");
        assert_eq!(sent[0].file, "bytes");
        assert_eq!(sent[0].file_name.as_deref(), Some("8734621197"));
        let names: Vec<&str> = sent[0].fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["key", "x-amz-algorithm", "x-amz-credential", "x-amz-date", "policy", "x-amz-signature"]
        );

        // The completion drives the flow to the file page.
        let mut flow = UploadFlow::new(UploadMode::External);
        flow.select(vec![SelectedFile::new("report.pdf", 5)]);
        flow.begin_upload().unwrap();
        assert_eq!(flow.finish(completion).as_deref(), Some("/f/8734621197"));
    }

    #[test]
    fn test_external_non_204_fails() {
        for status in [200, 403] {
            let transport = RecordingTransport::replying(status, "");
            assert_eq!(
                run(&transport, UploadMode::External),
                Completion::Failed(UploadError::Status { status, expected: 204 })
            );
            assert_eq!(transport.sent.borrow().len(), 1);
        }
    }

    #[test]
    fn test_direct_posts_to_local_endpoint() {
        let transport = RecordingTransport::replying(200, "abc123\n");

        let completion = run(&transport, UploadMode::Direct);

        assert_eq!(completion, Completion::Redirect("/f/abc123".to_string()));
        assert!(transport.fetched.borrow().is_empty());
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].url, "/u");
        assert!(sent[0].fields.is_empty());
        assert_eq!(sent[0].file_name, None);
    }

    #[test]
    fn test_direct_server_error_fails() {
        let transport = RecordingTransport::replying(500, "Internal Server Error");
        assert_eq!(
            run(&transport, UploadMode::Direct),
            Completion::Failed(UploadError::Status { status: 500, expected: 200 })
        );
    }

    #[test]
    fn test_transport_error_fails() {
        let transport =
            RecordingTransport::new((200, DESCRIPTOR), Err(UploadError::Network("transport error".into())));
        assert_eq!(
            run(&transport, UploadMode::Direct),
            Completion::Failed(UploadError::Network("transport error".into()))
        );
    }

    #[test]
    fn test_progress_is_forwarded() {
        let transport = RecordingTransport::replying(200, "abc123");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        block_on(upload_with(
            &transport,
            UploadMode::Direct,
            "bytes".to_string(),
            "report.pdf",
            move |loaded, total| sink.borrow_mut().push((loaded, total)),
        ));

        assert_eq!(*seen.borrow(), [(512.0, 1024.0), (1024.0, 1024.0)]);
    }
}
