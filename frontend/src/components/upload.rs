//! Single-file upload widget with drag & drop support.
//!
//! Two panels share one [`UploadFlow`]: the drop view collects a file,
//! the confirm view shows its name and starts the transfer.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, FileList, HtmlInputElement};

use crate::config::{ids, UploadMode};
use crate::services::{navigate_to, upload_file};
use crate::state::{Completion, SelectionOutcome, UploadFlow};
use crate::types::{SelectedFile, UploadError, ViewState};
use crate::components::{ErrorModal, UploadProgress};

fn file_list_to_vec(list: FileList) -> Vec<File> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

#[component]
pub fn UploadWidget(mode: UploadMode) -> impl IntoView {
    let flow = create_rw_signal(UploadFlow::new(mode));
    // Browser handle of the file the flow currently tracks.
    let selected = store_value(None::<File>);
    let (dragging, set_dragging) = create_signal(false);

    let accept_files = move |list: Option<FileList>| {
        let files = list.map(file_list_to_vec).unwrap_or_default();
        let metadata = files.iter().map(SelectedFile::from_file).collect();

        match flow.try_update(|f| f.select(metadata)) {
            Some(SelectionOutcome::Accepted) => {
                let file = files.into_iter().next();
                if let Some(file) = &file {
                    log::info!("📄 Selected {} ({} bytes)", file.name(), file.size());
                }
                selected.set_value(file);
            }
            Some(SelectionOutcome::TooManyFiles(count)) => {
                log::warn!("⚠️ {} files dropped, only one is supported", count);
            }
            Some(SelectionOutcome::Busy) => {
                log::warn!("⚠️ Upload in progress or finished, selection ignored");
            }
            Some(SelectionOutcome::Ignored) | None => {}
        }
    };

    let on_file_change = move |ev: Event| {
        ev.prevent_default();
        let input: HtmlInputElement = event_target(&ev);
        accept_files(input.files());
        // Allow picking the same file again after a reset.
        input.set_value("");
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        accept_files(ev.data_transfer().and_then(|transfer| transfer.files()));
    };

    let on_drag_enter = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(true);
        log::debug!("drag enter");
    };

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        log::debug!("drag leave");
    };

    // Clicking anywhere on the drop zone opens the hidden picker
    let open_file_explorer = move |_| {
        if let Some(input) = gloo_utils::document().get_element_by_id(ids::FILE_INPUT) {
            if let Some(html_input) = input.dyn_ref::<HtmlInputElement>() {
                html_input.click();
            }
        }
    };

    let on_cancel = move |_| {
        if flow.try_update(|f| f.reset()) == Some(true) {
            selected.set_value(None);
            log::info!("🚫 Selection cleared");
        }
    };

    let on_upload = move |_| {
        let file = match flow.try_update(|f| f.begin_upload()) {
            Some(Ok(_)) => selected.get_value(),
            Some(Err(e)) => {
                log::warn!("Upload not started: {}", e);
                return;
            }
            None => return,
        };
        let Some(file) = file else {
            log::error!("❌ Flow and browser file out of sync");
            flow.update(|f| {
                f.finish(Completion::Failed(UploadError::NoFileSelected));
            });
            return;
        };

        log::info!("📤 Uploading {} ({} mode)", file.name(), mode);
        spawn_local(async move {
            let completion = upload_file(mode, file, move |loaded, total| {
                flow.update(|f| {
                    f.record_progress(loaded, total);
                });
            })
            .await;

            if let Completion::Failed(e) = &completion {
                log::error!("❌ Upload failed: {}", e);
            }

            if let Some(target) = flow.try_update(|f| f.finish(completion)).flatten() {
                log::info!("✅ Upload complete, redirecting to {}", target);
                if let Err(e) = navigate_to(&target) {
                    log::error!("❌ {}", e);
                    flow.update(|f| f.fail(e));
                }
            }
        });
    };

    let in_view = move |panel: ViewState| flow.with(|f| f.view() == panel);
    let is_uploading = move || flow.with(|f| f.is_uploading());
    let is_locked = move || flow.with(|f| f.is_locked());

    view! {
        <div
            id=ids::DROP_CONTAINER
            class="drop-container"
            class:deactivated=move || !in_view(ViewState::Drop)
        >
            <div
                id=ids::DROP_ZONE
                class="drop-zone"
                class:dragover=move || dragging.get()
                on:click=open_file_explorer
                on:dragenter=on_drag_enter
                on:dragleave=on_drag_leave
                on:dragover=|ev: DragEvent| ev.prevent_default()
                on:drop=on_drop
            >
                <div class="upload-icon">"📤"</div>
                <div class="upload-text">"Drop a file here"</div>
                <div class="upload-hint">"or click to select one"</div>
            </div>

            <Show
                when=move || flow.with(|f| f.notice().is_some())
                fallback=|| view! { }
            >
                <div class="drop-notice">
                    {move || flow.with(|f| f.notice().unwrap_or_default().to_string())}
                </div>
            </Show>

            <input
                type="file"
                id=ids::FILE_INPUT
                style="display:none"
                on:change=on_file_change
            />
        </div>

        <div
            id=ids::UPLOAD_DIALOG
            class="upload-dialog"
            class:deactivated=move || !in_view(ViewState::Confirm)
        >
            <div class="file-label">
                <span id=ids::FILE_NAME>
                    {move || flow.with(|f| f.file().map(|file| file.name.clone()).unwrap_or_default())}
                </span>
            </div>

            <UploadProgress
                value=Signal::derive(move || flow.with(|f| f.progress()))
                visible=Signal::derive(move || flow.with(|f| f.progress_visible()))
            />

            <div class="upload-actions">
                <button
                    class="upload-button"
                    on:click=on_upload
                    disabled=is_locked
                >
                    {move || if is_uploading() { "Uploading..." } else { "Upload" }}
                </button>
                <button
                    class="cancel-button"
                    on:click=on_cancel
                    disabled=is_locked
                >
                    "Cancel"
                </button>
            </div>
        </div>

        <ErrorModal
            open=Signal::derive(move || flow.with(|f| f.error().is_some()))
            on_close=Callback::new(move |_| flow.update(|f| f.dismiss_error()))
        />
    }
}
