use super::utils::generate_id;
use crate::api;
use crate::{FileData, Model, Msg};
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{BatchScanResponse, ScanMode, ScanResponse, MAX_BATCH_IMAGES};
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn handle_files_added(model: &mut Model, ctx: &Context<Model>, files: Vec<GlooFile>) -> bool {
    let current_count = model.files.len();
    let available_slots = MAX_BATCH_IMAGES.saturating_sub(current_count);

    if files.len() > available_slots {
        model.error = Some(format!(
            "Upload limit exceeded. You can only add {} more images.",
            available_slots
        ));
        return true;
    }

    model.error = None;

    for file in files.into_iter() {
        let id = generate_id();
        let file_data = FileData {
            id,
            file: file.clone(),
            preview_url: None,
        };
        model.files.insert(id, file_data);

        let preview_url = ObjectUrl::from(file);
        ctx.link().send_message(Msg::AddPreview(id, preview_url));
    }

    true
}

pub fn handle_add_preview(model: &mut Model, id: u64, url: ObjectUrl) -> bool {
    if let Some(file_data) = model.files.get_mut(&id) {
        file_data.preview_url = Some(url);
        true
    } else {
        false
    }
}

pub fn handle_remove_file(model: &mut Model, id: u64) -> bool {
    if let Some(removed_file) = model.files.remove(&id) {
        model.results.remove(&removed_file.identity());
        drop(removed_file);

        if model.files.is_empty() {
            model.error = None;
        }

        true
    } else {
        false
    }
}

/// The manual batch trigger. Only images without a result are posted; the
/// backend cache would de-duplicate anyway, but skipping them here mirrors
/// the instant re-render of already-scanned images.
pub fn handle_start_scan(model: &mut Model, ctx: &Context<Model>) -> bool {
    if model.files.is_empty() {
        ctx.link()
            .send_message(Msg::SetError(Some("No images selected to scan.".into())));
        return false;
    }

    let pending: Vec<GlooFile> = sorted_files(model)
        .into_iter()
        .filter(|fd| !model.results.contains_key(&fd.identity()))
        .map(|fd| fd.file.clone())
        .collect();

    if pending.is_empty() {
        model.error = None;
        return true;
    }

    model.loading = true;
    model.error = None;
    model.future_requests += 1;
    api::scan_files(ctx.link().clone(), model.session_id, pending);
    true
}

/// Camera mode: a capture is scanned immediately, no start button involved.
pub fn handle_capture_scan(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let id = generate_id();
    let file_data = FileData {
        id,
        file: file.clone(),
        preview_url: None,
    };
    model.files.insert(id, file_data);
    ctx.link()
        .send_message(Msg::AddPreview(id, ObjectUrl::from(file.clone())));

    model.loading = true;
    model.error = None;
    model.future_requests += 1;
    api::scan_files(ctx.link().clone(), model.session_id, vec![file]);
    true
}

pub fn handle_scan_finished(model: &mut Model, batch: BatchScanResponse) -> bool {
    for result in batch.results {
        model.results.insert(result.identity.clone(), result);
    }
    model.future_requests = model.future_requests.saturating_sub(1);
    if model.future_requests == 0 {
        model.loading = false;
    }
    true
}

pub fn handle_session_restored(model: &mut Model, results: Vec<ScanResponse>) -> bool {
    log::info!("Restored {} cached scan(s) from this session", results.len());
    for result in results {
        model.results.insert(result.identity.clone(), result);
    }
    true
}

/// Full reset: local files and previews go away, and the backend discards
/// the session cache so every identity counts as unseen afterwards.
pub fn handle_reset_session(model: &mut Model, ctx: &Context<Model>) -> bool {
    for (_, file_data) in model.files.iter_mut() {
        let _ = file_data.preview_url.take();
    }
    model.files.clear();
    model.results.clear();
    model.error = None;
    model.loading = false;
    model.future_requests = 0;

    api::reset_session(ctx.link().clone(), model.session_id);
    true
}

pub fn handle_session_cleared(model: &mut Model, cleared: usize) -> bool {
    log::info!("Session reset confirmed, {} entries discarded", cleared);
    model.error = None;
    false
}

pub fn handle_set_mode(model: &mut Model, mode: ScanMode) -> bool {
    if model.mode == mode {
        return false;
    }
    log::info!("Input mode switched to {}", mode);
    model.mode = mode;
    model.error = None;
    true
}

pub fn handle_toggle_theme(model: &mut Model) -> bool {
    let body = web_sys::window().unwrap().document().unwrap().body().unwrap();

    if model.theme == "light" {
        model.theme = "dark".to_string();
        body.class_list().add_1("dark-mode").unwrap();
    } else {
        model.theme = "light".to_string();
        body.class_list().remove_1("dark-mode").unwrap();
    }

    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if model.mode != ScanMode::Batch {
        return true;
    }

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if model.mode != ScanMode::Batch {
        return false;
    }

    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            event.prevent_default();
            process_file_list(ctx, file_list);
            return true;
        }
    }
    false
}

pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    let mut files_to_process = Vec::new();

    for i in 0..file_list.length() {
        if let Some(file) = file_list.item(i) {
            if file.type_().starts_with("image/") {
                files_to_process.push(GlooFile::from(file));
            } else {
                log::warn!("Skipping non-image file: {}", file.name());
                ctx.link().send_message(Msg::SetError(Some(format!(
                    "Skipped non-image file: {}",
                    file.name()
                ))));
            }
        }
    }

    if !files_to_process.is_empty() {
        ctx.link().send_message(Msg::FilesAdded(files_to_process));
    }
}

/// Files in insertion order (ids are monotonic).
pub fn sorted_files(model: &Model) -> Vec<&FileData> {
    let mut files: Vec<&FileData> = model.files.values().collect();
    files.sort_by_key(|fd| fd.id);
    files
}
