mod api;
mod components;

use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_storage::{SessionStorage, Storage};
use shared::{BatchScanResponse, ScanMode, ScanResponse};
use std::collections::HashMap;
use uuid::Uuid;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

/// SessionStorage key holding the scan session id. The per-tab lifetime of
/// SessionStorage is what makes a "session": closing the tab abandons the
/// server-side cache entry.
const SESSION_STORAGE_KEY: &str = "cap-scan-session";

// Models
#[derive(Clone)]
pub struct FileData {
    pub id: u64,
    pub file: GlooFile,
    pub preview_url: Option<ObjectUrl>,
}

impl FileData {
    /// Mirrors the backend identity derivation: file name + byte size.
    pub fn identity(&self) -> String {
        format!("{}_{}", self.file.name(), self.file.size())
    }
}

// Yew msg components
pub enum Msg {
    // File operations
    FilesAdded(Vec<GlooFile>),
    AddPreview(u64, ObjectUrl),
    RemoveFile(u64),

    // Scan operations
    StartScan,
    CaptureScan(GlooFile),
    ScanFinished(BatchScanResponse),
    SessionRestored(Vec<ScanResponse>),

    // Session reset
    ResetSession,
    SessionCleared(usize),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    SetMode(ScanMode),
    ToggleTheme,

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
pub struct Model {
    pub session_id: Uuid,
    pub files: HashMap<u64, FileData>,
    /// Scan results keyed by image identity.
    pub results: HashMap<String, ScanResponse>,
    pub mode: ScanMode,
    pub loading: bool,
    pub error: Option<String>,
    pub is_dragging: bool,
    pub theme: String,
    pub future_requests: usize,
    pub paste_listener: Option<EventListener>,
}

fn load_or_create_session_id() -> Uuid {
    if let Ok(raw) = SessionStorage::get::<String>(SESSION_STORAGE_KEY) {
        if let Ok(id) = Uuid::parse_str(&raw) {
            return id;
        }
    }
    let id = Uuid::new_v4();
    if let Err(e) = SessionStorage::set(SESSION_STORAGE_KEY, id.to_string()) {
        log::warn!("Could not persist session id: {:?}", e);
    }
    id
}

// Yew component implementation
impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let session_id = load_or_create_session_id();

        let mut model = Self {
            session_id,
            files: HashMap::new(),
            results: HashMap::new(),
            mode: ScanMode::Batch,
            loading: false,
            error: None,
            is_dragging: false,
            theme: "light".to_string(),
            future_requests: 0,
            paste_listener: None,
        };

        let link = ctx.link().clone();
        let window = web_sys::window().expect("no global `window` exists");
        let listener = EventListener::new(&window, "paste", move |event| {
            if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                link.send_message(Msg::HandlePaste(clipboard_event.clone()));
            }
        });
        model.paste_listener = Some(listener);

        // Results scanned earlier in this tab survive a reload.
        api::fetch_session(ctx.link().clone(), session_id);

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FilesAdded(files) => components::handlers::handle_files_added(self, ctx, files),
            Msg::AddPreview(id, url) => components::handlers::handle_add_preview(self, id, url),
            Msg::RemoveFile(id) => components::handlers::handle_remove_file(self, id),

            // Scan operations
            Msg::StartScan => components::handlers::handle_start_scan(self, ctx),
            Msg::CaptureScan(file) => components::handlers::handle_capture_scan(self, ctx, file),
            Msg::ScanFinished(batch) => components::handlers::handle_scan_finished(self, batch),
            Msg::SessionRestored(results) => {
                components::handlers::handle_session_restored(self, results)
            }

            // Session reset
            Msg::ResetSession => components::handlers::handle_reset_session(self, ctx),
            Msg::SessionCleared(cleared) => {
                components::handlers::handle_session_cleared(self, cleared)
            }

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                self.loading = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::SetMode(mode) => components::handlers::handle_set_mode(self, mode),
            Msg::ToggleTheme => components::handlers::handle_toggle_theme(self),

            // Input events
            Msg::HandleDrop(event) => components::handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => components::handlers::handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { components::header::render_header() }
                { components::theme_toggle::render_theme_toggle(&self.theme, ctx.link()) }

                <main class="main-content">
                    { components::upload_section::render_mode_tabs(self, ctx) }
                    {
                        match self.mode {
                            ScanMode::Batch => {
                                components::upload_section::render_upload_section(self, ctx)
                            }
                            ScanMode::Camera => {
                                components::camera_section::render_camera_section(self, ctx)
                            }
                        }
                    }
                    { components::utils::render_error_message(self) }
                    { components::preview_area::render_preview_area(self, ctx) }
                    { components::results::render_restored_results(self) }
                </main>

                <footer class="app-footer">
                    <p>{"Cap Serial Scanner | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
