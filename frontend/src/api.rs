use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::{BatchScanResponse, ResetResponse};
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use yew::html::Scope;

use crate::{Model, Msg};

/// Header carrying the session id; must match the backend's expectation.
pub const SESSION_HEADER: &str = "X-Scan-Session";

/// Posts the given files as one multipart batch. The backend scans them in
/// order and answers with every per-image result at once.
pub fn scan_files(link: Scope<Model>, session_id: Uuid, files: Vec<GlooFile>) {
    spawn_local(async move {
        let form_data = web_sys::FormData::new().unwrap();
        for file in &files {
            form_data
                .append_with_blob_and_filename("image", file.as_ref(), &file.name())
                .unwrap();
        }

        let request = Request::post("/api/scan")
            .header(SESSION_HEADER, &session_id.to_string())
            .body(form_data)
            .expect("Failed to build request.");

        match request.send().await {
            Ok(response) => {
                if response.ok() {
                    match response.json::<BatchScanResponse>().await {
                        Ok(batch) => link.send_message(Msg::ScanFinished(batch)),
                        Err(e) => link.send_message(Msg::SetError(Some(format!(
                            "Failed to parse response: {}",
                            e
                        )))),
                    }
                } else {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    link.send_message(Msg::SetError(Some(format!(
                        "Server error: {} - {}",
                        status, body
                    ))))
                }
            }
            Err(e) => link.send_message(Msg::SetError(Some(format!("Network error: {}", e)))),
        }
    });
}

/// Restores results cached earlier in this session (e.g. after a reload).
/// Failures are logged, not surfaced; a fresh session simply starts empty.
pub fn fetch_session(link: Scope<Model>, session_id: Uuid) {
    spawn_local(async move {
        let request = Request::get("/api/session")
            .header(SESSION_HEADER, &session_id.to_string())
            .build()
            .expect("Failed to build request.");

        match request.send().await {
            Ok(response) if response.ok() => {
                match response.json::<BatchScanResponse>().await {
                    Ok(batch) => {
                        if !batch.results.is_empty() {
                            link.send_message(Msg::SessionRestored(batch.results));
                        }
                    }
                    Err(e) => log::warn!("Failed to parse session snapshot: {}", e),
                }
            }
            Ok(response) => log::warn!("Session snapshot failed: {}", response.status()),
            Err(e) => log::warn!("Session snapshot failed: {}", e),
        }
    });
}

/// Discards the server-side session cache.
pub fn reset_session(link: Scope<Model>, session_id: Uuid) {
    spawn_local(async move {
        let request = Request::post("/api/session/reset")
            .header(SESSION_HEADER, &session_id.to_string())
            .build()
            .expect("Failed to build request.");

        match request.send().await {
            Ok(response) => {
                if response.ok() {
                    match response.json::<ResetResponse>().await {
                        Ok(reset) => link.send_message(Msg::SessionCleared(reset.cleared)),
                        Err(e) => link.send_message(Msg::SetError(Some(format!(
                            "Failed to parse response: {}",
                            e
                        )))),
                    }
                } else {
                    let status = response.status();
                    link.send_message(Msg::SetError(Some(format!(
                        "Reset failed: {}",
                        status
                    ))))
                }
            }
            Err(e) => link.send_message(Msg::SetError(Some(format!("Network error: {}", e)))),
        }
    });
}
