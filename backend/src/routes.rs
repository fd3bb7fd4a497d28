use actix_files::Files;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use log::info;
use serde::Serialize;
use shared::MAX_BATCH_IMAGES;
use std::io::Write;
use uuid::Uuid;

use crate::scan::service::{ScanService, UploadedImage};

/// Header carrying the caller's session id on every API request.
pub const SESSION_HEADER: &str = "X-Scan-Session";

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    configure_api(cfg);
    cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/scan").route(web::post().to(handle_scan)))
        .service(web::resource("/api/session").route(web::get().to(get_session)))
        .service(web::resource("/api/session/reset").route(web::post().to(reset_session)));
}

fn session_id_from(req: &HttpRequest) -> Result<Uuid, HttpResponse> {
    match req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(raw) => Uuid::parse_str(raw).map_err(|_| {
            HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("{} header is not a valid UUID", SESSION_HEADER),
            })
        }),
        None => Err(HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Missing {} header", SESSION_HEADER),
        })),
    }
}

async fn handle_scan(
    service: web::Data<ScanService>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let session_id = match session_id_from(&req) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let mut images: Vec<UploadedImage> = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("capture")
            .to_string();

        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        if !image_data.is_empty() {
            images.push(UploadedImage {
                file_name,
                data: image_data,
            });
        }
    }

    if images.len() > MAX_BATCH_IMAGES {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("A batch is limited to {} images", MAX_BATCH_IMAGES),
        }));
    }

    info!(
        "Scanning batch of {} image(s) for session {}",
        images.len(),
        session_id
    );
    let response = service.scan_batch(session_id, images).await;
    Ok(HttpResponse::Ok().json(response))
}

async fn get_session(service: web::Data<ScanService>, req: HttpRequest) -> HttpResponse {
    let session_id = match session_id_from(&req) {
        Ok(id) => id,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(service.session_snapshot(session_id).await)
}

async fn reset_session(service: web::Data<ScanService>, req: HttpRequest) -> HttpResponse {
    let session_id = match session_id_from(&req) {
        Ok(id) => id,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(service.reset_session(session_id).await)
}
