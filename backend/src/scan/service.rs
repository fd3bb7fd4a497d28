use std::sync::Arc;

use image::ImageFormat;
use shared::{BatchScanResponse, ResetResponse, ScanOutcome, ScanResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::cache::models::{CachedScan, ImageIdentity};
use crate::cache::session_store::SessionStore;
use crate::vision::client::{Recognizer, VisionError};

/// One image lifted out of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Unsupported image format")]
    InvalidFormat,
    #[error("Image exceeds the {0} byte upload limit")]
    FileTooLarge(usize),
    #[error("Recognition failed: {0}")]
    Vision(#[from] VisionError),
}

/// Orchestrates a scanning session: identity derivation, cache lookup,
/// recognition, write-once storage. All failures collapse into a
/// [`ScanOutcome::Failed`] that is cached like any other result and never
/// retried automatically.
#[derive(Clone)]
pub struct ScanService {
    store: SessionStore,
    recognizer: Arc<dyn Recognizer>,
    max_upload_bytes: usize,
}

impl ScanService {
    pub fn new(
        store: SessionStore,
        recognizer: Arc<dyn Recognizer>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            recognizer,
            max_upload_bytes,
        }
    }

    /// Scans a batch strictly in upload order, one recognition call at a
    /// time. A slow call blocks the rest of the batch; there is no timeout
    /// and no cancellation.
    pub async fn scan_batch(
        &self,
        session_id: Uuid,
        images: Vec<UploadedImage>,
    ) -> BatchScanResponse {
        let mut results = Vec::with_capacity(images.len());
        for image in images {
            results.push(self.scan_image(session_id, image).await);
        }
        BatchScanResponse {
            session_id,
            results,
        }
    }

    pub async fn scan_image(&self, session_id: Uuid, image: UploadedImage) -> ScanResponse {
        let identity = ImageIdentity::derive(&image.file_name, image.data.len());

        if let Some(hit) = self.store.get(session_id, &identity).await {
            log::info!("Cache hit for {} in session {}", identity, session_id);
            return hit.to_scan_response(&identity, true);
        }

        let outcome = match self.recognize(&image).await {
            Ok(raw) => ScanOutcome::recognized(raw),
            Err(e) => {
                log::error!("Recognition failed for {}: {}", identity, e);
                ScanOutcome::failed(e.to_string())
            }
        };

        let stored = self
            .store
            .put(
                session_id,
                identity.clone(),
                CachedScan::new(image.file_name, outcome),
            )
            .await;
        stored.to_scan_response(&identity, false)
    }

    async fn recognize(&self, image: &UploadedImage) -> Result<String, ScanError> {
        if image.data.len() > self.max_upload_bytes {
            return Err(ScanError::FileTooLarge(self.max_upload_bytes));
        }
        let mime_type = sniff_mime_type(&image.data)?;
        Ok(self.recognizer.recognize(&image.data, mime_type).await?)
    }

    /// Everything already scanned in the session, in scan order.
    pub async fn session_snapshot(&self, session_id: Uuid) -> BatchScanResponse {
        let results = self
            .store
            .snapshot(session_id)
            .await
            .into_iter()
            .map(|(identity, scan)| scan.to_scan_response(&identity, true))
            .collect();
        BatchScanResponse {
            session_id,
            results,
        }
    }

    pub async fn reset_session(&self, session_id: Uuid) -> ResetResponse {
        let cleared = self.store.clear(session_id).await;
        log::info!(
            "Session {} reset, {} cached scan(s) discarded",
            session_id,
            cleared
        );
        ResetResponse {
            session_id,
            cleared,
        }
    }
}

/// Maps sniffed raster formats to the mime type sent to the service.
/// The magic bytes decide; the uploaded file name and declared content type
/// are not trusted.
fn sniff_mime_type(data: &[u8]) -> Result<&'static str, ScanError> {
    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::WebP) => Ok("image/webp"),
        Ok(ImageFormat::Gif) => Ok("image/gif"),
        _ => Err(ScanError::InvalidFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_bytes(padding: usize) -> Vec<u8> {
        let mut data = PNG_MAGIC.to_vec();
        data.extend(std::iter::repeat(0u8).take(padding));
        data
    }

    struct StubRecognizer {
        calls: AtomicUsize,
        reply: Result<String, ()>,
    }

    impl StubRecognizer {
        fn replying(raw: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Ok(raw.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Err(()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Recognizer for StubRecognizer {
        async fn recognize(&self, _data: &[u8], _mime: &str) -> Result<String, VisionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(raw) => Ok(raw.clone()),
                Err(()) => Err(VisionError::ApiError("invalid credential".into())),
            }
        }
    }

    fn service(recognizer: Arc<StubRecognizer>) -> ScanService {
        ScanService::new(SessionStore::new(), recognizer, 1024 * 1024)
    }

    fn upload(name: &str, data: Vec<u8>) -> UploadedImage {
        UploadedImage {
            file_name: name.to_string(),
            data,
        }
    }

    #[actix_web::test]
    async fn cached_identity_skips_the_recognition_call() {
        let recognizer = Arc::new(StubRecognizer::replying("AB12 CD34\nEF56"));
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        let first = service
            .scan_image(session, upload("cap.png", png_bytes(100)))
            .await;
        let second = service
            .scan_image(session, upload("cap.png", png_bytes(100)))
            .await;

        assert_eq!(recognizer.call_count(), 1);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(second.outcome.cleaned().unwrap(), "AB12CD34EF56");
        assert!(second.outcome.is_complete());
    }

    #[actix_web::test]
    async fn failures_are_cached_and_not_retried() {
        let recognizer = Arc::new(StubRecognizer::failing());
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        let first = service
            .scan_image(session, upload("cap.png", png_bytes(10)))
            .await;
        let second = service
            .scan_image(session, upload("cap.png", png_bytes(10)))
            .await;

        assert_eq!(recognizer.call_count(), 1);
        assert!(matches!(first.outcome, ScanOutcome::Failed { .. }));
        assert!(second.cached);
        assert_eq!(first.outcome, second.outcome);
    }

    #[actix_web::test]
    async fn reset_makes_an_identity_unseen_again() {
        let recognizer = Arc::new(StubRecognizer::replying("AB12CD34EF56"));
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        service
            .scan_image(session, upload("cap.png", png_bytes(10)))
            .await;
        let reset = service.reset_session(session).await;
        assert_eq!(reset.cleared, 1);

        let rescan = service
            .scan_image(session, upload("cap.png", png_bytes(10)))
            .await;
        assert_eq!(recognizer.call_count(), 2);
        assert!(!rescan.cached);
    }

    #[actix_web::test]
    async fn same_name_and_size_share_one_entry_despite_different_pixels() {
        let recognizer = Arc::new(StubRecognizer::replying("AB12CD34EF56"));
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        let mut other_pixels = png_bytes(100);
        let last = other_pixels.len() - 1;
        other_pixels[last] = 0xFF;

        service
            .scan_image(session, upload("cap.png", png_bytes(100)))
            .await;
        let collided = service
            .scan_image(session, upload("cap.png", other_pixels))
            .await;

        // Accepted identity-collision limitation: one call, shared entry.
        assert_eq!(recognizer.call_count(), 1);
        assert!(collided.cached);
    }

    #[actix_web::test]
    async fn non_image_bytes_fail_without_a_service_call() {
        let recognizer = Arc::new(StubRecognizer::replying("unused"));
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        let result = service
            .scan_image(session, upload("note.txt", b"not an image".to_vec()))
            .await;

        assert_eq!(recognizer.call_count(), 0);
        assert!(matches!(result.outcome, ScanOutcome::Failed { .. }));
    }

    #[actix_web::test]
    async fn oversize_uploads_fail_without_a_service_call() {
        let recognizer = Arc::new(StubRecognizer::replying("unused"));
        let service = ScanService::new(SessionStore::new(), recognizer.clone(), 64);
        let session = Uuid::new_v4();

        let result = service
            .scan_image(session, upload("cap.png", png_bytes(1000)))
            .await;

        assert_eq!(recognizer.call_count(), 0);
        assert!(matches!(result.outcome, ScanOutcome::Failed { .. }));
    }

    #[actix_web::test]
    async fn batch_processes_in_upload_order() {
        let recognizer = Arc::new(StubRecognizer::replying("AB12CD34EF56"));
        let service = service(recognizer.clone());
        let session = Uuid::new_v4();

        let batch = service
            .scan_batch(
                session,
                vec![
                    upload("a.png", png_bytes(1)),
                    upload("b.png", png_bytes(2)),
                    upload("a.png", png_bytes(1)),
                ],
            )
            .await;

        assert_eq!(batch.results.len(), 3);
        assert_eq!(batch.results[0].file_name, "a.png");
        assert_eq!(batch.results[1].file_name, "b.png");
        // The duplicate in the same batch is served from cache.
        assert!(batch.results[2].cached);
        assert_eq!(recognizer.call_count(), 2);
    }

    #[test]
    fn sniffing_accepts_the_supported_formats() {
        assert_eq!(sniff_mime_type(&png_bytes(4)).unwrap(), "image/png");
        assert_eq!(
            sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]).unwrap(),
            "image/jpeg"
        );
        assert_eq!(sniff_mime_type(b"GIF89a\x00\x00").unwrap(), "image/gif");
        assert!(matches!(
            sniff_mime_type(b"plain text"),
            Err(ScanError::InvalidFormat)
        ));
    }
}
