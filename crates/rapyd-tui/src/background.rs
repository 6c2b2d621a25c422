//! Background network tasks.
//!
//! Listings, preview loads and downloads run as tokio tasks and report
//! back to the main event loop through an unbounded mpsc channel. The loop
//! hands every [`BackgroundMessage`] to [`crate::app::App::apply_message`],
//! which drops whatever has been superseded in the meantime.

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use rapyd_core::fs::preview::{
    read_image_info, read_pdf_info, text_preview, ImageInfo, PdfInfo, TextPreview,
};
use rapyd_core::{
    ContentClient, CoreError, CoreResult, Event, FileEntry, ListingRequest, ListingResponse,
    ListingService, ModalityKind, Preferences,
};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::Effect;

/// Images larger than this are previewed from `/api/thumb`.
pub const FULL_IMAGE_LIMIT: u64 = 16 * 1024 * 1024;

/// Messages sent from background tasks to the main event loop.
pub enum BackgroundMessage {
    Listing(ListingResponse),
    PreviewLoaded { id: u64, content: LoadedContent },
    PreviewFailed { id: u64, error: String },
    Download(Event),
}

/// How fetched preview bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Image,
    Document,
}

impl ContentKind {
    /// `None` for modalities that render without fetching anything.
    pub fn for_modality(kind: ModalityKind) -> Option<Self> {
        match kind {
            ModalityKind::EmbeddedText => Some(Self::Text),
            ModalityKind::Image => Some(Self::Image),
            ModalityKind::EmbeddedDocument => Some(Self::Document),
            ModalityKind::Video | ModalityKind::Unsupported | ModalityKind::Error => None,
        }
    }
}

/// One preview load, tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewJob {
    pub id: u64,
    pub path: String,
    pub kind: ContentKind,
    pub use_thumbnail: bool,
}

/// Decoded preview content, ready to render.
#[derive(Debug, Clone)]
pub enum LoadedContent {
    Text(TextPreview),
    Image { info: ImageInfo, image: DynamicImage },
    Document(PdfInfo),
}

/// Decodes fetched bytes for `kind`.
///
/// # Errors
///
/// [`CoreError::UndecodableContent`] when the bytes are not what `kind`
/// expects (binary text, corrupt image, unparsable PDF).
pub fn decode_content(
    kind: ContentKind,
    bytes: &[u8],
    max_lines: usize,
) -> CoreResult<LoadedContent> {
    match kind {
        ContentKind::Text => text_preview(bytes, max_lines).map(LoadedContent::Text),
        ContentKind::Image => {
            let info = read_image_info(bytes)?;
            let image = image::load_from_memory(bytes)
                .map_err(|e| CoreError::UndecodableContent(format!("image: {e}")))?;
            Ok(LoadedContent::Image { info, image })
        }
        ContentKind::Document => read_pdf_info(bytes).map(LoadedContent::Document),
    }
}

/// Runs a listing request and reports the response.
pub fn spawn_listing(
    request: ListingRequest,
    service: Arc<dyn ListingService>,
    tx: UnboundedSender<BackgroundMessage>,
) {
    tokio::spawn(async move {
        let response = request.run(service.as_ref()).await;
        let _ = tx.send(BackgroundMessage::Listing(response));
    });
}

/// Fetches and decodes preview content off the event loop.
pub fn spawn_preview_load(
    job: PreviewJob,
    client: ContentClient,
    max_lines: usize,
    tx: UnboundedSender<BackgroundMessage>,
) {
    tokio::spawn(async move {
        let fetched = if job.use_thumbnail {
            client.thumbnail(&job.path).await
        } else {
            client.fetch(&job.path).await
        };

        let decoded = match fetched {
            Ok(bytes) => {
                let kind = job.kind;
                tokio::task::spawn_blocking(move || decode_content(kind, &bytes, max_lines))
                    .await
                    .unwrap_or_else(|e| Err(CoreError::UndecodableContent(e.to_string())))
            }
            Err(e) => Err(e),
        };

        let message = match decoded {
            Ok(content) => BackgroundMessage::PreviewLoaded { id: job.id, content },
            Err(e) => {
                tracing::warn!(path = %job.path, error = %e, "preview load failed");
                BackgroundMessage::PreviewFailed {
                    id: job.id,
                    error: e.to_string(),
                }
            }
        };
        let _ = tx.send(message);
    });
}

/// Streams `entry` into `dest_dir` and reports the outcome.
pub fn spawn_download(
    entry: FileEntry,
    dest_dir: PathBuf,
    client: ContentClient,
    tx: UnboundedSender<BackgroundMessage>,
) {
    tokio::spawn(async move {
        let name = entry.name().to_owned();
        let event = match client.download(&entry, &dest_dir).await {
            Ok(target) => Event::DownloadComplete { name, target },
            Err(e) => {
                tracing::warn!(path = %entry.path(), error = %e, "download failed");
                Event::DownloadFailed {
                    name,
                    error: e.to_string(),
                }
            }
        };
        let _ = tx.send(BackgroundMessage::Download(event));
    });
}

/// Carries out the [`Effect`]s the app asks for.
pub struct TaskRunner {
    pub listing: Arc<dyn ListingService>,
    pub content: ContentClient,
    pub download_dir: PathBuf,
    pub max_text_lines: usize,
    pub prefs_path: Option<PathBuf>,
    pub tx: UnboundedSender<BackgroundMessage>,
}

impl TaskRunner {
    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::List(request) => {
                    spawn_listing(request, Arc::clone(&self.listing), self.tx.clone());
                }
                Effect::LoadPreview(job) => spawn_preview_load(
                    job,
                    self.content.clone(),
                    self.max_text_lines,
                    self.tx.clone(),
                ),
                Effect::Download(entry) => spawn_download(
                    entry,
                    self.download_dir.clone(),
                    self.content.clone(),
                    self.tx.clone(),
                ),
                Effect::SavePrefs(prefs) => self.save_prefs(prefs),
            }
        }
    }

    fn save_prefs(&self, prefs: Preferences) {
        let Some(path) = self.prefs_path.as_deref() else {
            return;
        };
        if let Err(e) = prefs.save(path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to save preferences");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::ImageFormat;
    use std::io::Cursor;
    use tokio::sync::mpsc;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn kinds_that_fetch() {
        assert_eq!(
            ContentKind::for_modality(ModalityKind::EmbeddedText),
            Some(ContentKind::Text)
        );
        assert_eq!(
            ContentKind::for_modality(ModalityKind::Image),
            Some(ContentKind::Image)
        );
        assert_eq!(
            ContentKind::for_modality(ModalityKind::EmbeddedDocument),
            Some(ContentKind::Document)
        );
        assert_eq!(ContentKind::for_modality(ModalityKind::Video), None);
        assert_eq!(ContentKind::for_modality(ModalityKind::Unsupported), None);
        assert_eq!(ContentKind::for_modality(ModalityKind::Error), None);
    }

    #[test]
    fn decode_text() {
        match decode_content(ContentKind::Text, b"one\ntwo\nthree", 2).unwrap() {
            LoadedContent::Text(preview) => {
                assert_eq!(preview.lines, vec!["one", "two"]);
                assert!(preview.is_truncated);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn decode_binary_as_text_fails() {
        let err = decode_content(ContentKind::Text, b"\x00\x01\x02", 10).unwrap_err();
        assert!(matches!(err, CoreError::UndecodableContent(_)));
    }

    #[test]
    fn decode_image() {
        match decode_content(ContentKind::Image, &png_bytes(3, 2), 10).unwrap() {
            LoadedContent::Image { info, image } => {
                assert_eq!((info.width, info.height), (3, 2));
                assert_eq!(info.format, "PNG");
                assert_eq!((image.width(), image.height()), (3, 2));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn decode_corrupt_image_fails() {
        let mut bytes = png_bytes(4, 4);
        bytes.truncate(20);
        assert!(decode_content(ContentKind::Image, &bytes, 10).is_err());
    }

    #[test]
    fn decode_garbage_document_fails() {
        let err = decode_content(ContentKind::Document, b"not a pdf", 10).unwrap_err();
        assert!(matches!(err, CoreError::UndecodableContent(_)));
    }

    struct OneListing;

    #[async_trait]
    impl ListingService for OneListing {
        async fn list(&self, path: &str) -> CoreResult<Vec<FileEntry>> {
            Ok(vec![FileEntry::new(
                format!("{path}/x"),
                "x",
                false,
                1,
                None,
                None,
            )])
        }
    }

    #[tokio::test]
    async fn listing_reports_back_over_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut nav = rapyd_core::NavigationController::new();
        let request = nav.refresh("docs");

        spawn_listing(request, Arc::new(OneListing), tx);

        match rx.recv().await {
            Some(BackgroundMessage::Listing(response)) => {
                assert_eq!(response.path(), "docs");
                assert!(nav.settle(response).is_some());
                assert_eq!(nav.entries().len(), 1);
            }
            _ => panic!("expected a listing message"),
        }
    }
}
