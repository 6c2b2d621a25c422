//! Terminal graphics protocol state for image previews.
//!
//! Encoding an image for the terminal is expensive, so the encoded protocol
//! is kept until the preview session or the render area changes.

use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

/// Cache key: preview session + render area dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageCacheKey {
    session: u64,
    width: u16,
    height: u16,
}

/// Holds the picker and the cached encoded image protocol.
pub struct ImagePreviewState {
    picker: Picker,
    cached_protocol: Option<StatefulProtocol>,
    cache_key: Option<ImageCacheKey>,
}

impl ImagePreviewState {
    pub fn new(picker: Picker) -> Self {
        Self {
            picker,
            cached_protocol: None,
            cache_key: None,
        }
    }

    /// Returns the protocol for `image`, encoding it only when the session
    /// or the area size differs from the cached one.
    pub fn get_or_encode(
        &mut self,
        session: u64,
        image: &DynamicImage,
        width: u16,
        height: u16,
    ) -> &mut StatefulProtocol {
        let key = ImageCacheKey {
            session,
            width,
            height,
        };

        match self.cached_protocol.take() {
            Some(protocol) if self.cache_key == Some(key) => {
                self.cached_protocol.insert(protocol)
            }
            _ => {
                tracing::debug!(session, width, height, "encoding preview image");
                self.cache_key = Some(key);
                self.cached_protocol
                    .insert(self.picker.new_resize_protocol(image.clone()))
            }
        }
    }

    /// Drops the cached protocol, e.g. once the preview is closed.
    pub fn invalidate(&mut self) {
        self.cached_protocol = None;
        self.cache_key = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached_protocol.is_some()
    }
}
