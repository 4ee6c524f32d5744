//! Revocable references to encoded images.
//!
//! Each display surface holds at most one image. Publishing a new image to a
//! surface revokes the handle of the one it replaces, so a handle lives
//! exactly as long as the surface shows its image.

use crate::types::EncodedImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// URI scheme the Tauri plugin serves stored images under
pub const URI_SCHEME: &str = "snapcam";

/// Surfaces that can display a stored image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Bitmap canvas holding the last grabbed frame
    Canvas,
    /// Image element showing the last photo
    Photo,
    /// Download link for the canvas contents
    Download,
}

/// Reference to a stored image, valid until revoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    pub id: Uuid,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub width: u32,
    pub height: u32,
}

impl ImageHandle {
    fn new(id: Uuid, image: &EncodedImage) -> Self {
        Self {
            id,
            url: image_url(id, image.extension()),
            mime_type: image.mime_type.clone(),
            size_bytes: image.size_bytes(),
            width: image.width,
            height: image.height,
        }
    }
}

/// URL a webview can load the image from
pub fn image_url(id: Uuid, extension: &str) -> String {
    // Windows and Android webviews only route custom schemes over http
    if cfg!(any(target_os = "windows", target_os = "android")) {
        format!("http://{}.localhost/{}.{}", URI_SCHEME, id, extension)
    } else {
        format!("{}://localhost/{}.{}", URI_SCHEME, id, extension)
    }
}

/// Parse the image id out of a request path such as `/<uuid>.jpg`
pub fn parse_image_path(path: &str) -> Option<Uuid> {
    let name = path.trim_start_matches('/');
    let stem = name.split('.').next()?;
    Uuid::parse_str(stem).ok()
}

#[derive(Default)]
struct StoreInner {
    images: HashMap<Uuid, EncodedImage>,
    displayed: HashMap<Surface, Uuid>,
}

/// Thread-safe image registry
#[derive(Default)]
pub struct ImageStore {
    inner: Mutex<StoreInner>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `image` on `surface`, revoking whatever the surface showed before
    pub fn publish(&self, surface: Surface, image: EncodedImage) -> ImageHandle {
        let id = Uuid::new_v4();
        let handle = ImageHandle::new(id, &image);

        let mut inner = self.lock();
        if let Some(previous) = inner.displayed.insert(surface, id) {
            inner.images.remove(&previous);
            log::debug!("Revoked {:?} image {}", surface, previous);
        }
        inner.images.insert(id, image);
        handle
    }

    pub fn get(&self, id: Uuid) -> Option<EncodedImage> {
        self.lock().images.get(&id).cloned()
    }

    /// Image currently displayed on `surface`
    pub fn current(&self, surface: Surface) -> Option<(ImageHandle, EncodedImage)> {
        let inner = self.lock();
        let id = *inner.displayed.get(&surface)?;
        let image = inner.images.get(&id)?;
        Some((ImageHandle::new(id, image), image.clone()))
    }

    /// Drop whatever `surface` shows
    pub fn revoke(&self, surface: Surface) -> bool {
        let mut inner = self.lock();
        match inner.displayed.remove(&surface) {
            Some(id) => inner.images.remove(&id).is_some(),
            None => false,
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.images.clear();
        inner.displayed.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn blob(tag: &'static [u8]) -> EncodedImage {
        EncodedImage::jpeg(Bytes::from_static(tag), 80, 4, 3)
    }

    #[test]
    fn test_publish_replaces_and_revokes() {
        let store = ImageStore::new();
        let first = store.publish(Surface::Photo, blob(b"one"));
        let second = store.publish(Surface::Photo, blob(b"two"));

        assert!(store.get(first.id).is_none());
        assert_eq!(store.get(second.id).unwrap().data, Bytes::from_static(b"two"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_surfaces_are_independent() {
        let store = ImageStore::new();
        let photo = store.publish(Surface::Photo, blob(b"photo"));
        let canvas = store.publish(Surface::Canvas, blob(b"canvas"));

        assert!(store.get(photo.id).is_some());
        assert!(store.get(canvas.id).is_some());
        assert!(store.revoke(Surface::Canvas));
        assert!(store.get(canvas.id).is_none());
        assert!(!store.revoke(Surface::Canvas));
        assert_eq!(store.current(Surface::Photo).unwrap().0.id, photo.id);
    }

    #[test]
    fn test_handle_url_round_trips_through_path() {
        let store = ImageStore::new();
        let handle = store.publish(Surface::Download, blob(b"x"));
        assert!(handle.url.ends_with(".jpg"));

        let path = handle.url.rsplit('/').next().unwrap();
        assert_eq!(parse_image_path(&format!("/{}", path)), Some(handle.id));
        assert_eq!(parse_image_path("/not-a-uuid.png"), None);
    }
}
