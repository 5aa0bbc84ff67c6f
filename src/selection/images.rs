//! Session-scoped registry of user images behind revocable handles

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque reference to image bytes held by an [`ImageStore`]
///
/// Handles are never reused within a store, so a revoked handle can never
/// resolve to a different image later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u64);

impl ImageHandle {
    /// Numeric identity of the handle
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image:{}", self.0)
    }
}

/// A picked image: its handle plus the file name it was picked as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserImage {
    handle: ImageHandle,
    name: String,
}

impl UserImage {
    /// Handle into the owning store
    pub const fn handle(&self) -> ImageHandle {
        self.handle
    }

    /// File name shown to the user
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable encoded image payload
///
/// Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBytes {
    /// File name the bytes came from
    pub name: String,
    /// Encoded image data
    pub bytes: Arc<[u8]>,
}

/// In-memory image registry for one session
#[derive(Debug, Default)]
pub struct ImageStore {
    next_id: u64,
    entries: HashMap<ImageHandle, ImageBytes>,
}

impl ImageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes and hand out a fresh handle for them
    pub fn register(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> UserImage {
        self.next_id += 1;
        let handle = ImageHandle(self.next_id);
        let name = name.into();
        self.entries.insert(
            handle,
            ImageBytes {
                name: name.clone(),
                bytes: bytes.into(),
            },
        );
        UserImage { handle, name }
    }

    /// Bytes for a live image, `None` once revoked
    pub fn resolve(&self, image: &UserImage) -> Option<ImageBytes> {
        self.entries.get(&image.handle).cloned()
    }

    /// Check whether an image still resolves
    pub fn is_live(&self, image: &UserImage) -> bool {
        self.entries.contains_key(&image.handle)
    }

    /// Release an image; returns `false` if it was already revoked
    ///
    /// Requests that already hold the bytes keep their copy.
    pub fn revoke(&mut self, image: &UserImage) -> bool {
        self.entries.remove(&image.handle).is_some()
    }

    /// Number of images that still resolve
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Revoke every image, as at the end of a session
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
