// SPDX-License-Identifier: GPL-3.0-only

//! Session photo gallery
//!
//! Photos accumulate in capture order and are never mutated, removed or
//! reordered for the lifetime of a session. The gallery is the durable
//! output of the capture session; everything else is transient.

use crate::source::StillImage;
use chrono::{DateTime, Local};
use uuid::Uuid;

/// Opaque unique photo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoId(Uuid);

impl PhotoId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A captured photo
///
/// Immutable once created; `captured_at` ordering matches gallery insertion
/// order.
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: PhotoId,
    pub image: StillImage,
    pub captured_at: DateTime<Local>,
}

impl Photo {
    /// Wrap a still image as a photo captured now
    pub fn new(image: StillImage) -> Self {
        Self {
            id: PhotoId::new(),
            image,
            captured_at: Local::now(),
        }
    }
}

/// Append-only collection of session photos
#[derive(Debug, Default)]
pub struct Gallery {
    photos: Vec<Photo>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a photo, returning its id
    pub fn append(&mut self, photo: Photo) -> PhotoId {
        let id = photo.id;
        self.photos.push(photo);
        id
    }

    /// Photos in capture order
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Look up a photo by id
    pub fn get(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == id)
    }

    /// Most recently captured photo
    pub fn last(&self) -> Option<&Photo> {
        self.photos.last()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
