//! Generated images in creation order, with a browsing cursor.

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use uuid::Uuid;

use crate::error::{PersistenceError, PersistenceResult};
use crate::generation::GenerationConfig;

/// One generated image and the settings that produced it
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub id: Uuid,
    /// Creation sequence number, stable across deletions
    pub index: usize,
    pub image: Arc<RgbaImage>,
    /// Config with the seed that was actually used
    pub config: GenerationConfig,
    /// Seconds since the Unix epoch
    pub created_at: u64,
}

#[derive(Debug, Default)]
pub struct ImageHistory {
    images: Vec<GeneratedImage>,
    cursor: usize,
    next_index: usize,
}

impl ImageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and move the cursor to it. Returns its position.
    pub fn push(&mut self, id: Uuid, image: RgbaImage, config: GenerationConfig) -> usize {
        let record = GeneratedImage {
            id,
            index: self.next_index,
            image: Arc::new(image),
            config,
            created_at: crate::util::time::timestamp_secs(),
        };
        self.next_index += 1;
        self.images.push(record);
        self.cursor = self.images.len() - 1;
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Cursor position, `None` when empty
    pub fn position(&self) -> Option<usize> {
        (!self.images.is_empty()).then_some(self.cursor)
    }

    pub fn current(&self) -> Option<&GeneratedImage> {
        self.images.get(self.cursor)
    }

    /// Step back one image. No-op at the first image.
    pub fn previous(&mut self) -> Option<&GeneratedImage> {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Step forward one image. No-op at the last image.
    pub fn next(&mut self) -> Option<&GeneratedImage> {
        if self.cursor + 1 < self.images.len() {
            self.cursor += 1;
        }
        self.current()
    }

    pub fn can_go_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.cursor + 1 < self.images.len()
    }

    /// Remove the image under the cursor. The cursor stays in bounds.
    pub fn delete_current(&mut self) -> Option<GeneratedImage> {
        if self.images.is_empty() {
            return None;
        }
        let removed = self.images.remove(self.cursor);
        if self.cursor >= self.images.len() {
            self.cursor = self.images.len().saturating_sub(1);
        }
        Some(removed)
    }

    /// Write the current image as PNG
    pub fn save_current(&self, path: &Path) -> PersistenceResult<()> {
        let record = self.current().ok_or(PersistenceError::NothingToSave)?;
        record
            .image
            .save_with_format(path, image::ImageFormat::Png)?;
        log::info!("saved generated image {} to {}", record.id, path.display());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.images.iter()
    }
}
