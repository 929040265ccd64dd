//! Batch-revealed image grid for the selected folder.

use std::collections::HashSet;

/// Number of images revealed per sentinel trigger.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Relative scroll offset at which the sentinel counts as visible.
pub const SENTINEL_THRESHOLD: f32 = 0.95;

/// The prefix of a folder's image list that is currently rendered.
///
/// `images` never contains duplicates and always keeps the order of the
/// backing list. `next_index` is where the next batch starts in that list.
#[derive(Debug, Clone)]
pub struct VisibleWindow {
    images: Vec<String>,
    seen: HashSet<String>,
    next_index: usize,
    batch_size: usize,
}

impl Default for VisibleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl VisibleWindow {
    pub fn new(batch_size: usize) -> Self {
        Self {
            images: Vec::new(),
            seen: HashSet::new(),
            next_index: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Empty the window and rewind the cursor.
    pub fn reset(&mut self) {
        self.images.clear();
        self.seen.clear();
        self.next_index = 0;
    }

    /// Append the next batch from `all` and return the newly shown paths.
    ///
    /// Paths already in the window are skipped. Once the cursor has passed
    /// the end of `all`, this is a no-op returning an empty slice.
    pub fn reveal_next_batch(&mut self, all: &[String]) -> &[String] {
        let before = self.images.len();
        if self.next_index >= all.len() {
            return &self.images[before..];
        }
        let end = (self.next_index + self.batch_size).min(all.len());
        for path in &all[self.next_index..end] {
            if self.seen.insert(path.clone()) {
                self.images.push(path.clone());
            }
        }
        self.next_index += self.batch_size;
        &self.images[before..]
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether a folder of `total` images still has unrevealed entries.
    pub fn has_more(&self, total: usize) -> bool {
        self.next_index < total
    }
}
