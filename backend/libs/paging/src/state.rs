/// Snapshot of loaded pages handed to [`PagingSource::refresh_key`](crate::PagingSource::refresh_key)
use std::sync::Arc;

use crate::key::PageKey;
use crate::source::Page;

#[derive(Debug)]
pub struct PagingState<T> {
    /// Loaded pages in key order
    pub pages: Vec<Arc<Page<T>>>,
    /// Most recently accessed item position, if the UI reported one
    pub anchor_position: Option<usize>,
}

impl<T> PagingState<T> {
    pub fn new(pages: Vec<Arc<Page<T>>>, anchor_position: Option<usize>) -> Self {
        Self {
            pages,
            anchor_position,
        }
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.is_empty())
    }

    /// Page containing `position`; positions past the end resolve to the last page
    pub fn closest_page_to_position(&self, position: usize) -> Option<&Page<T>> {
        let mut offset = 0;
        for page in &self.pages {
            if position < offset + page.len() {
                return Some(page.as_ref());
            }
            offset += page.len();
        }
        self.pages.last().map(|page| page.as_ref())
    }

    pub fn closest_item_to_position(&self, position: usize) -> Option<&T> {
        let mut offset = 0;
        for page in &self.pages {
            if position < offset + page.len() {
                return page.data.get(position - offset);
            }
            offset += page.len();
        }
        self.pages.iter().rev().find_map(|page| page.data.last())
    }

    /// Key of the page around the anchor: `prev_key + 1`, else `next_key - 1`.
    pub fn anchor_refresh_key(&self) -> Option<PageKey> {
        let anchor = self.anchor_position?;
        let page = self.closest_page_to_position(anchor)?;
        page.prev_key
            .and_then(PageKey::next)
            .or_else(|| page.next_key.and_then(PageKey::prev))
    }
}
