//! Incremental paging runtime
//!
//! This library provides the pieces needed to load a keyed, page-at-a-time
//! feed and expose it to a UI layer:
//! - **PagingSource**: fetches one page per call and reports adjacent keys
//! - **Pager**: owns the paging configuration and builds a fresh source per subscription
//! - **FeedHandle**: cancellable subscription carrying `access`/`load_more`/`refresh`/`retry`
//! - **FeedSnapshot**: every loaded page so far, in key order, plus per-direction load state
//!
//! # Example
//!
//! ```rust,no_run
//! use paging::{LoadParams, LoadResult, Page, PageKey, Pager, PagingConfig, PagingSource, PagingState};
//!
//! struct Numbers;
//!
//! #[async_trait::async_trait]
//! impl PagingSource for Numbers {
//!     type Item = u32;
//!
//!     async fn load(&self, params: LoadParams) -> LoadResult<u32> {
//!         let key = params.key.unwrap_or(PageKey::FIRST);
//!         let start = (key.get() - 1) * params.load_size;
//!         let data: Vec<u32> = (start..start + params.load_size).collect();
//!         LoadResult::Page(Page::for_key(key, data))
//!     }
//!
//!     fn refresh_key(&self, state: &PagingState<u32>) -> Option<PageKey> {
//!         state.anchor_refresh_key()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let pager = Pager::new(PagingConfig::new(20), || Numbers).unwrap();
//!     let feed = pager.open();
//!     feed.load_more();
//! }
//! ```

pub mod config;
pub mod key;
pub mod pager;
pub mod snapshot;
pub mod source;
pub mod state;

// Re-export main types for convenience
pub use config::{PagingConfig, PagingConfigError};
pub use key::PageKey;
pub use pager::{FeedHandle, Pager};
pub use snapshot::{FeedSnapshot, LoadState, LoadStates};
pub use source::{LoadError, LoadParams, LoadResult, LoadType, Page, PagingSource};
pub use state::PagingState;
