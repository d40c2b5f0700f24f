//! Paging source contract
//!
//! A [`PagingSource`] loads exactly one page per call and never retries; the
//! [`Pager`](crate::Pager) decides when and in which direction to load.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::key::PageKey;
use crate::state::PagingState;

/// Direction of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    /// Initial load, or reload after invalidation
    Refresh,
    /// Load the page after the last loaded page
    Append,
    /// Load the page before the first loaded page
    Prepend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadParams {
    pub kind: LoadType,
    /// Requested page; `None` means the initial page
    pub key: Option<PageKey>,
    pub load_size: u32,
}

impl LoadParams {
    pub fn refresh(key: Option<PageKey>, load_size: u32) -> Self {
        Self {
            kind: LoadType::Refresh,
            key,
            load_size,
        }
    }

    pub fn append(key: PageKey, load_size: u32) -> Self {
        Self {
            kind: LoadType::Append,
            key: Some(key),
            load_size,
        }
    }

    pub fn prepend(key: PageKey, load_size: u32) -> Self {
        Self {
            kind: LoadType::Prepend,
            key: Some(key),
            load_size,
        }
    }
}

/// One loaded page together with the keys of its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub prev_key: Option<PageKey>,
    pub next_key: Option<PageKey>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, prev_key: Option<PageKey>, next_key: Option<PageKey>) -> Self {
        Self {
            data,
            prev_key,
            next_key,
        }
    }

    /// Page loaded from `key` in a 1-indexed feed: no previous key on page 1,
    /// no next key once the feed returns nothing or the key space is exhausted.
    pub fn for_key(key: PageKey, data: Vec<T>) -> Self {
        let prev_key = key.prev();
        let next_key = if data.is_empty() { None } else { key.next() };
        Self::new(data, prev_key, next_key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Cloneable wrapper around the cause of a failed load
#[derive(Clone)]
pub struct LoadError {
    cause: Arc<dyn Error + Send + Sync + 'static>,
}

impl LoadError {
    pub fn new<E>(cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            cause: Arc::new(cause),
        }
    }

    pub fn message(&self) -> String {
        self.cause.to_string()
    }

    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.cause.downcast_ref::<E>()
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LoadError").field(&self.cause).finish()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

/// Outcome of a single [`PagingSource::load`] call
#[derive(Debug, Clone)]
pub enum LoadResult<T> {
    Page(Page<T>),
    Error(LoadError),
}

impl<T> LoadResult<T> {
    pub fn error<E>(cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        LoadResult::Error(LoadError::new(cause))
    }

    pub fn as_page(&self) -> Option<&Page<T>> {
        match self {
            LoadResult::Page(page) => Some(page),
            LoadResult::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&LoadError> {
        match self {
            LoadResult::Page(_) => None,
            LoadResult::Error(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Page<T>, LoadError> {
        match self {
            LoadResult::Page(page) => Ok(page),
            LoadResult::Error(error) => Err(error),
        }
    }
}

#[async_trait]
pub trait PagingSource: Send + Sync + 'static {
    type Item: Send + Sync + 'static;

    /// Load one page. Must not retry internally.
    async fn load(&self, params: LoadParams) -> LoadResult<Self::Item>;

    /// Key to reload from after invalidation; `None` restarts from the initial page
    fn refresh_key(&self, state: &PagingState<Self::Item>) -> Option<PageKey>;
}
