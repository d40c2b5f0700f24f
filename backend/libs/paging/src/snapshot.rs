/// Feed snapshots published to subscribers
///
/// State transitions per load direction:
/// - Idle → Loading: a load in that direction starts
/// - Loading → Idle: the page was applied
/// - Loading → Error: the source returned an error
/// - Error → Idle: the subscriber called `retry`
use std::fmt;
use std::sync::Arc;

use crate::source::{LoadError, LoadType, Page};

#[derive(Debug, Clone)]
pub enum LoadState {
    Idle { end_of_pagination_reached: bool },
    Loading,
    Error(LoadError),
}

impl LoadState {
    pub const fn idle() -> Self {
        LoadState::Idle {
            end_of_pagination_reached: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle { .. })
    }

    pub fn error(&self) -> Option<&LoadError> {
        match self {
            LoadState::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn end_of_pagination_reached(&self) -> bool {
        matches!(
            self,
            LoadState::Idle {
                end_of_pagination_reached: true
            }
        )
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
}

impl LoadStates {
    pub fn get(&self, kind: LoadType) -> &LoadState {
        match kind {
            LoadType::Refresh => &self.refresh,
            LoadType::Prepend => &self.prepend,
            LoadType::Append => &self.append,
        }
    }

    pub fn set(&mut self, kind: LoadType, state: LoadState) {
        match kind {
            LoadType::Refresh => self.refresh = state,
            LoadType::Prepend => self.prepend = state,
            LoadType::Append => self.append = state,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.refresh.is_loading() || self.prepend.is_loading() || self.append.is_loading()
    }

    /// Refresh errors win over append and prepend errors
    pub fn first_error(&self) -> Option<&LoadError> {
        self.refresh
            .error()
            .or_else(|| self.append.error())
            .or_else(|| self.prepend.error())
    }
}

/// Every page loaded so far in key order.
///
/// Pages are shared with the loader, so cloning a snapshot never copies items.
pub struct FeedSnapshot<T> {
    generation: u64,
    pages: Vec<Arc<Page<T>>>,
    load_states: LoadStates,
}

impl<T> FeedSnapshot<T> {
    pub(crate) fn new(generation: u64, pages: Vec<Arc<Page<T>>>, load_states: LoadStates) -> Self {
        Self {
            generation,
            pages,
            load_states,
        }
    }

    pub fn empty() -> Self {
        Self::new(0, Vec::new(), LoadStates::default())
    }

    /// Bumped on every invalidation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn load_states(&self) -> &LoadStates {
        &self.load_states
    }

    pub fn pages(&self) -> &[Arc<Page<T>>] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|page| page.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.is_empty())
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        let mut offset = 0;
        for page in &self.pages {
            if position < offset + page.len() {
                return page.data.get(position - offset);
            }
            offset += page.len();
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.load_states.first_error()
    }

    /// The last loaded page reported no next key
    pub fn is_end_of_feed(&self) -> bool {
        self.load_states.append.end_of_pagination_reached()
    }
}

impl<T: Clone> FeedSnapshot<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Clone for FeedSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            pages: self.pages.clone(),
            load_states: self.load_states.clone(),
        }
    }
}

impl<T> Default for FeedSnapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for FeedSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSnapshot")
            .field("generation", &self.generation)
            .field("pages", &self.pages.len())
            .field("items", &self.len())
            .field("load_states", &self.load_states)
            .finish()
    }
}
