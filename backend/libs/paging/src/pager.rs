//! Pager and feed subscriptions
//!
//! Each [`FeedHandle`] is backed by one driver task that owns the loaded pages.
//! The driver runs at most one [`PagingSource::load`] at a time; append and
//! prepend triggers that arrive mid-load are remembered and evaluated once the
//! load finishes. A refresh drops the in-flight load, so its result is never
//! applied to the new generation.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{PagingConfig, PagingConfigError};
use crate::key::PageKey;
use crate::snapshot::{FeedSnapshot, LoadState, LoadStates};
use crate::source::{LoadParams, LoadResult, LoadType, Page, PagingSource};
use crate::state::PagingState;

type SourceFactory<S> = Arc<dyn Fn() -> S + Send + Sync>;

/// Builds a fresh [`PagingSource`] per subscription and per invalidation
pub struct Pager<S: PagingSource> {
    config: PagingConfig,
    factory: SourceFactory<S>,
}

impl<S: PagingSource> Pager<S> {
    pub fn new<F>(config: PagingConfig, factory: F) -> Result<Self, PagingConfigError>
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            factory: Arc::new(factory),
        })
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    /// Open a subscription and start the initial load.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(&self) -> FeedHandle<S::Item> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::empty());
        let cancel = CancellationToken::new();

        let driver = Driver {
            config: self.config.clone(),
            factory: Arc::clone(&self.factory),
            source: Arc::new((self.factory)()),
            generation: 0,
            pages: Vec::new(),
            anchor_position: None,
            load_states: LoadStates::default(),
            refresh_key: None,
            pending: Pending {
                refresh: true,
                ..Pending::default()
            },
            snapshots: snapshot_tx,
        };
        tokio::spawn(driver.run(command_rx, cancel.clone()));

        FeedHandle {
            inner: Arc::new(HandleInner {
                commands: command_tx,
                snapshots: snapshot_rx,
                cancel,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Access(usize),
    LoadMore,
    Refresh,
    Retry,
}

/// Cancellable feed subscription.
///
/// Clones share the same subscription. The driver stops when `close` is
/// called or the last clone is dropped.
pub struct FeedHandle<T> {
    inner: Arc<HandleInner<T>>,
}

struct HandleInner<T> {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<FeedSnapshot<T>>,
    cancel: CancellationToken,
}

impl<T> Drop for HandleInner<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<T> Clone for FeedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FeedHandle<T> {
    /// Latest published snapshot
    pub fn current(&self) -> FeedSnapshot<T> {
        self.inner.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<T>> {
        self.inner.snapshots.clone()
    }

    /// The UI rendered item `position`; loads more when near either edge
    pub fn access(&self, position: usize) {
        self.send(Command::Access(position));
    }

    pub fn load_more(&self) {
        self.send(Command::LoadMore);
    }

    /// Invalidate the current source and reload around the last accessed position
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Re-issue every load currently in the error state
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    pub fn last_error(&self) -> Option<crate::LoadError> {
        self.inner.snapshots.borrow().last_error().cloned()
    }

    pub fn close(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled() || self.inner.commands.is_closed()
    }

    /// Wait until a snapshot satisfies `predicate`; `None` once the driver has stopped
    pub async fn wait_for<F>(&self, predicate: F) -> Option<FeedSnapshot<T>>
    where
        F: FnMut(&FeedSnapshot<T>) -> bool,
    {
        let mut receiver = self.inner.snapshots.clone();
        let snapshot = receiver.wait_for(predicate).await.ok()?;
        Some(snapshot.clone())
    }

    fn send(&self, command: Command) {
        if self.inner.commands.send(command).is_err() {
            debug!(?command, "feed driver stopped, dropping command");
        }
    }
}

impl<T: Send + Sync + 'static> FeedHandle<T> {
    /// Stream of snapshots starting with the current one
    pub fn snapshots(&self) -> WatchStream<FeedSnapshot<T>> {
        WatchStream::new(self.inner.snapshots.clone())
    }
}

/// Why an append or prepend was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Trigger {
    /// An access came near the edge; re-checked against the anchor before loading
    Prefetch,
    /// `load_more` or `retry`; always honoured
    Explicit,
}

#[derive(Debug, Default)]
struct Pending {
    refresh: bool,
    prepend: Option<Trigger>,
    append: Option<Trigger>,
}

fn request(slot: &mut Option<Trigger>, trigger: Trigger) {
    *slot = Some(slot.map_or(trigger, |current| current.max(trigger)));
}

enum Outcome<T> {
    Loaded(LoadResult<T>),
    Abandoned,
    Stopped,
}

struct Driver<S: PagingSource> {
    config: PagingConfig,
    factory: SourceFactory<S>,
    source: Arc<S>,
    generation: u64,
    pages: Vec<Arc<Page<S::Item>>>,
    anchor_position: Option<usize>,
    load_states: LoadStates,
    refresh_key: Option<PageKey>,
    pending: Pending,
    snapshots: watch::Sender<FeedSnapshot<S::Item>>,
}

impl<S: PagingSource> Driver<S> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) {
        debug!("feed driver started");

        loop {
            let Some(params) = self.next_load() else {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    command = commands.recv() => match command {
                        Some(command) => self.handle(command),
                        None => break,
                    },
                }
                continue;
            };

            let generation = self.generation;
            let source = Arc::clone(&self.source);
            self.load_states.set(params.kind, LoadState::Loading);
            self.publish();
            debug!(
                kind = ?params.kind,
                key = ?params.key.map(PageKey::get),
                load_size = params.load_size,
                generation,
                "loading page"
            );

            let mut load = source.load(params.clone());
            let outcome = loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break Outcome::Stopped,
                    command = commands.recv() => match command {
                        Some(Command::Refresh) => {
                            self.invalidate();
                            break Outcome::Abandoned;
                        }
                        Some(command) => self.handle(command),
                        None => break Outcome::Stopped,
                    },
                    result = &mut load => break Outcome::Loaded(result),
                }
            };

            match outcome {
                Outcome::Stopped => break,
                Outcome::Abandoned => {
                    debug!(generation, "in-flight load abandoned by refresh");
                }
                Outcome::Loaded(result) if generation == self.generation => {
                    self.apply(params, result);
                    self.publish();
                }
                Outcome::Loaded(_) => {
                    debug!(generation, current = self.generation, "discarding stale load result");
                }
            }
        }

        debug!(generation = self.generation, "feed driver stopped");
    }

    fn next_load(&mut self) -> Option<LoadParams> {
        if std::mem::take(&mut self.pending.refresh) {
            return Some(LoadParams::refresh(
                self.refresh_key,
                self.config.initial_load_size,
            ));
        }
        if !self.load_states.refresh.is_idle() {
            return None;
        }

        if let Some(trigger) = self.pending.prepend.take() {
            let wanted = trigger == Trigger::Explicit || self.near_start();
            if wanted && self.load_states.prepend.is_idle() {
                if let Some(key) = self.pages.first().and_then(|page| page.prev_key) {
                    return Some(LoadParams::prepend(key, self.config.page_size));
                }
            }
        }
        if let Some(trigger) = self.pending.append.take() {
            let wanted = trigger == Trigger::Explicit || self.near_end();
            if wanted && self.load_states.append.is_idle() {
                if let Some(key) = self.pages.last().and_then(|page| page.next_key) {
                    return Some(LoadParams::append(key, self.config.page_size));
                }
            }
        }
        None
    }

    fn near_start(&self) -> bool {
        self.anchor_position
            .is_some_and(|anchor| anchor < self.config.prefetch_distance as usize)
    }

    fn near_end(&self) -> bool {
        let prefetch = self.config.prefetch_distance as usize;
        self.anchor_position
            .is_some_and(|anchor| anchor.saturating_add(prefetch) >= self.item_count())
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Access(position) => {
                self.anchor_position = Some(position);
                if self.near_end() {
                    request(&mut self.pending.append, Trigger::Prefetch);
                }
                if self.near_start() {
                    request(&mut self.pending.prepend, Trigger::Prefetch);
                }
            }
            Command::LoadMore => request(&mut self.pending.append, Trigger::Explicit),
            Command::Refresh => self.invalidate(),
            Command::Retry => self.retry(),
        }
    }

    fn invalidate(&mut self) {
        // Without a new anchor the previous refresh key still describes what is on screen
        if self.anchor_position.is_some() && !self.pages.is_empty() {
            let state = PagingState::new(self.pages.clone(), self.anchor_position);
            self.refresh_key = self.source.refresh_key(&state);
        }

        self.source = Arc::new((self.factory)());
        self.generation += 1;
        self.pages.clear();
        self.anchor_position = None;
        self.load_states = LoadStates::default();
        self.pending = Pending {
            refresh: true,
            ..Pending::default()
        };

        info!(
            generation = self.generation,
            refresh_key = ?self.refresh_key.map(PageKey::get),
            "feed invalidated"
        );
    }

    fn retry(&mut self) {
        let mut retried = false;
        if self.load_states.refresh.error().is_some() {
            self.load_states.refresh = LoadState::idle();
            self.pending.refresh = true;
            retried = true;
        }
        if self.load_states.prepend.error().is_some() {
            self.load_states.prepend = LoadState::idle();
            request(&mut self.pending.prepend, Trigger::Explicit);
            retried = true;
        }
        if self.load_states.append.error().is_some() {
            self.load_states.append = LoadState::idle();
            request(&mut self.pending.append, Trigger::Explicit);
            retried = true;
        }
        if retried {
            debug!(generation = self.generation, "retrying failed loads");
            self.publish();
        }
    }

    fn apply(&mut self, params: LoadParams, result: LoadResult<S::Item>) {
        let page = match result {
            LoadResult::Page(page) => Arc::new(page),
            LoadResult::Error(error) => {
                warn!(
                    kind = ?params.kind,
                    key = ?params.key.map(PageKey::get),
                    error = %error,
                    "page load failed"
                );
                self.load_states.set(params.kind, LoadState::Error(error));
                return;
            }
        };

        debug!(
            kind = ?params.kind,
            key = ?params.key.map(PageKey::get),
            items = page.len(),
            prev_key = ?page.prev_key.map(PageKey::get),
            next_key = ?page.next_key.map(PageKey::get),
            "page loaded"
        );

        let end_before = page.prev_key.is_none();
        let end_after = page.next_key.is_none();
        match params.kind {
            LoadType::Refresh => {
                self.pages = vec![page];
                self.load_states = LoadStates {
                    refresh: LoadState::idle(),
                    prepend: LoadState::Idle {
                        end_of_pagination_reached: end_before,
                    },
                    append: LoadState::Idle {
                        end_of_pagination_reached: end_after,
                    },
                };
            }
            LoadType::Prepend => {
                let added = page.len();
                self.pages.insert(0, page);
                self.anchor_position = self.anchor_position.map(|anchor| anchor + added);
                self.load_states.prepend = LoadState::Idle {
                    end_of_pagination_reached: end_before,
                };
            }
            LoadType::Append => {
                self.pages.push(page);
                self.load_states.append = LoadState::Idle {
                    end_of_pagination_reached: end_after,
                };
            }
        }
    }

    fn item_count(&self) -> usize {
        self.pages.iter().map(|page| page.len()).sum()
    }

    fn publish(&self) {
        self.snapshots.send_replace(FeedSnapshot::new(
            self.generation,
            self.pages.clone(),
            self.load_states.clone(),
        ));
    }
}
