use std::sync::Arc;

use paging::FeedHandle;
use parking_lot::Mutex;
use story_api::{Credential, MessageResponse, NewStory, Story};
use tracing::{debug, info};

use crate::error::Result;
use crate::services::StoryRepository;
use crate::session::SessionStore;

struct CachedFeed {
    credential: Credential,
    handle: FeedHandle<Story>,
}

/// Feed, details, map stories and uploads for the current session
pub struct StoryController {
    repository: Arc<StoryRepository>,
    sessions: Arc<dyn SessionStore>,
    feed: Mutex<Option<CachedFeed>>,
}

impl StoryController {
    pub fn new(repository: Arc<StoryRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
            feed: Mutex::new(None),
        }
    }

    fn credential(&self) -> Credential {
        self.sessions.current().credential()
    }

    /// Feed for the current session.
    ///
    /// Repeated calls share one subscription while the credential is unchanged;
    /// a different credential closes the old feed and opens a new one.
    pub fn feed(&self) -> Result<FeedHandle<Story>> {
        let credential = self.credential();
        let mut cached = self.feed.lock();

        if let Some(feed) = cached.as_ref() {
            if feed.credential == credential && !feed.handle.is_closed() {
                debug!("reusing cached story feed");
                return Ok(feed.handle.clone());
            }
        }

        if let Some(previous) = cached.take() {
            info!("credential changed, closing previous story feed");
            previous.handle.close();
        }

        let handle = self.repository.open_feed(credential.clone())?;
        *cached = Some(CachedFeed {
            credential,
            handle: handle.clone(),
        });
        Ok(handle)
    }

    /// Close the cached feed, if any
    pub fn close_feed(&self) {
        if let Some(previous) = self.feed.lock().take() {
            previous.handle.close();
        }
    }

    pub async fn story_detail(&self, id: &str) -> Result<Story> {
        self.repository.story_detail(&self.credential(), id).await
    }

    pub async fn stories_with_location(&self) -> Result<Vec<Story>> {
        self.repository
            .stories_with_location(&self.credential())
            .await
    }

    /// Upload a story; sessions that are not logged in post as guest
    pub async fn add_story(&self, story: NewStory) -> Result<MessageResponse> {
        let session = self.sessions.current();
        let credential = session.credential();
        info!(guest = credential.is_guest(), "submitting story");
        self.repository.add_story(&credential, story).await
    }
}

impl Drop for StoryController {
    fn drop(&mut self) {
        self.close_feed();
    }
}
