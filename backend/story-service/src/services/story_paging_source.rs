//! Page loader for the story feed
//!
//! One instance serves one feed generation; the pager builds a new one on
//! every refresh.

use std::sync::Arc;

use async_trait::async_trait;
use paging::{LoadParams, LoadResult, Page, PageKey, PagingSource, PagingState};
use story_api::{ApiEnvelope, Credential, Story, StoryApi, StoryQuery};
use tracing::{debug, warn};

pub struct StoryPagingSource {
    api: Arc<dyn StoryApi>,
    credential: Credential,
}

impl StoryPagingSource {
    pub fn new(api: Arc<dyn StoryApi>, credential: Credential) -> Self {
        Self { api, credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

#[async_trait]
impl PagingSource for StoryPagingSource {
    type Item = Story;

    async fn load(&self, params: LoadParams) -> LoadResult<Story> {
        let key = params.key.unwrap_or(PageKey::FIRST);
        let query = StoryQuery::page(key.get(), params.load_size);

        let response = match self.api.list_stories(&self.credential, query).await {
            Ok(response) => response,
            Err(err) => {
                warn!(page = key.get(), error = %err, "story page request failed");
                return LoadResult::error(err);
            }
        };

        match response.into_checked() {
            Ok(response) => {
                debug!(
                    page = key.get(),
                    count = response.list_story.len(),
                    "story page loaded"
                );
                LoadResult::Page(Page::for_key(key, response.list_story))
            }
            Err(err) => {
                warn!(page = key.get(), error = %err, "story page rejected by server");
                LoadResult::error(err)
            }
        }
    }

    fn refresh_key(&self, state: &PagingState<Story>) -> Option<PageKey> {
        state.anchor_refresh_key()
    }
}
