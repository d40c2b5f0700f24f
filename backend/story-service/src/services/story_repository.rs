//! Story data access: paged feed, details, map stories, accounts and uploads

use std::sync::Arc;

use paging::{FeedHandle, Pager, PagingConfig};
use story_api::{
    ApiEnvelope, Credential, LoginRequest, LoginResult, MessageResponse, NewStory,
    RegisterRequest, Story, StoryApi, StoryQuery,
};
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::services::story_paging_source::StoryPagingSource;

/// Page size of the story feed
pub const FEED_PAGE_SIZE: u32 = 20;

pub struct StoryRepository {
    api: Arc<dyn StoryApi>,
    paging: PagingConfig,
}

impl StoryRepository {
    pub fn new(api: Arc<dyn StoryApi>) -> Self {
        Self {
            api,
            paging: PagingConfig::new(FEED_PAGE_SIZE),
        }
    }

    pub fn with_paging(api: Arc<dyn StoryApi>, paging: PagingConfig) -> Result<Self> {
        paging.validate()?;
        Ok(Self { api, paging })
    }

    pub fn paging_config(&self) -> &PagingConfig {
        &self.paging
    }

    /// Open a feed subscription bound to `credential`.
    ///
    /// Every refresh of the returned feed builds a new loader for the same credential.
    pub fn open_feed(&self, credential: Credential) -> Result<FeedHandle<Story>> {
        info!(
            guest = credential.is_guest(),
            page_size = self.paging.page_size,
            "opening story feed"
        );

        let api = Arc::clone(&self.api);
        let pager = Pager::new(self.paging.clone(), move || {
            StoryPagingSource::new(Arc::clone(&api), credential.clone())
        })?;
        Ok(pager.open())
    }

    pub async fn story_detail(&self, credential: &Credential, id: &str) -> Result<Story> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ServiceError::Validation("Story id must not be empty".into()));
        }

        let response = self.api.story_detail(credential, id).await?.into_checked()?;
        response
            .story
            .ok_or_else(|| ServiceError::NotFound(format!("story {}", id)))
    }

    /// First page of stories that carry coordinates
    pub async fn stories_with_location(&self, credential: &Credential) -> Result<Vec<Story>> {
        let response = self
            .api
            .list_stories(credential, StoryQuery::default().with_location())
            .await?
            .into_checked()?;

        let stories: Vec<Story> = response
            .list_story
            .into_iter()
            .filter(Story::has_location)
            .collect();
        debug!(count = stories.len(), "stories with location loaded");
        Ok(stories)
    }

    /// Upload a story; guest credentials use the unauthenticated endpoint
    pub async fn add_story(&self, credential: &Credential, story: NewStory) -> Result<MessageResponse> {
        validate_new_story(&story)?;

        let response = if credential.is_guest() {
            self.api.add_story_as_guest(story).await?
        } else {
            self.api.add_story(credential, story).await?
        };
        Ok(response.into_checked()?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult> {
        let response = self
            .api
            .login(LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?
            .into_checked()?;

        response
            .login_result
            .ok_or_else(|| ServiceError::Session("Login response carried no result".into()))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<MessageResponse> {
        if password.chars().count() < 8 {
            return Err(ServiceError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }

        let response = self
            .api
            .register(RegisterRequest {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(response.into_checked()?)
    }
}

fn validate_new_story(story: &NewStory) -> Result<()> {
    if story.description.trim().is_empty() {
        return Err(ServiceError::Validation("Description must not be empty".into()));
    }
    if story.photo.is_empty() {
        return Err(ServiceError::Validation("Photo must not be empty".into()));
    }
    Ok(())
}
