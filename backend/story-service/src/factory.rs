//! Typed controller construction

use std::sync::Arc;

use story_api::{ApiConfig, HttpStoryApi, StoryApi};

use crate::config::Config;
use crate::controllers::{AuthController, StoryController};
use crate::error::Result;
use crate::services::StoryRepository;
use crate::session::SessionStore;

/// Shared dependencies for every controller
#[derive(Clone)]
pub struct ControllerFactory {
    repository: Arc<StoryRepository>,
    sessions: Arc<dyn SessionStore>,
}

/// A controller the factory knows how to build
pub trait FromFactory: Sized {
    fn from_factory(factory: &ControllerFactory) -> Self;
}

impl ControllerFactory {
    pub fn new(repository: Arc<StoryRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Factory over the HTTP client described by `config`
    pub fn from_config(config: &Config, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let api: Arc<dyn StoryApi> = Arc::new(http_api(&config.api)?);
        let repository = StoryRepository::with_paging(api, config.feed.paging())?;
        Ok(Self::new(Arc::new(repository), sessions))
    }

    pub fn create<C: FromFactory>(&self) -> C {
        C::from_factory(self)
    }

    pub fn repository(&self) -> &Arc<StoryRepository> {
        &self.repository
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }
}

fn http_api(config: &ApiConfig) -> Result<HttpStoryApi> {
    config.validate()?;
    Ok(HttpStoryApi::new(config)?)
}

impl FromFactory for StoryController {
    fn from_factory(factory: &ControllerFactory) -> Self {
        StoryController::new(
            Arc::clone(&factory.repository),
            Arc::clone(&factory.sessions),
        )
    }
}

impl FromFactory for AuthController {
    fn from_factory(factory: &ControllerFactory) -> Self {
        AuthController::new(
            Arc::clone(&factory.repository),
            Arc::clone(&factory.sessions),
        )
    }
}
