use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_service::{
    Config, ControllerFactory, InMemorySessionStore, SessionStore, StoryController, UserSession,
};

/// Options for a manual feed check
#[derive(Debug, Deserialize)]
struct CliOptions {
    /// Bearer token; the feed is opened as guest when unset
    #[serde(default)]
    story_token: Option<String>,
    /// Stop after this many pages
    #[serde(default = "default_max_pages")]
    story_feed_max_pages: usize,
}

fn default_max_pages() -> usize {
    3
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},story_service=debug", config.log.level).into());

    if config.log.json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config);

    let options: CliOptions = envy::from_env().context("Failed to read CLI options")?;

    let sessions = Arc::new(InMemorySessionStore::new());
    if let Some(token) = options.story_token.filter(|token| !token.trim().is_empty()) {
        sessions
            .save(UserSession::logged_in("", token, ""))
            .await
            .context("Failed to store session")?;
    }

    info!(
        base_url = %config.api.base(),
        page_size = config.feed.page_size,
        "starting story feed"
    );

    let factory = ControllerFactory::from_config(&config, sessions)?;
    let controller: StoryController = factory.create();
    let feed = controller.feed()?;

    let mut snapshots = feed.snapshots();
    let mut printed_pages = 0;
    while let Some(snapshot) = snapshots.next().await {
        if let Some(error) = snapshot.last_error() {
            warn!(error = %error, "feed load failed");
            break;
        }

        for page in snapshot.pages().iter().skip(printed_pages) {
            for story in &page.data {
                println!("{}\t{}\t{}", story.id, story.name, story.description);
            }
            printed_pages += 1;
        }

        if snapshot.is_end_of_feed() || printed_pages >= options.story_feed_max_pages {
            break;
        }
        if !snapshot.load_states().is_loading() {
            feed.load_more();
        }
    }

    info!(pages = printed_pages, "story feed check finished");
    feed.close();
    Ok(())
}
