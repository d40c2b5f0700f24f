pub mod story_paging_source;
pub mod story_repository;

pub use story_paging_source::StoryPagingSource;
pub use story_repository::{StoryRepository, FEED_PAGE_SIZE};
