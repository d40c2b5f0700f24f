/// Paging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingConfig {
    /// Items requested per append/prepend load
    pub page_size: u32,
    /// Items requested by the refresh load
    pub initial_load_size: u32,
    /// How close to either edge of the loaded data an access must be to trigger a load
    pub prefetch_distance: u32,
    /// Placeholder items for unloaded pages (not supported)
    pub enable_placeholders: bool,
}

impl PagingConfig {
    /// Config with prefetch distance and initial load size equal to `page_size`
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            initial_load_size: page_size,
            prefetch_distance: page_size,
            enable_placeholders: false,
        }
    }

    pub fn with_prefetch_distance(mut self, prefetch_distance: u32) -> Self {
        self.prefetch_distance = prefetch_distance;
        self
    }

    pub fn with_initial_load_size(mut self, initial_load_size: u32) -> Self {
        self.initial_load_size = initial_load_size;
        self
    }

    pub fn with_placeholders(mut self, enable_placeholders: bool) -> Self {
        self.enable_placeholders = enable_placeholders;
        self
    }

    pub fn validate(&self) -> Result<(), PagingConfigError> {
        if self.page_size == 0 {
            return Err(PagingConfigError::ZeroPageSize);
        }
        if self.initial_load_size < self.page_size {
            return Err(PagingConfigError::InitialLoadTooSmall {
                initial_load_size: self.initial_load_size,
                page_size: self.page_size,
            });
        }
        if self.enable_placeholders {
            return Err(PagingConfigError::PlaceholdersUnsupported);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PagingConfigError {
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
    #[error("Initial load size ({initial_load_size}) must be at least the page size ({page_size})")]
    InitialLoadTooSmall { initial_load_size: u32, page_size: u32 },
    #[error("Placeholders are not supported")]
    PlaceholdersUnsupported,
}
