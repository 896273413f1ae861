//! Tool implementations for FactQuest.
//!
//! The assistant has a single capability beyond its own knowledge: looking
//! up recent news articles.

pub mod news_search;

use factquest_config::NewsConfig;
use factquest_core::error::ToolError;
use factquest_core::tool::ToolRegistry;

pub use news_search::NewsSearchTool;

/// Create the assistant's tool registry.
pub fn default_registry(news: &NewsConfig, news_api_key: &str) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(NewsSearchTool::from_config(news, news_api_key)?));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_exposes_news_search() {
        let registry = default_registry(&NewsConfig::default(), "key").unwrap();
        assert_eq!(registry.names(), vec!["news_search"]);
    }
}
