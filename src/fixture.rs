use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::backend::TopicSource;
use crate::error::{Result, TopicListError};
use crate::types::{Node, NodeInfo, Page, Topic, TopicList, VirtualPage};

/// Injected failure for a fixture page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Connection,
    Rejected,
    Fatal,
}

impl FailureKind {
    fn into_error(self, what: &str) -> TopicListError {
        match self {
            FailureKind::Connection => {
                TopicListError::Connection(format!("{}: network unreachable", what))
            }
            FailureKind::Rejected => {
                TopicListError::Remote(format!("{}: rejected by server", what))
            }
            FailureKind::Fatal => {
                TopicListError::Fatal(format!("{}: unexpected response", what))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixturePage {
    #[serde(default)]
    pub info: Option<NodeInfo>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub once_token: Option<String>,
    #[serde(default)]
    pub load_failure: Option<FailureKind>,
    #[serde(default)]
    pub favorite_failure: Option<FailureKind>,
}

/// Fixture file layout: pages keyed by page key (`node:python`, `tab:all`, `favorites`)
#[derive(Debug, Default, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub pages: HashMap<String, FixturePage>,
}

/// Offline `TopicSource` serving pages from a JSON fixture
pub struct FixtureSource {
    pages: Mutex<HashMap<String, FixturePage>>,
    latency: Duration,
}

impl std::fmt::Debug for FixtureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureSource")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl FixtureSource {
    pub fn new(file: FixtureFile, latency: Duration) -> Self {
        Self {
            pages: Mutex::new(file.pages),
            latency,
        }
    }

    pub fn from_path(path: &Path, latency: Duration) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let file: FixtureFile = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.display(), pages = file.pages.len(), "fixture loaded");
        Ok(Self::new(file, latency))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, FixturePage>>> {
        self.pages
            .lock()
            .map_err(|_| TopicListError::Fatal("fixture state poisoned".into()))
    }
}

#[async_trait]
impl TopicSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn load_topics(&self, page: &Page) -> Result<TopicList> {
        self.simulate_latency().await;

        let key = page.key();
        let pages = self.lock()?;
        let fixture = pages
            .get(&key)
            .ok_or_else(|| TopicListError::Remote(format!("page not found: {}", key)))?;

        if let Some(kind) = fixture.load_failure {
            return Err(kind.into_error(&key));
        }

        // The favorites listing is never itself favoritable.
        let once_token = match page {
            Page::Virtual(VirtualPage::FavoriteTopics) => None,
            _ => fixture.once_token.clone(),
        };

        Ok(TopicList {
            topics: fixture.topics.clone(),
            is_favorited: fixture.favorited,
            once_token,
        })
    }

    async fn set_favorite(&self, node: &Node, desired: bool, once_token: &str) -> Result<()> {
        self.simulate_latency().await;

        let key = format!("node:{}", node.name);
        let mut pages = self.lock()?;
        let fixture = pages
            .get_mut(&key)
            .ok_or_else(|| TopicListError::Remote(format!("node not found: {}", node.name)))?;

        if let Some(kind) = fixture.favorite_failure {
            return Err(kind.into_error(&key));
        }
        if fixture.once_token.as_deref() != Some(once_token) {
            return Err(TopicListError::Remote("invalid once token".into()));
        }

        fixture.favorited = desired;
        Ok(())
    }

    async fn node_info(&self, name: &str) -> Result<Option<NodeInfo>> {
        self.simulate_latency().await;

        let pages = self.lock()?;
        Ok(pages
            .get(&format!("node:{}", name))
            .and_then(|page| page.info.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "pages": {
            "node:python": {
                "info": { "title": "Python", "topic_count": 2 },
                "favorited": false,
                "once_token": "abc",
                "topics": [
                    { "id": 1, "title": "GIL removal", "author": "guido", "replies": 4,
                      "updated_at": "2024-05-01T10:00:00Z" },
                    { "id": 2, "title": "uv vs pip", "author": "astral", "replies": 0,
                      "updated_at": "2024-05-02T10:00:00Z" }
                ]
            },
            "node:offline": { "once_token": "x", "favorite_failure": "connection" },
            "favorites": { "once_token": "leaked", "topics": [] },
            "tab:all": { "load_failure": "connection" }
        }
    }"#;

    fn source() -> FixtureSource {
        let file: FixtureFile = serde_json::from_str(FIXTURE).unwrap();
        FixtureSource::new(file, Duration::ZERO)
    }

    #[tokio::test]
    async fn loads_node_page() {
        let list = source().load_topics(&Page::node("python")).await.unwrap();
        assert_eq!(list.topics.len(), 2);
        assert_eq!(list.topics[0].title, "GIL removal");
        assert!(!list.is_favorited);
        assert_eq!(list.once_token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn favorites_page_never_carries_token() {
        let page = Page::Virtual(VirtualPage::FavoriteTopics);
        let list = source().load_topics(&page).await.unwrap();
        assert!(list.once_token.is_none());
    }

    #[tokio::test]
    async fn load_failure_is_injected() {
        let page = Page::Virtual(VirtualPage::AllTopics);
        let err = source().load_topics(&page).await.unwrap_err();
        assert!(matches!(err, TopicListError::Connection(_)));
    }

    #[tokio::test]
    async fn unknown_page_is_remote_error() {
        let err = source().load_topics(&Page::node("go")).await.unwrap_err();
        assert!(matches!(err, TopicListError::Remote(_)));
    }

    #[tokio::test]
    async fn set_favorite_persists_for_next_load() {
        let source = source();
        let node = Node::new("python");
        source.set_favorite(&node, true, "abc").await.unwrap();
        let list = source.load_topics(&Page::Node(node)).await.unwrap();
        assert!(list.is_favorited);
    }

    #[tokio::test]
    async fn set_favorite_checks_once_token() {
        let err = source()
            .set_favorite(&Node::new("python"), true, "forged")
            .await
            .unwrap_err();
        assert!(matches!(err, TopicListError::Remote(_)));
    }

    #[tokio::test]
    async fn set_favorite_failure_is_injected() {
        let err = source()
            .set_favorite(&Node::new("offline"), true, "x")
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn node_info_comes_from_fixture() {
        let source = source();
        let info = source.node_info("python").await.unwrap().unwrap();
        assert_eq!(info.title, "Python");
        assert!(source.node_info("offline").await.unwrap().is_none());
    }

    #[test]
    fn demo_fixture_parses() {
        let file: FixtureFile =
            serde_json::from_str(include_str!("../demos/pages.json")).unwrap();
        assert!(file.pages.contains_key("node:python"));
        assert!(file.pages.contains_key("favorites"));
        assert_eq!(
            file.pages["node:flaky"].favorite_failure,
            Some(FailureKind::Connection)
        );
    }
}
