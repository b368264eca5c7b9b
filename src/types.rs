use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TopicListError;

/// Virtual listings that are not backed by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualPage {
    AllTopics,
    FavoriteTopics,
}

impl VirtualPage {
    pub fn title(&self) -> &'static str {
        match self {
            VirtualPage::AllTopics => "All",
            VirtualPage::FavoriteTopics => "Favorite topics",
        }
    }
}

/// Extra node metadata that may have to be fetched after the page is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub title: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub topic_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub title: String,
    pub info: Option<NodeInfo>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            info: None,
        }
    }

    pub fn has_info(&self) -> bool {
        self.info.is_some()
    }

    pub fn hydrate(&mut self, info: NodeInfo) {
        self.title = info.title.clone();
        self.info = Some(info);
    }
}

/// A navigable unit of content shown by the topic list screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Node(Node),
    Virtual(VirtualPage),
}

impl Page {
    pub fn node(name: impl Into<String>) -> Self {
        Page::Node(Node::new(name))
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Node(node) => &node.title,
            Page::Virtual(page) => page.title(),
        }
    }

    /// Only nodes can be favorited; virtual pages never carry a once-token for it.
    pub fn supports_favorite(&self) -> bool {
        matches!(self, Page::Node(_))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Page::Node(node) => Some(node),
            Page::Virtual(_) => None,
        }
    }

    /// Stable key used by the CLI and the fixture file
    pub fn key(&self) -> String {
        match self {
            Page::Node(node) => format!("node:{}", node.name),
            Page::Virtual(VirtualPage::AllTopics) => "tab:all".to_string(),
            Page::Virtual(VirtualPage::FavoriteTopics) => "favorites".to_string(),
        }
    }
}

impl FromStr for Page {
    type Err = TopicListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(name) = s.strip_prefix("node:") {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(TopicListError::Config(format!("invalid node name: {:?}", name)));
            }
            return Ok(Page::node(name));
        }
        match s {
            "tab:all" | "all" => Ok(Page::Virtual(VirtualPage::AllTopics)),
            "favorites" => Ok(Page::Virtual(VirtualPage::FavoriteTopics)),
            _ => Err(TopicListError::Config(format!("unknown page: {:?}", s))),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub replies: u32,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub has_read: bool,
}

/// One page of topics plus the session state that came with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub once_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IconState {
    pub visible: bool,
    pub favored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    pub favorite: IconState,
    pub new_topic: bool,
    pub refresh: bool,
}

/// Where the host should go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    TopicDetail { id: u64 },
    NewTopic { node: Option<String> },
}
