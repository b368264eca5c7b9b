use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Node, NodeInfo, Page, TopicList};

#[async_trait]
pub trait TopicSource: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Fetch one page of topics with the favorite flag and once-token for it.
    async fn load_topics(&self, page: &Page) -> Result<TopicList>;

    /// Ask the server to set the favorite state of `node`.
    ///
    /// Expected failures are `Connection` and `Remote`; anything else is a bug.
    async fn set_favorite(&self, node: &Node, desired: bool, once_token: &str) -> Result<()>;

    // Optional
    async fn node_info(&self, _name: &str) -> Result<Option<NodeInfo>> {
        Ok(None)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::error::TopicListError;

    /// Scripted backend: every call pops the next queued answer.
    #[derive(Debug, Default)]
    pub struct ScriptedSource {
        loads: Mutex<VecDeque<Result<TopicList>>>,
        favorites: Mutex<VecDeque<Result<()>>>,
        pub favorite_calls: Mutex<Vec<(String, bool, String)>>,
        pub load_calls: Mutex<usize>,
        pub info: Option<NodeInfo>,
    }

    impl ScriptedSource {
        pub fn with_info(info: NodeInfo) -> Self {
            Self {
                info: Some(info),
                ..Default::default()
            }
        }

        pub fn push_load(&self, result: Result<TopicList>) {
            self.loads.lock().unwrap().push_back(result);
        }

        pub fn push_favorite(&self, result: Result<()>) {
            self.favorites.lock().unwrap().push_back(result);
        }

        pub fn favorite_call_count(&self) -> usize {
            self.favorite_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TopicSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn load_topics(&self, _page: &Page) -> Result<TopicList> {
            *self.load_calls.lock().unwrap() += 1;
            self.loads
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TopicListError::Connection("no scripted load".into())))
        }

        async fn set_favorite(&self, node: &Node, desired: bool, once_token: &str) -> Result<()> {
            self.favorite_calls.lock().unwrap().push((
                node.name.clone(),
                desired,
                once_token.to_string(),
            ));
            self.favorites
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn node_info(&self, _name: &str) -> Result<Option<NodeInfo>> {
            Ok(self.info.clone())
        }
    }
}
