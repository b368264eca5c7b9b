use crate::error::TopicListError;
use crate::types::{NodeInfo, TopicList};

#[derive(Debug)]
pub enum Action {
    Quit,

    // Load lifecycle
    Start,
    Refresh,
    TopicsLoaded {
        load_id: u64,
        result: Result<TopicList, TopicListError>,
    },
    PageHydrated(Option<NodeInfo>),

    // Favorite
    ToggleFavorite,
    FavoriteSettled {
        generation: u64,
        outcome: Result<(), TopicListError>,
    },
    FavoriteChanged,

    // Navigation
    ScrollUp,
    ScrollDown,
    OpenTopic(usize),
    NewTopic,

    Error(String),
    None,
}

impl From<TopicListError> for Action {
    fn from(err: TopicListError) -> Self {
        Action::Error(err.to_string())
    }
}
