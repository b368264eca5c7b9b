use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::action::Action;
use crate::backend::TopicSource;
use crate::bus::{BusEvent, NotificationBus, Subscription};
use crate::error::{Result, TopicListError};
use crate::favorite::{FavoriteController, Settled};
use crate::read_state::ReadStore;
use crate::types::{
    IconState, MenuState, Navigation, NodeInfo, Page, Topic, TopicList, VirtualPage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Loaded,
    Refreshing,
    Destroyed,
}

/// The screen's single loader instance. Aborts its fetch when dropped.
#[derive(Debug)]
struct Loader {
    load_id: u64,
    task: Option<JoinHandle<()>>,
}

impl Loader {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Topic list screen: load lifecycle, pull-to-refresh, favorite toggle and topic opening.
///
/// All methods run on the task that owns the screen. Background work reports
/// back through `action_tx` and is applied by the matching `on_*` method.
pub struct ListScreen {
    pub topics: Option<Vec<Topic>>,
    pub refreshing: bool,
    pub scroll_offset: usize,
    pub error: Option<TopicListError>,
    /// Bumped whenever the menu has to be rebuilt.
    pub menu_version: u64,
    page: Page,
    state: LoadState,
    favorite: FavoriteController,
    loader: Option<Loader>,
    next_load_id: u64,
    subscriptions: Vec<Subscription>,
    source: Arc<dyn TopicSource>,
    read_store: Arc<dyn ReadStore>,
    bus: NotificationBus,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl ListScreen {
    pub fn new(
        page: Page,
        source: Arc<dyn TopicSource>,
        read_store: Arc<dyn ReadStore>,
        bus: NotificationBus,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            topics: None,
            refreshing: false,
            scroll_offset: 0,
            error: None,
            menu_version: 0,
            favorite: FavoriteController::new(page.supports_favorite()),
            page,
            state: LoadState::Uninitialized,
            loader: None,
            next_load_id: 1,
            subscriptions: Vec::new(),
            source,
            read_store,
            bus,
            action_tx,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn favorite(&self) -> &FavoriteController {
        &self.favorite
    }

    /// Title for the host's header. Plain listing tabs keep the host's own title.
    pub fn title(&self) -> Option<&str> {
        match &self.page {
            Page::Node(node) => Some(&node.title),
            Page::Virtual(VirtualPage::FavoriteTopics) => Some(self.page.title()),
            Page::Virtual(VirtualPage::AllTopics) => None,
        }
    }

    pub fn icon_state(&self) -> IconState {
        self.favorite.icon_state()
    }

    pub fn menu_state(&self, logged_in: bool) -> MenuState {
        MenuState {
            favorite: if logged_in {
                self.icon_state()
            } else {
                IconState::default()
            },
            new_topic: logged_in,
            refresh: true,
        }
    }

    // ---- load lifecycle ----

    /// Start loading. Does nothing if this screen already has a loader.
    pub fn start(&mut self) {
        if self.state == LoadState::Destroyed || self.loader.is_some() {
            return;
        }

        tracing::debug!(page = %self.page, source = self.source.name(), "load list");
        self.state = LoadState::Loading;
        self.refreshing = true;
        self.loader = Some(self.spawn_load());

        if let Page::Node(node) = &self.page {
            if !node.has_info() {
                self.spawn_hydrate(node.name.clone());
            }
        }
    }

    pub fn on_load_finished(&mut self, load_id: u64, result: Result<TopicList>) {
        if self.state == LoadState::Destroyed {
            return;
        }
        match &mut self.loader {
            Some(loader) if loader.load_id == load_id => loader.task = None,
            _ => {
                tracing::debug!(load_id, "dropping stale load result");
                return;
            }
        }

        self.refreshing = false;
        self.state = LoadState::Loaded;

        let list = match result {
            Ok(list) => list,
            Err(e) => {
                tracing::debug!(page = %self.page, error = %e, "load list failed");
                self.error = Some(e);
                return;
            }
        };

        self.favorite.initialize(list.is_favorited, list.once_token);
        let mut topics = list.topics;
        for topic in &mut topics {
            if let Some(mark) = self.read_store.last_read(topic.id) {
                topic.has_read = topic.has_read || mark.last_read_reply >= topic.replies;
            }
        }
        self.topics = Some(topics);
        self.error = None;
        self.invalidate_menu();
    }

    pub fn on_load_reset(&mut self) {
        self.topics = None;
    }

    /// Force a new fetch. Does nothing before `start`.
    pub fn refresh(&mut self) {
        if self.state == LoadState::Destroyed || self.loader.is_none() {
            return;
        }

        tracing::debug!(page = %self.page, "refresh list");
        let loader = self.spawn_load();
        // Replacing the loader drops the previous one, which aborts its fetch.
        self.loader = Some(loader);
        self.refreshing = true;
        self.state = LoadState::Refreshing;
        self.scroll_offset = 0;
    }

    pub fn on_page_hydrated(&mut self, info: Option<NodeInfo>) {
        if self.state == LoadState::Destroyed {
            return;
        }
        if let (Page::Node(node), Some(info)) = (&mut self.page, info) {
            node.hydrate(info);
        }
    }

    fn spawn_load(&mut self) -> Loader {
        let load_id = self.next_load_id;
        self.next_load_id += 1;

        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let page = self.page.clone();
        let task = tokio::spawn(async move {
            let result = source.load_topics(&page).await;
            tx.send(Action::TopicsLoaded { load_id, result }).ok();
        });

        Loader {
            load_id,
            task: Some(task),
        }
    }

    fn spawn_hydrate(&self, name: String) {
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.node_info(&name).await {
                Ok(info) => {
                    tx.send(Action::PageHydrated(info)).ok();
                }
                Err(e) => {
                    tracing::debug!(node = %name, error = %e, "node info unavailable");
                }
            }
        });
    }

    // ---- favorite ----

    /// Optimistically flip the favorite state and confirm it in the background.
    pub fn toggle_favorite(&mut self) -> Result<()> {
        if self.state == LoadState::Destroyed {
            return Err(TopicListError::FavoriteUnavailable);
        }
        let Some(node) = self.page.as_node().cloned() else {
            return Err(TopicListError::FavoriteUnavailable);
        };
        let request = self.favorite.toggle()?;
        self.invalidate_menu();

        self.subscriptions.retain(|sub| !sub.is_finished());
        let tx = self.action_tx.clone();
        let subscription = self.bus.forward_once(node.name.clone(), move |_| {
            tx.send(Action::FavoriteChanged).ok();
        });
        self.subscriptions.push(subscription);

        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        let bus = self.bus.clone();
        tokio::spawn(async move {
            let outcome = source
                .set_favorite(&node, request.desired, &request.once_token)
                .await;
            let announce = match &outcome {
                Ok(()) => true,
                Err(e) => e.is_recoverable(),
            };
            tx.send(Action::FavoriteSettled {
                generation: request.generation,
                outcome,
            })
            .ok();
            if announce {
                bus.publish(BusEvent::FavoriteChanged { node: node.name });
            }
        });

        Ok(())
    }

    /// Apply a background favorite outcome. Unexpected failures are returned.
    pub fn on_favorite_settled(&mut self, generation: u64, outcome: Result<()>) -> Result<()> {
        if self.state == LoadState::Destroyed {
            return Ok(());
        }
        match self.favorite.settle(generation, outcome) {
            Ok(Settled::Reverted) => self.invalidate_menu(),
            Ok(Settled::Kept | Settled::Stale) => {}
            Err(e) => {
                tracing::error!(page = %self.page, error = %e, "favorite node failed unexpectedly");
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn on_favorite_changed(&mut self) {
        if self.state != LoadState::Destroyed {
            self.invalidate_menu();
        }
    }

    fn invalidate_menu(&mut self) {
        self.menu_version += 1;
    }

    // ---- navigation ----

    /// Mark the topic read and return where to go.
    pub fn open_topic(&mut self, index: usize) -> Option<Navigation> {
        let topic = self.topics.as_mut()?.get_mut(index)?;
        topic.has_read = true;
        self.read_store.mark_read(topic.id, topic.replies);
        Some(Navigation::TopicDetail { id: topic.id })
    }

    pub fn new_topic(&self) -> Navigation {
        Navigation::NewTopic {
            node: self.page.as_node().map(|node| node.name.clone()),
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let len = self.topics.as_ref().map_or(0, Vec::len);
        if self.scroll_offset + 1 < len {
            self.scroll_offset += 1;
        }
    }

    // ---- teardown ----

    /// Release bus subscriptions. Pending completions stop reaching the screen.
    pub fn stop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
    }

    pub fn teardown(&mut self) {
        if self.state == LoadState::Destroyed {
            return;
        }
        self.stop();
        if self.loader.take().is_some() {
            self.on_load_reset();
        }
        self.refreshing = false;
        self.state = LoadState::Destroyed;
    }
}

impl Drop for ListScreen {
    fn drop(&mut self) {
        self.stop();
    }
}
