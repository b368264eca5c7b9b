use crate::action::Action;
use crate::error::Result;
use crate::event::Event;
use crate::screen::ListScreen;
use crate::types::Navigation;

pub struct App {
    pub screen: ListScreen,
    pub logged_in: bool,
    pub should_quit: bool,
    /// Last navigation request, shown by the renderer in place of a real detail screen.
    pub navigation: Option<Navigation>,
    /// One-line feedback for the last command.
    pub notice: Option<String>,
}

impl App {
    pub fn new(screen: ListScreen, logged_in: bool) -> Self {
        Self {
            screen,
            logged_in,
            should_quit: false,
            navigation: None,
            notice: None,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Start,
            Event::Line(line) => self.handle_line(&line),
            Event::Eof => Action::Quit,
        }
    }

    fn handle_line(&self, line: &str) -> Action {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Action::None;
        };
        let menu = self.screen.menu_state(self.logged_in);

        match command {
            "q" | "quit" => Action::Quit,
            "r" | "refresh" => Action::Refresh,
            "j" | "down" => Action::ScrollDown,
            "k" | "up" => Action::ScrollUp,
            // The favorite action only exists while the icon is shown.
            "f" | "fav" => {
                if menu.favorite.visible {
                    Action::ToggleFavorite
                } else {
                    Action::Error("favorite is not available on this page".to_string())
                }
            }
            "n" | "new" => {
                if menu.new_topic {
                    Action::NewTopic
                } else {
                    Action::Error("sign in to post a topic".to_string())
                }
            }
            "o" | "open" => match words.next().map(str::parse::<usize>) {
                Some(Ok(n)) if n > 0 => Action::OpenTopic(n - 1),
                _ => Action::Error("usage: open <number>".to_string()),
            },
            other => Action::Error(format!("unknown command: {}", other)),
        }
    }

    /// Apply one action on the owning task. Errors here are bugs and end the session.
    pub fn update(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Start => {
                self.screen.start();
            }
            Action::Refresh => {
                self.notice = None;
                self.screen.refresh();
            }
            Action::TopicsLoaded { load_id, result } => {
                self.screen.on_load_finished(load_id, result);
            }
            Action::PageHydrated(info) => {
                self.screen.on_page_hydrated(info);
            }
            Action::ToggleFavorite => {
                // A reload queued ahead of the command may have hidden the icon.
                if self.screen.menu_state(self.logged_in).favorite.visible {
                    self.notice = None;
                    self.screen.toggle_favorite()?;
                } else {
                    self.notice = Some("favorite is no longer available".to_string());
                }
            }
            Action::FavoriteSettled {
                generation,
                outcome,
            } => {
                self.screen.on_favorite_settled(generation, outcome)?;
            }
            Action::FavoriteChanged => {
                self.screen.on_favorite_changed();
            }
            Action::ScrollUp => self.screen.scroll_up(),
            Action::ScrollDown => self.screen.scroll_down(),
            Action::OpenTopic(index) => match self.screen.open_topic(index) {
                Some(nav) => {
                    self.notice = None;
                    self.navigation = Some(nav);
                }
                None => {
                    self.notice = Some(format!("no topic #{}", index + 1));
                }
            },
            Action::NewTopic => {
                self.navigation = Some(self.screen.new_topic());
            }
            Action::Error(msg) => {
                self.notice = Some(msg);
            }
            Action::None => {}
        }
        Ok(())
    }
}
