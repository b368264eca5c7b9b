use std::fmt::Write;

use crate::app::App;
use crate::types::{Navigation, Topic};

const PAGE_SIZE: usize = 20;

/// Render the screen as plain text, one frame per call
pub fn render(app: &App) -> String {
    let mut out = String::new();
    render_header(&mut out, app);
    render_list(&mut out, app);
    render_status_bar(&mut out, app);
    out
}

fn render_header(out: &mut String, app: &App) {
    let key = app.screen.page().key();
    let title = app.screen.title().unwrap_or(&key);
    let menu = app.screen.menu_state(app.logged_in);

    let mut actions = Vec::new();
    if menu.refresh {
        actions.push("[r]efresh");
    }
    if menu.favorite.visible {
        actions.push(if menu.favorite.favored {
            "[f]av ★"
        } else {
            "[f]av ☆"
        });
    }
    if menu.new_topic {
        actions.push("[n]ew");
    }

    let _ = writeln!(out, "== {} ==  {}", title, actions.join("  "));
}

fn render_list(out: &mut String, app: &App) {
    let Some(topics) = &app.screen.topics else {
        let _ = writeln!(out, "  (nothing loaded)");
        return;
    };
    if topics.is_empty() {
        let _ = writeln!(out, "  (no topics)");
        return;
    }

    let start = app.screen.scroll_offset.min(topics.len().saturating_sub(1));
    for (i, topic) in topics.iter().enumerate().skip(start).take(PAGE_SIZE) {
        let _ = writeln!(out, "{}", topic_line(i + 1, topic));
    }
}

fn topic_line(number: usize, topic: &Topic) -> String {
    let marker = if topic.has_read { ' ' } else { '*' };
    format!(
        "{:>3}{} {}  ({}, {} replies, {})",
        number,
        marker,
        topic.title,
        topic.author,
        topic.replies,
        topic.updated_at.format("%Y-%m-%d %H:%M")
    )
}

fn render_status_bar(out: &mut String, app: &App) {
    let mut parts = Vec::new();
    if app.screen.refreshing {
        parts.push("refreshing...".to_string());
    }
    if app.screen.favorite().in_flight() > 0 {
        parts.push("saving favorite...".to_string());
    }
    if let Some(err) = &app.screen.error {
        parts.push(format!("error: {}", err));
    }
    if let Some(notice) = &app.notice {
        parts.push(notice.clone());
    }
    match &app.navigation {
        Some(Navigation::TopicDetail { id }) => parts.push(format!("-> topic {}", id)),
        Some(Navigation::NewTopic { node: Some(node) }) => {
            parts.push(format!("-> new topic in {}", node))
        }
        Some(Navigation::NewTopic { node: None }) => parts.push("-> new topic".to_string()),
        None => {}
    }
    if !parts.is_empty() {
        let _ = writeln!(out, "-- {}", parts.join(" | "));
    }
}
