use std::fmt::Write;

use super::{DASHBOARD_SUBTITLE, DASHBOARD_TITLE, DashboardBody, DashboardView};
use crate::posts::Post;
use crate::retry::{ErrorView, IconState, RetryStatusView};

const RING_WIDTH: usize = 20;
const MAX_CARD_TAGS: usize = 3;

/// Renders one frame of the dashboard as plain text.
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{DASHBOARD_TITLE}");
    let _ = writeln!(out, "{DASHBOARD_SUBTITLE}");
    if let Some(updated) = view.last_updated {
        let _ = writeln!(out, "Last updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    out.push('\n');

    out.push_str("Search posts by ID (e.g., 1, 2, 3...)\n");
    if let Some(status) = &view.search_status {
        let _ = writeln!(out, "{status}");
    }
    out.push('\n');

    if let Some(error) = &view.error {
        render_error(&mut out, error);
        out.push('\n');
    }

    if view.loading {
        out.push_str("Loading posts...\n");
    }

    match &view.body {
        DashboardBody::Hidden => {}
        DashboardBody::Empty { message } => {
            out.push_str("No Posts Found\n");
            let _ = writeln!(out, "{message}");
        }
        DashboardBody::Posts(posts) => {
            for post in posts {
                render_post(&mut out, post);
                out.push('\n');
            }
        }
    }

    out
}

fn render_error(out: &mut String, error: &ErrorView) {
    let icon = match error.icon {
        IconState::Normal => "(!)",
        IconState::Retrying => "(~)",
        IconState::Critical => "/!\\",
    };
    let _ = writeln!(out, "{icon} {}", error.title);
    let _ = writeln!(out, "    {}", error.description);

    if let Some(status) = &error.retry_status {
        match status {
            RetryStatusView::Retrying => {
                let _ = writeln!(out, "    {}", status.label());
            }
            RetryStatusView::Countdown { fill_fraction, .. } => {
                let _ = writeln!(out, "    {} {}", ring(*fill_fraction), status.label());
            }
        }
    }
    if let Some(attempt) = &error.attempt_label {
        let _ = writeln!(out, "    {attempt}");
    }

    let buttons = error
        .actions
        .iter()
        .map(|action| {
            if action.enabled {
                format!("[{}]", action.label)
            } else {
                format!("[{} (disabled)]", action.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if !buttons.is_empty() {
        let _ = writeln!(out, "    {buttons}");
    }
}

fn ring(fill_fraction: f64) -> String {
    let filled = ((fill_fraction.clamp(0.0, 1.0) * RING_WIDTH as f64).round() as usize)
        .min(RING_WIDTH);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(RING_WIDTH - filled)
    )
}

fn render_post(out: &mut String, post: &Post) {
    let _ = writeln!(out, "#{}  {}", post.id, post.title);
    if !post.body.is_empty() {
        let _ = writeln!(out, "    {}", post.body);
    }
    let tags = post
        .tags
        .iter()
        .take(MAX_CARD_TAGS)
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ");
    if !tags.is_empty() {
        let _ = writeln!(out, "    {tags}");
    }
    let _ = writeln!(
        out,
        "    likes {}  dislikes {}  views {}",
        post.reactions.likes, post.reactions.dislikes, post.views
    );
}
