//! Text projection of client state
//!
//! Everything here is a pure function of [`AppState`]; the terminal front
//! end prints what these return.

use crate::state_machine::{AppState, Identity, Role, Source};

/// Send control label while idle
pub const SEND_LABEL: &str = "Send";
/// Send control label while an exchange is in flight
pub const BUSY_LABEL: &str = "...";

pub fn send_label(state: &AppState) -> &'static str {
    if state.pending {
        BUSY_LABEL
    } else {
        SEND_LABEL
    }
}

/// Session id shown at 1-based position `index` in the sidebar
pub fn session_at(state: &AppState, index: usize) -> Option<&str> {
    index
        .checked_sub(1)
        .and_then(|i| state.directory.sessions().get(i))
        .map(|s| s.id.as_str())
}

/// Numbered session list, active entry marked
pub fn sidebar(state: &AppState) -> Vec<String> {
    if state.directory.is_empty() {
        return vec!["(no sessions)".to_string()];
    }
    let active = state.directory.active_id();
    state
        .directory
        .sessions()
        .iter()
        .enumerate()
        .map(|(i, session)| {
            let marker = if Some(session.id.as_str()) == active { '>' } else { ' ' };
            format!("{marker} {}. {}", i + 1, session.name)
        })
        .collect()
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    }
}

/// Active session's messages in order
pub fn conversation(state: &AppState) -> Vec<String> {
    match state.active_session() {
        None => vec!["No session selected.".to_string()],
        Some(session) => session
            .messages
            .iter()
            .map(|m| format!("{}: {}", speaker(m.role), m.content))
            .collect(),
    }
}

fn source_line(source: &Source) -> String {
    let url = if !source.title.trim().is_empty() && !source.url.is_empty() {
        format!(" <{}>", source.url)
    } else {
        String::new()
    };
    let page = source
        .page
        .map(|page| format!(" (p. {page})"))
        .unwrap_or_default();
    format!("  - {}{url}{page}", source.label())
}

/// Sources of the latest reply; empty when there are none
pub fn sources(state: &AppState) -> Vec<String> {
    if state.sources.is_empty() {
        return Vec::new();
    }
    std::iter::once("Sources:".to_string())
        .chain(state.sources.iter().map(source_line))
        .collect()
}

/// Full screen, one trailing newline per line
pub fn render(state: &AppState) -> String {
    let mut lines = Vec::new();

    if let Identity::Unidentified | Identity::Registering = state.identity {
        if let Some(alert) = &state.identity_error {
            lines.push(format!("! {alert}"));
        }
    } else {
        lines.push("Sessions".to_string());
        lines.extend(sidebar(state));
        lines.push(String::new());
        lines.extend(conversation(state));
        let sources = sources(state);
        if !sources.is_empty() {
            lines.push(String::new());
            lines.extend(sources);
        }
        lines.push(format!("[{}]", send_label(state)));
    }

    lines.iter().map(|line| format!("{line}\n")).collect()
}
