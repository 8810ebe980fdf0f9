//! View state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the messaging panel completely decoupled from I/O
//! and synchronization mechanics.
//!
//! This is a pure state machine: user intents enter through its methods,
//! notifications enter through [`App::handle`], and both produce
//! [`crate::ViewAction`] instructions for the runtime to execute. All
//! conversation data lives in the store; the App only owns what is purely
//! presentational: panel visibility, pane focus, the compose box, status
//! text, and a pending deep link.

use parlor_core::Counterparty;

use crate::{Pane, ViewAction, ViewEvent};

/// Below this many columns the layout collapses to a single pane.
pub const COLLAPSE_BREAKPOINT_COLS: u16 = 100;

/// View state machine for the messaging panel.
#[derive(Debug, Clone)]
pub struct App {
    /// Whether the panel is open.
    panel_open: bool,
    /// Focused pane for single-pane layouts.
    pane: Pane,
    /// Compose input text.
    compose: String,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Viewport dimensions (columns, rows).
    viewport: (u16, u16),
    /// Deep-link target awaiting the conversation list.
    pending_deep_link: Option<Counterparty>,
}

impl App {
    /// Create a closed panel.
    pub fn new() -> Self {
        Self {
            panel_open: false,
            pane: Pane::List,
            compose: String::new(),
            status_message: None,
            viewport: (80, 24),
            pending_deep_link: None,
        }
    }

    /// Process a notification and return actions.
    pub fn handle(&mut self, event: ViewEvent) -> Vec<ViewAction> {
        match event {
            ViewEvent::Tick => vec![],
            ViewEvent::Resize(cols, rows) => {
                self.viewport = (cols, rows);
                vec![ViewAction::Render]
            },
            ViewEvent::ConnectionUp => {
                self.status_message = None;
                vec![ViewAction::Render]
            },
            ViewEvent::ConnectionDown => {
                self.status_message = Some("Reconnecting...".to_owned());
                vec![ViewAction::Render]
            },
            ViewEvent::StoreUpdated => vec![ViewAction::Render],
            ViewEvent::Notice { message } => {
                self.status_message = Some(message);
                vec![ViewAction::Render]
            },
        }
    }

    // --- user intents ----------------------------------------------------

    /// Open the messaging panel.
    pub fn open_panel(&mut self) -> Vec<ViewAction> {
        if self.panel_open {
            return vec![];
        }
        self.panel_open = true;
        self.pane = Pane::List;
        vec![ViewAction::Refresh, ViewAction::Render]
    }

    /// Close the messaging panel, closing any open conversation with it.
    pub fn close_panel(&mut self) -> Vec<ViewAction> {
        if !self.panel_open {
            return vec![];
        }
        self.panel_open = false;
        self.compose.clear();
        self.pending_deep_link = None;
        vec![ViewAction::Close, ViewAction::Render]
    }

    /// User picked a conversation from the list.
    ///
    /// A manual selection supersedes any pending deep link.
    pub fn select_conversation(&mut self, partner: Counterparty) -> Vec<ViewAction> {
        self.pending_deep_link = None;
        self.pane = Pane::Thread;
        self.compose.clear();
        vec![ViewAction::Open { partner }, ViewAction::Render]
    }

    /// External navigation asked for a conversation with this counterparty.
    ///
    /// Opens the panel and parks the target until the conversation list has
    /// loaded; the runtime resolves it via [`App::resolve_deep_link`].
    pub fn deep_link(&mut self, partner: Counterparty) -> Vec<ViewAction> {
        self.panel_open = true;
        self.pane = Pane::Thread;
        self.pending_deep_link = Some(partner);
        vec![ViewAction::Refresh, ViewAction::Render]
    }

    /// Consume the pending deep link once the list is available.
    ///
    /// Applied at most once per deep link; returns no actions when nothing
    /// is pending.
    pub fn resolve_deep_link(&mut self) -> Vec<ViewAction> {
        match self.pending_deep_link.take() {
            Some(partner) => vec![ViewAction::Open { partner }, ViewAction::Render],
            None => vec![],
        }
    }

    /// Return from the thread to the conversation list.
    pub fn back_to_list(&mut self) -> Vec<ViewAction> {
        self.pane = Pane::List;
        self.compose.clear();
        vec![ViewAction::Close, ViewAction::Render]
    }

    /// The compose input changed.
    pub fn compose_changed(&mut self, text: impl Into<String>) -> Vec<ViewAction> {
        self.compose = text.into();
        vec![ViewAction::Input { text: self.compose.clone() }, ViewAction::Render]
    }

    /// Submit the compose box.
    ///
    /// Blank input is ignored; otherwise the box clears optimistically and
    /// the body goes to the store.
    pub fn submit_compose(&mut self) -> Vec<ViewAction> {
        let body = std::mem::take(&mut self.compose);
        if body.trim().is_empty() {
            self.compose = body;
            return vec![];
        }
        vec![
            ViewAction::Send { body },
            ViewAction::Input { text: String::new() },
            ViewAction::Render,
        ]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<ViewAction> {
        vec![ViewAction::Quit]
    }

    // --- observable state ------------------------------------------------

    /// Whether the panel is open.
    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Focused pane.
    pub fn pane(&self) -> Pane {
        self.pane
    }

    /// Compose input text.
    pub fn compose(&self) -> &str {
        &self.compose
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Viewport dimensions (columns, rows).
    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    /// Whether the layout shows one pane at a time.
    ///
    /// When collapsed, [`App::pane`] decides which pane is visible; a wide
    /// viewport shows both and ignores pane focus.
    pub fn is_collapsed(&self) -> bool {
        self.viewport.0 < COLLAPSE_BREAKPOINT_COLS
    }

    /// Deep-link target still awaiting the list, if any.
    pub fn pending_deep_link(&self) -> Option<&Counterparty> {
        self.pending_deep_link.as_ref()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
