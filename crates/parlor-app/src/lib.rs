//! View layer for the Parlor messaging panel.
//!
//! Pure state machines and a generic runtime for view and store
//! orchestration, enabling deterministic testing with the same code that
//! runs in production.
//!
//! # Components
//!
//! - [`App`]: view state machine (panel visibility, pane focus, compose
//!   box, deep links)
//! - [`Bridge`]: translation layer between view actions and the
//!   conversation store
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::ViewAction;
pub use app::{App, COLLAPSE_BREAKPOINT_COLS};
pub use bridge::{Bridge, FetchRequest};
pub use driver::{Driver, GatewayUpdate};
pub use event::ViewEvent;
pub use runtime::Runtime;
pub use state::{Pane, ViewFrame};
