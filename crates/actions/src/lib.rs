//! WebDriver Actions dispatch engine
//!
//! Turns a declarative, multi-source action chain (keyboards and pointers)
//! into a time-ordered stream of low-level input events delivered to an
//! [`InputHost`]:
//! - per-session input state that survives across dispatch calls
//! - validation of the loosely-typed wire format into typed ticks
//! - tick scheduling: ticks run in sequence, the actions of a tick run concurrently
//! - pointer move interpolation at a fixed sample cadence
//! - release of everything still held via the pending-cancellation list

pub mod config;
mod dispatch;
pub mod errors;
pub mod host;
pub mod keys;
pub mod model;
pub mod pending;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod testing;
pub mod types;
pub mod validate;

pub use config::ActionsConfig;
pub use dispatch::interpolate;
pub use errors::*;
pub use host::InputHost;
pub use model::{Action, ActionKind, Chain, PointerOrigin, Sequence, SourceType, Subtype};
pub use scheduler::tick_duration;
pub use session::ActionSession;
pub use state::{InputState, InputStateStore, KeyState, Modifiers, PointerState, PointerType, SourceKind};
pub use types::*;

pub use wd_actions_core_types::{ElementRef, InputSourceId, Point, SessionId, Viewport, ELEMENT_KEY};
