//! Public runtime API surface.
//!
//! This module gathers the types exposed to hosts of the runtime crate so the
//! session and action layers can stay focused on scheduling.

pub mod errors;
pub mod headless;
pub mod providers;

pub use errors::{Result, RuntimeError};
pub use headless::{
    ChannelPrompt, FirstChoicePrompt, HeadlessVisualPlayer, PromptResponder, StaticWorld,
};
pub use providers::{PromptProvider, PromptRequest, VisualPlayer, WorldPlacement};
