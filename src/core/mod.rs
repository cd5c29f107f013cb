//! # Core Application Logic
//!
//! Chat AI's session state. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            CORE             │
//!                    │                             │
//!                    │  • Transcript (entries)     │
//!                    │  • Action + update()        │
//!                    │  • SessionController        │
//!                    │  • ConversationDirectory    │
//!                    └──────────────┬──────────────┘
//!                                   │
//!            ┌──────────────────────┼──────────────────────┐
//!            ▼                      ▼                      ▼
//!     ┌────────────┐         ┌────────────┐         ┌────────────┐
//!     │    TUI     │         │   remote   │         │  history   │
//!     │ (ratatui)  │         │   (HTTP)   │         │  (files)   │
//!     └────────────┘         └────────────┘         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`transcript`]: entries and their lifecycle
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`session`]: owns the transcript, drives answering and streaming
//! - [`renderer`]: typewriter reveal and answer line layout
//! - [`reactions`]: like/dislike/copy
//! - [`history`]: durable local copy of the transcript
//! - [`directory`]: server-saved conversations and delete confirmation
//! - [`config`]: settings resolution

pub mod action;
pub mod config;
pub mod directory;
pub mod history;
pub mod reactions;
pub mod renderer;
pub mod session;
pub mod transcript;
