//! # TUI Components
//!
//! Components follow two patterns.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built fresh each frame from the data they show:
//! - `Exchange`: one question card plus its answer card
//! - `LandingPage`: greeting and suggested questions
//! - `Dialog`, `Toast`: popups and the copy confirmation
//! - `StatusBar`: top line with service, user and mode hints
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper renders it:
//! - `InputBox`: the question field
//! - `TranscriptView` / `TranscriptViewState`: scrollable transcript
//! - `Sidebar` / `SidebarState`: saved conversations overlay
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── exchange.rs
//! ├── input_box/
//! ├── landing.rs
//! ├── popup.rs
//! ├── sidebar.rs
//! ├── status_bar.rs
//! └── transcript_view.rs
//! ```

pub mod exchange;
pub mod input_box;
pub mod landing;
pub mod popup;
pub mod sidebar;
pub mod status_bar;
pub mod transcript_view;

pub use input_box::{InputBox, InputEvent};
pub use landing::LandingPage;
pub use popup::{Dialog, Popup, Toast};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use status_bar::StatusBar;
pub use transcript_view::{TranscriptView, TranscriptViewState};
