//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI and
//! routes keyboard events to the session controller and the conversation
//! directory.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (answer in flight, store call pending, toast showing): draws
//!   every ~80ms so the spinner turns and results show up promptly.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! Nothing here awaits the network. Answers and store calls run on tokio
//! tasks and come back as events, drained between terminal polls, so Ctrl+C
//! and redraws are handled while a request is outstanding.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod theme;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::{DefaultTerminal, Frame};

use crate::Theme;
use crate::core::config::ResolvedConfig;
use crate::core::directory::{
    ConversationDirectory, DirectoryError, DirectoryEvent, MutationState,
};
use crate::core::history::FileHistoryStore;
use crate::core::reactions::CopyTarget;
use crate::core::session::{SessionController, SessionOptions};
use crate::remote::{AnsweringService, HttpAnsweringService, HttpConversationStore};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, LandingPage, Popup, SidebarEvent, SidebarState, TranscriptViewState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::Palette;

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Select exchanges with arrow keys and react to them. Typing switches to Input.
    Cursor,
    /// Text editing in the input box. Esc switches to Cursor.
    Input,
}

/// TUI-specific presentation state (not part of the session)
pub struct TuiState {
    pub theme: Theme,
    // Persistent component states
    pub transcript_view: TranscriptViewState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
    // Overlays (None = hidden)
    pub sidebar: Option<SidebarState>,
    pub popup: Option<Popup>,
    pub suggestions: Vec<String>,
    pub login_url: String,
}

impl TuiState {
    pub fn new(theme: Theme, suggestions: Vec<String>, login_url: String) -> Self {
        Self {
            theme,
            transcript_view: TranscriptViewState::new(),
            input_box: InputBox::new(Palette::for_theme(theme)),
            input_mode: InputMode::Input, // User expects to type immediately
            sidebar: None,
            popup: None,
            suggestions,
            login_url,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Session, directory and presentation state, plus the event routing between them.
pub struct ChatApp {
    pub session: SessionController,
    pub directory: ConversationDirectory,
    pub tui: TuiState,
}

impl ChatApp {
    pub fn new(session: SessionController, directory: ConversationDirectory, tui: TuiState) -> Self {
        Self {
            session,
            directory,
            tui,
        }
    }

    /// Starts the credential check and the profile fetch. Results arrive later
    /// through [`ChatApp::drain_directory_events`].
    pub fn startup(&mut self) {
        self.directory.spawn_verify_session();
        self.directory.spawn_refresh_user();
    }

    /// Applies every queued background event. Returns true if any arrived.
    pub fn drain_session_events(&mut self) -> bool {
        let mut any = false;
        while let Some(event) = self.session.try_next_event() {
            self.session.apply(event);
            any = true;
        }
        any
    }

    /// Applies every finished store call. Returns true if any arrived.
    pub fn drain_directory_events(&mut self) -> bool {
        let mut any = false;
        while let Some(event) = self.directory.try_next_event() {
            self.apply_directory_event(event);
            any = true;
        }
        any
    }

    /// Waits until every spawned store call has been applied.
    pub async fn settle_directory(&mut self) {
        while let Some(event) = self.directory.next_event().await {
            self.apply_directory_event(event);
        }
    }

    fn apply_directory_event(&mut self, event: DirectoryEvent) {
        let was_empty = self.session.transcript().is_empty();
        if let Err(e) = self.directory.apply(event, &mut self.session) {
            self.handle_directory_error(e);
        }
        if !was_empty && self.session.transcript().is_empty() {
            self.transcript_replaced();
        }
        let len = self.directory.conversations().len();
        self.clamp_sidebar(len);
    }

    pub fn draw(&mut self, frame: &mut Frame, spinner_frame: usize) {
        ui::draw_ui(
            frame,
            &mut self.session,
            &self.directory,
            &mut self.tui,
            spinner_frame,
        );
    }

    /// Routes one terminal event. Returns true when the app should quit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        self.tui.input_box.busy = self.session.is_busy();

        match event {
            TuiEvent::ForceQuit => return true,
            TuiEvent::Resize => return false,
            TuiEvent::ToggleTheme => {
                self.tui.theme = self.tui.theme.toggled();
                debug!("Theme switched to {:?}", self.tui.theme);
                return false;
            }
            _ => {}
        }

        // Any key dismisses a popup
        if self.tui.popup.take().is_some() {
            return false;
        }

        if matches!(self.directory.state(), MutationState::ConfirmPending(_)) {
            self.handle_confirmation(&event);
            return false;
        }

        if event == TuiEvent::OpenSidebar {
            self.open_sidebar();
            return false;
        }

        if self.tui.sidebar.is_some() {
            self.handle_sidebar_event(&event);
            return false;
        }

        if matches!(
            event,
            TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown
        ) {
            self.tui.transcript_view.handle_event(&event);
            return false;
        }

        match self.tui.input_mode {
            InputMode::Input => self.handle_input_mode(event),
            InputMode::Cursor => self.handle_cursor_mode(event),
        }
        false
    }

    fn handle_input_mode(&mut self, event: TuiEvent) {
        let len = self.session.transcript().len();
        match event {
            TuiEvent::Escape => {
                self.tui.input_mode = InputMode::Cursor;
                self.tui.transcript_view.selected_index = None;
                self.tui.transcript_view.select_previous(len);
            }
            TuiEvent::CursorUp => {
                self.tui.transcript_view.handle_event(&TuiEvent::ScrollUp);
            }
            TuiEvent::CursorDown => {
                self.tui.transcript_view.handle_event(&TuiEvent::ScrollDown);
            }
            TuiEvent::InputChar(key) if len == 0 && self.tui.input_box.buffer.is_empty() => {
                match LandingPage::suggestion_for_key(&self.tui.suggestions, key) {
                    Some(i) => {
                        let question = self.tui.suggestions[i].clone();
                        self.submit(&question);
                    }
                    None => {
                        self.tui.input_box.handle_event(&event);
                    }
                }
            }
            _ => {
                if let Some(InputEvent::Submit(text)) = self.tui.input_box.handle_event(&event) {
                    self.submit(&text);
                }
            }
        }
    }

    fn handle_cursor_mode(&mut self, event: TuiEvent) {
        let len = self.session.transcript().len();
        match event {
            TuiEvent::CursorUp => self.tui.transcript_view.select_previous(len),
            TuiEvent::CursorDown => self.tui.transcript_view.select_next(len),
            TuiEvent::Submit => self.enter_input_mode(),
            TuiEvent::InputChar(key @ ('c' | 'C' | 'l' | 'd'))
                if self.tui.transcript_view.selected_index.is_some() =>
            {
                self.react(key);
            }
            // Typing auto-switches to Input mode and forwards the event
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                self.enter_input_mode();
                self.tui.input_box.handle_event(&event);
            }
            _ => {}
        }
    }

    fn react(&mut self, key: char) {
        let Some(index) = self.tui.transcript_view.selected_index else {
            return;
        };
        let applied = match key {
            'c' => self.session.copy(index, CopyTarget::Answer),
            'C' => self.session.copy(index, CopyTarget::Question),
            'l' => self.session.toggle_like(index),
            'd' => self.session.toggle_dislike(index),
            _ => false,
        };
        if !applied {
            debug!("Reaction '{}' on entry {} not applied", key, index);
        }
    }

    fn enter_input_mode(&mut self) {
        self.tui.input_mode = InputMode::Input;
        self.tui.transcript_view.selected_index = None;
    }

    fn submit(&mut self, question: &str) {
        if self.session.submit(question) {
            self.tui.transcript_view.stick_to_bottom = true;
        }
    }

    // ========================================================================
    // Sidebar and confirmation
    // ========================================================================

    /// Opens on the current mirror and refreshes it in the background.
    fn open_sidebar(&mut self) {
        self.tui.sidebar = Some(SidebarState::new(self.directory.conversations().len()));
        self.refresh_directory();
    }

    fn refresh_directory(&mut self) {
        self.directory.spawn_list();
        self.directory.spawn_refresh_user();
    }

    fn handle_sidebar_event(&mut self, event: &TuiEvent) {
        let Some(sidebar) = self.tui.sidebar.as_mut() else {
            return;
        };
        let Some(action) = sidebar.handle_event(event, self.directory.conversations()) else {
            return;
        };

        match action {
            SidebarEvent::Resume(conversation) => {
                self.directory.select(&conversation, &mut self.session);
                self.transcript_replaced();
                self.tui.sidebar = None;
            }
            SidebarEvent::Delete(id) => {
                if let Err(e) = self.directory.request_delete(&id) {
                    self.handle_directory_error(e);
                }
            }
            SidebarEvent::DeleteAll => {
                if let Err(e) = self.directory.request_delete_all() {
                    self.handle_directory_error(e);
                }
            }
            SidebarEvent::NewChat => {
                self.session.reset();
                self.transcript_replaced();
                self.tui.sidebar = None;
            }
            SidebarEvent::Refresh => self.refresh_directory(),
            SidebarEvent::Dismiss => self.tui.sidebar = None,
        }
    }

    fn handle_confirmation(&mut self, event: &TuiEvent) {
        match event {
            TuiEvent::InputChar('y' | 'Y') | TuiEvent::Submit => {
                if let Err(e) = self.directory.spawn_confirm() {
                    self.handle_directory_error(e);
                }
            }
            TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => self.directory.cancel(),
            _ => {}
        }
    }

    fn clamp_sidebar(&mut self, len: usize) {
        if let Some(sidebar) = self.tui.sidebar.as_mut() {
            sidebar.clamp(len);
        }
    }

    fn transcript_replaced(&mut self) {
        self.tui.transcript_view.reset();
        self.enter_input_mode();
    }

    fn handle_directory_error(&mut self, error: DirectoryError) {
        match error {
            DirectoryError::SignInRequired => {
                info!("Credentials rejected, prompting sign-in");
                self.tui.sidebar = None;
                self.tui.popup = Some(Popup::SignIn {
                    login_url: self.tui.login_url.clone(),
                });
            }
            other => match other.alert() {
                Some(text) => self.tui.popup = Some(Popup::Alert(text)),
                None => warn!("{}", other),
            },
        }
    }

    async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        let start_time = Instant::now();
        let mut needs_redraw = true; // Force first frame
        let mut was_animating = false;

        loop {
            let animating = self.session.is_busy()
                || self.directory.has_pending()
                || self.session.notification(Instant::now()).is_some();
            // One more frame after animation stops clears the spinner or toast
            if animating || was_animating {
                needs_redraw = true;
            }
            was_animating = animating;

            if needs_redraw {
                let spinner_frame = (start_time.elapsed().as_millis() / ANIMATION_TICK.as_millis()) as usize;
                terminal.draw(|f| self.draw(f, spinner_frame))?;
                needs_redraw = false;
            }

            let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
            let mut pending = poll_event_timeout(timeout)?;
            if pending.is_some() {
                needs_redraw = true;
            }
            // Drain all pending events before the next draw
            while let Some(event) = pending {
                if self.handle_event(event) {
                    return Ok(());
                }
                pending = poll_event_immediate()?;
            }

            if self.drain_session_events() {
                needs_redraw = true;
            }
            if self.drain_directory_events() {
                needs_redraw = true;
            }
        }
    }
}

pub async fn run(config: ResolvedConfig) -> io::Result<()> {
    let answering: Arc<dyn AnsweringService> =
        Arc::new(HttpAnsweringService::new(config.answer_url.clone()));
    let store = HttpConversationStore::new(
        config.store_url.clone(),
        config.session_cookie.as_deref(),
        config.store_timeout,
    )
    .map_err(io::Error::other)?;
    let history = FileHistoryStore::new(&config.state_dir)?;
    info!(
        "Answering via {}, history at {}",
        config.answer_url,
        history.path().display()
    );

    let session = SessionController::new(
        answering,
        Box::new(history),
        SessionOptions::from_config(&config),
    );
    let directory = ConversationDirectory::new(Arc::new(store), config.user_id.clone());
    let tui = TuiState::new(config.theme, config.suggestions.clone(), config.login_url.clone());
    let mut app = ChatApp::new(session, directory, tui);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();
    app.startup();

    let result = app.event_loop(&mut terminal).await;
    ratatui::restore();
    result
}
