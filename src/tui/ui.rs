//! Frame composition: status bar, main area (landing page or transcript),
//! input box, then overlays in stacking order (sidebar, dialog, toast).

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::widgets::Block;

use crate::core::directory::{ConversationDirectory, MutationState};
use crate::core::reactions::ReactionState;
use crate::core::session::SessionController;
use crate::tui::component::Component;
use crate::tui::components::{
    Dialog, LandingPage, Sidebar, StatusBar, Toast, TranscriptView,
};
use crate::tui::theme::Palette;
use crate::tui::{InputMode, TuiState};

pub fn draw_ui(
    frame: &mut Frame,
    session: &mut SessionController,
    directory: &ConversationDirectory,
    tui: &mut TuiState,
    spinner_frame: usize,
) {
    let palette = Palette::for_theme(tui.theme);
    let toast = session
        .notification(Instant::now())
        .map(|n| n.text.clone());
    let transcript = session.transcript();

    // Sync InputBox props
    tui.input_box.palette = palette;
    tui.input_box.busy = session.is_busy();
    tui.input_box.dimmed = tui.input_mode == InputMode::Cursor || tui.sidebar.is_some();

    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let input_height = tui.input_box.calculate_height(area.width);
    let [status_area, main_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_height),
    ])
    .areas(area);

    StatusBar {
        service_name: session.answering_service(),
        user_name: &directory.profile().name,
        busy: session.is_busy(),
        has_unseen_content: !transcript.is_empty() && !tui.transcript_view.stick_to_bottom,
        input_mode: tui.input_mode,
        palette: &palette,
    }
    .render(frame, status_area);

    if transcript.is_empty() {
        LandingPage {
            suggestions: &tui.suggestions,
            palette: &palette,
        }
        .render(frame, main_area);
    } else {
        let reactions: Vec<ReactionState> =
            (0..transcript.len()).map(|i| session.reaction(i)).collect();
        TranscriptView {
            state: &mut tui.transcript_view,
            transcript,
            reactions: &reactions,
            spinner_frame,
            palette: &palette,
        }
        .render(frame, main_area);
    }

    tui.input_box.render(frame, input_area);

    // Overlays
    let overlay_area = main_area.union(input_area);
    if let Some(sidebar) = tui.sidebar.as_mut() {
        Sidebar {
            state: sidebar,
            conversations: directory.conversations(),
            profile: directory.profile(),
            loading: directory.is_listing(),
            palette: &palette,
        }
        .render(frame, overlay_area);
    }

    if let Some(popup) = &tui.popup {
        frame.render_widget(Dialog::for_popup(popup, &palette), area);
    } else {
        match directory.state() {
            MutationState::ConfirmPending(target) => {
                frame.render_widget(Dialog::confirm(target, &palette), area);
            }
            MutationState::Committing(target) => {
                frame.render_widget(Dialog::committing(target, &palette), area);
            }
            MutationState::Idle => {}
        }
    }

    if let Some(text) = toast {
        frame.render_widget(
            Toast {
                text: &text,
                palette: &palette,
            },
            main_area,
        );
    }
}
