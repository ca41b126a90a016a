use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ecospotter_core::Vote;

use crate::app::{App, FormField, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_tasks().await;
        }
    }
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    app.status = None;

    // Global keys that work on every screen
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.next_screen();
            return;
        }
        KeyCode::BackTab => {
            app.prev_screen();
            return;
        }
        _ => {}
    }

    match app.screen {
        Screen::Trees => handle_trees(app, key).await,
        Screen::Submit => handle_submit(app, key, ctrl).await,
        Screen::Community => handle_community(app, key),
        Screen::Chat => handle_chat(app, key),
        Screen::Profile => handle_profile(app, key),
    }
}

async fn handle_trees(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.select_next_tree(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_tree(),
        KeyCode::Char('m') => app.toggle_mine_only().await,
        KeyCode::Char('L') => app.toggle_login().await,
        KeyCode::Char('p') => app.open_submitter_profile().await,
        KeyCode::Char('P') => app.open_own_profile().await,
        KeyCode::Char('a') => app.switch_to(Screen::Chat),
        _ => {}
    }
}

async fn handle_submit(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char('a') if ctrl => app.request_assist(),
        KeyCode::Char('s') if ctrl => app.submit_form().await,
        KeyCode::Esc => app.switch_to(Screen::Trees),
        KeyCode::Down => app.next_field(),
        KeyCode::Up => app.prev_field(),
        KeyCode::Enter => {
            if app.form_field == FormField::Photo {
                app.load_photo();
            }
            app.next_field();
        }
        KeyCode::Backspace => app.field_backspace(),
        KeyCode::Char(c) if !ctrl => app.field_input(c),
        _ => {}
    }
}

fn handle_community(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.select_next_submission(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_submission(),
        KeyCode::Char('u') | KeyCode::Char('+') => app.vote_selected(Vote::Up),
        KeyCode::Char('d') | KeyCode::Char('-') => app.vote_selected(Vote::Down),
        KeyCode::Char('a') => app.switch_to(Screen::Chat),
        _ => {}
    }
}

fn handle_profile(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc => app.switch_to(Screen::Trees),
        KeyCode::Char('j') | KeyCode::Down => app.select_next_profile_tree(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_profile_tree(),
        KeyCode::Char('c') => app.comment_on_selected(),
        KeyCode::Char('r') => app.report_selected(),
        KeyCode::Char('a') => app.switch_to(Screen::Chat),
        _ => {}
    }
}

fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.switch_to(app.origin),
        // Ignored while a reply is pending; the conversation refuses the send.
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => {
            app.conversation.input_mut().pop();
        }
        KeyCode::PageUp => app.chat_scroll = app.chat_scroll.saturating_sub(5),
        KeyCode::PageDown => app.chat_scroll = app.chat_scroll.saturating_add(5),
        KeyCode::Char(c) => app.conversation.input_mut().push(c),
        _ => {}
    }
}
