use crate::api::NotesApi;
use crate::diary_entry::{DiaryEntry, EntryId};
use crate::diary_state::{DiaryState, Notification};
use crate::entry_form::{validate_input, EntryForm, FormError};
use crate::entry_item::EditSession;
use crate::text_input::TextInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(4);
pub const CURSOR_BLINK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
}

/// Work that needs the server. Everything else is handled inside `App`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    SaveEdit { id: EntryId, content: String },
    ToggleStatus(EntryId),
    Delete(EntryId),
    Reload,
    Quit,
}

impl Action {
    pub fn pending_label(&self) -> Option<&'static str> {
        match self {
            Action::Submit(_) => Some("Saving entry..."),
            Action::SaveEdit { .. } => Some("Updating entry..."),
            Action::ToggleStatus(_) => Some("Updating status..."),
            Action::Delete(_) => Some("Deleting entry..."),
            Action::Reload => Some("Loading entries..."),
            Action::Quit => None,
        }
    }
}

pub struct App {
    pub diary: DiaryState,
    pub form: EntryForm,
    focus: Focus,
    selected: usize,
    editing: Option<EditSession>,
    toasts: VecDeque<Notification>,
    toast_since: Option<Instant>,
    pending: Option<&'static str>,
    cursor_visible: bool,
    last_blink: Instant,
    running: bool,
}

impl App {
    pub fn new() -> Self {
        App::with_state(DiaryState::new())
    }

    pub fn with_state(diary: DiaryState) -> Self {
        App {
            diary,
            form: EntryForm::new(),
            focus: Focus::Form,
            selected: 0,
            editing: None,
            toasts: VecDeque::new(),
            toast_since: None,
            pending: None,
            cursor_visible: true,
            last_blink: Instant::now(),
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&DiaryEntry> {
        self.diary.get_entries().get(self.selected)
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn pending(&self) -> Option<&'static str> {
        self.pending
    }

    pub fn set_pending(&mut self, label: Option<&'static str>) {
        self.pending = label;
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn current_toast(&self) -> Option<&Notification> {
        self.toasts.front()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        // Held keys only auto-repeat while typing into a text box.
        let typing = self.editing.is_some() || self.focus == Focus::Form;
        match key.kind {
            KeyEventKind::Press => {}
            KeyEventKind::Repeat if typing => {}
            _ => return None,
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        self.cursor_visible = true;

        if self.editing.is_some() {
            return self.handle_edit_key(key, ctrl);
        }
        match self.focus {
            Focus::Form => self.handle_form_key(key, ctrl),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::List;
                None
            }
            KeyCode::Char('s') if ctrl => match self.form.validate() {
                Ok(content) => Some(Action::Submit(content)),
                Err(err) => {
                    self.reject(err);
                    None
                }
            },
            _ => {
                edit_text(&mut self.form.input, key, ctrl);
                None
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::Char('w') => {
                self.focus = Focus::Form;
                None
            }
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.diary.get_entries().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                self.selected_entry().map(|e| Action::ToggleStatus(e.id))
            }
            KeyCode::Char('d') => self.selected_entry().map(|e| Action::Delete(e.id)),
            KeyCode::Char('e') | KeyCode::Enter => {
                // Completed entries stay read-only; the key is ignored.
                self.editing = self.selected_entry().and_then(EditSession::begin);
                None
            }
            _ => None,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<Action> {
        let session = self.editing.as_mut()?;
        match key.code {
            KeyCode::Esc => {
                self.editing = None;
                None
            }
            KeyCode::Char('s') if ctrl => {
                let id = session.id;
                if !session.is_modified() {
                    self.editing = None;
                    return None;
                }
                match validate_input(&session.input) {
                    Ok(content) => Some(Action::SaveEdit { id, content }),
                    Err(err) => {
                        self.reject(err);
                        None
                    }
                }
            }
            _ => {
                edit_text(&mut session.input, key, ctrl);
                None
            }
        }
    }

    fn reject(&mut self, err: FormError) {
        tracing::debug!(error = %err, "input rejected");
        self.diary
            .notify(Notification::error(err.title(), err.to_string()));
    }

    /// Runs a server-bound action and reconciles the view with its outcome.
    pub async fn perform(&mut self, api: &dyn NotesApi, action: Action) {
        match action {
            Action::Submit(content) => {
                if self.diary.add_entry(api, &content).await {
                    self.form.clear();
                    self.selected = 0;
                }
            }
            Action::SaveEdit { id, content } => {
                if self.diary.update_content(api, id, &content).await {
                    self.editing = None;
                }
            }
            Action::ToggleStatus(id) => {
                self.diary.toggle_status(api, id).await;
            }
            Action::Delete(id) => {
                self.diary.delete_entry(api, id).await;
            }
            Action::Reload => {
                self.diary.load(api).await;
            }
            Action::Quit => self.running = false,
        }
        self.pending = None;
        self.reconcile_view();
    }

    fn reconcile_view(&mut self) {
        let len = self.diary.get_entries().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        if let Some(session) = &self.editing {
            if self.diary.get(session.id).is_none() {
                self.editing = None;
            }
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.toasts.extend(self.diary.take_notifications());
        let shown_since = self.toast_since;
        match shown_since {
            Some(since) if now.duration_since(since) >= TOAST_TTL => {
                self.toasts.pop_front();
                self.toast_since = if self.toasts.is_empty() {
                    None
                } else {
                    Some(now)
                };
            }
            None if !self.toasts.is_empty() => self.toast_since = Some(now),
            _ => {}
        }

        if now.duration_since(self.last_blink) >= CURSOR_BLINK {
            self.cursor_visible = !self.cursor_visible;
            self.last_blink = now;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

fn edit_text(input: &mut TextInput, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char(c) if !ctrl => input.insert(c),
        KeyCode::Enter => input.newline(),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Up => input.move_up(),
        KeyCode::Down => input.move_down(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}
