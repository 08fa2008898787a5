use crate::api::NotesApi;
use crate::diary_entry::{DiaryEntry, EntryId};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// The entry collection as last confirmed by the server, plus the
/// notifications raised while keeping it in sync.
///
/// Every mutating call goes to the API first and only touches the local list
/// once the server has answered. On failure the list is left alone and a
/// single error notification is queued. The `bool` results report whether the
/// server accepted the change.
#[derive(Debug, Default)]
pub struct DiaryState {
    entries: Vec<DiaryEntry>,
    notifications: VecDeque<Notification>,
}

impl DiaryState {
    pub fn new() -> Self {
        DiaryState::default()
    }

    pub fn with_entries(entries: Vec<DiaryEntry>) -> Self {
        DiaryState {
            entries,
            notifications: VecDeque::new(),
        }
    }

    pub fn get_entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub async fn load(&mut self, api: &dyn NotesApi) -> bool {
        match api.list().await {
            Ok(entries) => {
                tracing::info!(count = entries.len(), "loaded entries");
                self.entries = entries;
                true
            }
            Err(err) => {
                self.report_failure(err);
                false
            }
        }
    }

    pub async fn add_entry(&mut self, api: &dyn NotesApi, content: &str) -> bool {
        match api.create(content).await {
            Ok(entry) => {
                tracing::info!(id = entry.id, "entry created");
                self.entries.insert(0, entry);
                self.notify(Notification::info(
                    "Entry added",
                    "Your diary entry has been saved.",
                ));
                true
            }
            Err(err) => {
                self.report_failure(err);
                false
            }
        }
    }

    pub async fn update_content(
        &mut self,
        api: &dyn NotesApi,
        id: EntryId,
        content: &str,
    ) -> bool {
        let Some(current) = self.get(id) else {
            tracing::debug!(id, "update for unknown entry ignored");
            return false;
        };
        let status = current.status;
        match api.update(id, content, status).await {
            Ok(updated) => {
                tracing::info!(id, "entry updated");
                self.replace(updated);
                self.notify(Notification::info(
                    "Entry updated",
                    "Your diary entry has been updated.",
                ));
                true
            }
            Err(err) => {
                self.report_failure(err);
                false
            }
        }
    }

    pub async fn toggle_status(&mut self, api: &dyn NotesApi, id: EntryId) -> bool {
        let Some(current) = self.get(id) else {
            tracing::debug!(id, "toggle for unknown entry ignored");
            return false;
        };
        let content = current.content.clone();
        let status = current.status.toggled();
        match api.update(id, &content, status).await {
            Ok(updated) => {
                tracing::info!(id, status = %updated.status, "entry status changed");
                self.replace(updated);
                true
            }
            Err(err) => {
                self.report_failure(err);
                false
            }
        }
    }

    pub async fn delete_entry(&mut self, api: &dyn NotesApi, id: EntryId) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(id, "delete for unknown entry ignored");
            return false;
        }
        match api.delete(id).await {
            Ok(()) => {
                tracing::info!(id, "entry deleted");
                self.entries.retain(|e| e.id != id);
                self.notify(Notification::info(
                    "Entry deleted",
                    "Your diary entry has been removed.",
                ));
                true
            }
            Err(err) => {
                self.report_failure(err);
                false
            }
        }
    }

    fn replace(&mut self, updated: DiaryEntry) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == updated.id) {
            *entry = updated;
        }
    }

    fn report_failure(&mut self, err: impl std::error::Error) {
        tracing::warn!(error = %err, "request failed");
        self.notify(Notification::error("Error", err.to_string()));
    }
}
