use crate::api::{ApiError, ApiResult, NotesApi, Operation};
use crate::diary_entry::{DiaryEntry, EntryId, EntryStatus};
use futures::future::BoxFuture;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory stand-in for the notes backend.
#[derive(Default)]
pub struct MemoryNotesApi {
    notes: Mutex<Vec<DiaryEntry>>,
    next_id: AtomicUsize,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryNotesApi {
    pub fn with_notes(notes: Vec<DiaryEntry>) -> Self {
        let next_id = notes.iter().map(|n| n.id).max().unwrap_or(0) as usize;
        MemoryNotesApi {
            notes: Mutex::new(notes),
            next_id: AtomicUsize::new(next_id),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<DiaryEntry> {
        self.notes.lock().unwrap().clone()
    }

    fn check(&self, operation: Operation) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                operation,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: Some("database unavailable".to_string()),
            });
        }
        Ok(())
    }

    fn not_found(operation: Operation) -> ApiError {
        ApiError::Status {
            operation,
            status: StatusCode::NOT_FOUND,
            detail: Some("Note not found".to_string()),
        }
    }
}

pub fn note(id: EntryId, content: &str, status: EntryStatus) -> DiaryEntry {
    DiaryEntry {
        id,
        created_at: "2025-03-03".to_string(),
        content: content.to_string(),
        status,
    }
}

impl NotesApi for MemoryNotesApi {
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<DiaryEntry>>> {
        Box::pin(async move {
            self.check(Operation::Fetch)?;
            Ok(self.stored())
        })
    }

    fn create<'a>(&'a self, content: &'a str) -> BoxFuture<'a, ApiResult<DiaryEntry>> {
        Box::pin(async move {
            self.check(Operation::Create)?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as EntryId + 1;
            let created = note(id, content, EntryStatus::Active);
            self.notes.lock().unwrap().push(created.clone());
            Ok(created)
        })
    }

    fn update<'a>(
        &'a self,
        id: EntryId,
        content: &'a str,
        status: EntryStatus,
    ) -> BoxFuture<'a, ApiResult<DiaryEntry>> {
        Box::pin(async move {
            self.check(Operation::Update)?;
            let mut notes = self.notes.lock().unwrap();
            let stored = notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| Self::not_found(Operation::Update))?;
            stored.content = content.to_string();
            stored.status = status;
            Ok(stored.clone())
        })
    }

    fn delete(&self, id: EntryId) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(async move {
            self.check(Operation::Delete)?;
            let mut notes = self.notes.lock().unwrap();
            let before = notes.len();
            notes.retain(|n| n.id != id);
            if notes.len() == before {
                return Err(Self::not_found(Operation::Delete));
            }
            Ok(())
        })
    }
}
