use crate::diary_entry::{DiaryEntry, EntryId};
use crate::text_input::TextInput;

pub fn can_edit(entry: &DiaryEntry) -> bool {
    !entry.is_completed()
}

/// An entry switched into edit mode. Only one exists at a time.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub id: EntryId,
    pub input: TextInput,
    original: String,
}

impl EditSession {
    /// Returns `None` for completed entries, which are read-only.
    pub fn begin(entry: &DiaryEntry) -> Option<Self> {
        if !can_edit(entry) {
            return None;
        }
        Some(EditSession {
            id: entry.id,
            input: TextInput::with_content(entry.content.clone()),
            original: entry.content.clone(),
        })
    }

    pub fn is_modified(&self) -> bool {
        self.input.content() != self.original
    }
}
