use crate::text_input::TextInput;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please write something in your diary entry.")]
    Empty,
}

impl FormError {
    pub fn title(&self) -> &'static str {
        match self {
            FormError::Empty => "Empty entry",
        }
    }
}

/// Rejects blank text, otherwise hands it back untouched.
pub fn validate_input(input: &TextInput) -> Result<String, FormError> {
    if input.is_blank() {
        return Err(FormError::Empty);
    }
    Ok(input.content().to_string())
}

#[derive(Debug, Clone, Default)]
pub struct EntryForm {
    pub input: TextInput,
}

impl EntryForm {
    pub fn new() -> Self {
        EntryForm::default()
    }

    pub fn validate(&self) -> Result<String, FormError> {
        validate_input(&self.input)
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.input.content().is_empty()
    }
}
