use crate::diary_entry::{DiaryEntry, EntryId, EntryPayload, EntryStatus};
use futures::future::BoxFuture;
use reqwest::{Client, Response, StatusCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::Fetch => "Failed to fetch notes",
            Operation::Create => "Failed to create note",
            Operation::Update => "Failed to update note",
            Operation::Delete => "Failed to delete note",
        };
        f.write_str(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{operation}: {source}")]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: {status}{}", detail_suffix(.detail))]
    Status {
        operation: Operation,
        status: StatusCode,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ApiError::Client(_) => None,
            ApiError::Transport { operation, .. } | ApiError::Status { operation, .. } => {
                Some(*operation)
            }
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The notes resource as seen by the client.
pub trait NotesApi: Send + Sync {
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<DiaryEntry>>>;

    fn create<'a>(&'a self, content: &'a str) -> BoxFuture<'a, ApiResult<DiaryEntry>>;

    fn update<'a>(
        &'a self,
        id: EntryId,
        content: &'a str,
        status: EntryStatus,
    ) -> BoxFuture<'a, ApiResult<DiaryEntry>>;

    fn delete(&self, id: EntryId) -> BoxFuture<'_, ApiResult<()>>;
}

pub struct HttpNotesApi {
    base_url: String,
    http: Client,
}

impl HttpNotesApi {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let http = Client::builder().build().map_err(ApiError::Client)?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: &str, http: Client) -> Self {
        HttpNotesApi {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn notes_url(&self) -> String {
        format!("{}/notes/", self.base_url)
    }

    fn note_url(&self, id: EntryId) -> String {
        format!("{}/notes/{}", self.base_url, id)
    }

    async fn fetch_all(&self) -> ApiResult<Vec<DiaryEntry>> {
        let operation = Operation::Fetch;
        tracing::debug!(url = %self.notes_url(), "listing notes");
        let resp = self
            .http
            .get(self.notes_url())
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        let resp = ensure_success(resp, operation).await?;
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        Ok(decode_notes(rows))
    }

    async fn post_note(&self, content: &str) -> ApiResult<DiaryEntry> {
        let operation = Operation::Create;
        tracing::debug!(url = %self.notes_url(), "creating note");
        let resp = self
            .http
            .post(self.notes_url())
            .json(&EntryPayload::new(content, EntryStatus::Active))
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        let resp = ensure_success(resp, operation).await?;
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        Ok(decode_notes(rows))
    }

    async fn put_note(
        &self,
        id: EntryId,
        content: &str,
        status: EntryStatus,
    ) -> ApiResult<DiaryEntry> {
        let operation = Operation::Update;
        tracing::debug!(url = %self.note_url(id), %status, "updating note");
        let resp = self
            .http
            .put(self.note_url(id))
            .json(&EntryPayload::new(content, status))
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        let resp = ensure_success(resp, operation).await?;
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        Ok(decode_notes(rows))
    }

    async fn delete_note(&self, id: EntryId) -> ApiResult<()> {
        let operation = Operation::Delete;
        tracing::debug!(url = %self.note_url(id), "deleting note");
        let resp = self
            .http
            .delete(self.note_url(id))
            .send()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        ensure_success(resp, operation).await?;
        Ok(())
    }
}

impl NotesApi for HttpNotesApi {
    fn list(&self) -> BoxFuture<'_, ApiResult<Vec<DiaryEntry>>> {
        Box::pin(self.fetch_all())
    }

    fn create<'a>(&'a self, content: &'a str) -> BoxFuture<'a, ApiResult<DiaryEntry>> {
        Box::pin(self.post_note(content))
    }

    fn update<'a>(
        &'a self,
        id: EntryId,
        content: &'a str,
        status: EntryStatus,
    ) -> BoxFuture<'a, ApiResult<DiaryEntry>> {
        Box::pin(self.put_note(id, content, status))
    }

    fn delete(&self, id: EntryId) -> BoxFuture<'_, ApiResult<()>> {
        Box::pin(self.delete_note(id))
    }
}

async fn ensure_success(resp: Response, operation: Operation) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(%status, %body, "request rejected");
    Err(ApiError::Status {
        operation,
        status,
        detail: error_detail(&body),
    })
}

/// Decodes a listing row by row. A row this client cannot read is logged and
/// left out instead of failing the whole listing.
fn decode_notes(rows: Vec<serde_json::Value>) -> Vec<DiaryEntry> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<DiaryEntry>(row.clone()) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, %row, "skipping unreadable note");
                None
            }
        })
        .collect()
}

/// Pulls the message out of a `{"detail": ...}` error body. Validation
/// failures carry a list of objects with a `msg` field instead of a string.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
