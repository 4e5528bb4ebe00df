use std::fmt;

// === NoteStoreError ===

/// Errors returned by the remote note store client.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteStoreError {
    /// A required setting (the store API key) is not configured.
    ConfigMissing(String),
    /// The request never produced an HTTP response.
    NetworkFailure(String),
    /// The target note does not exist on the remote.
    NotFound(String),
    /// The remote rejected a create request.
    CreateFailed(String),
    /// The remote rejected an append request for a reason other than absence.
    AppendFailed(String),
    /// No note is open in the store host, or the redirect could not be read.
    NoActiveNote(String),
    /// The remote answered with a status or body shape the client does not understand.
    UnexpectedResponse(String),
}

impl fmt::Display for NoteStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteStoreError::ConfigMissing(msg) => write!(f, "Note store not configured: {}", msg),
            NoteStoreError::NetworkFailure(msg) => write!(f, "Note store unreachable: {}", msg),
            NoteStoreError::NotFound(path) => write!(f, "Note not found: {}", path),
            NoteStoreError::CreateFailed(msg) => write!(f, "Failed to create note: {}", msg),
            NoteStoreError::AppendFailed(msg) => write!(f, "Failed to append: {}", msg),
            NoteStoreError::NoActiveNote(msg) => {
                write!(f, "Could not determine active note path: {}", msg)
            }
            NoteStoreError::UnexpectedResponse(msg) => {
                write!(f, "Unexpected note store response: {}", msg)
            }
        }
    }
}

impl std::error::Error for NoteStoreError {}

// === SummaryError ===

/// Errors from the summarization service.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// No API key is configured for the summarizer.
    MissingApiKey,
    /// The request failed before a response arrived.
    Network(String),
    /// The service answered with a non-success status.
    Api { status: u16, body: String },
    /// The response body did not have the expected shape.
    MalformedResponse(String),
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryError::MissingApiKey => write!(f, "No Gemini API Key configured."),
            SummaryError::Network(msg) => write!(f, "Summary request failed: {}", msg),
            SummaryError::Api { status, body } => {
                write!(f, "Gemini API Error: {} {}", status, body)
            }
            SummaryError::MalformedResponse(msg) => {
                write!(f, "Malformed summary response: {}", msg)
            }
        }
    }
}

impl std::error::Error for SummaryError {}

// === StateError ===

/// Errors from the durable state tables (saved URLs, memo context).
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::DatabaseError(msg) => write!(f, "State database error: {}", msg),
        }
    }
}

impl std::error::Error for StateError {}

// === VisitError ===

/// Errors related to per-tab visit tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum VisitError {
    /// No tracked visit exists for the tab.
    UnknownTab(i64),
}

impl fmt::Display for VisitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitError::UnknownTab(id) => write!(f, "Tab is not tracked: {}", id),
        }
    }
}

impl std::error::Error for VisitError {}

// === ArchiveError ===

/// Errors that abort archiving a validated visit.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveError {
    /// Writing to the note store failed.
    Store(NoteStoreError),
    /// Reading or updating durable state failed.
    State(StateError),
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Store(e) => write!(f, "{}", e),
            ArchiveError::State(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<NoteStoreError> for ArchiveError {
    fn from(e: NoteStoreError) -> Self {
        ArchiveError::Store(e)
    }
}

impl From<StateError> for ArchiveError {
    fn from(e: StateError) -> Self {
        ArchiveError::State(e)
    }
}

// === MemoError ===

/// Errors related to sending a memo.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoError {
    /// The memo text was empty after trimming.
    EmptyMemo,
    /// Neither the request nor the active tab supplied a page URL.
    MissingContext,
    /// Writing to the note store failed.
    Store(NoteStoreError),
    /// Reading or updating the memo context failed.
    State(StateError),
}

impl fmt::Display for MemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoError::EmptyMemo => write!(f, "Memo is empty"),
            MemoError::MissingContext => write!(f, "No URL context found"),
            MemoError::Store(e) => write!(f, "{}", e),
            MemoError::State(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MemoError {}

impl From<NoteStoreError> for MemoError {
    fn from(e: NoteStoreError) -> Self {
        MemoError::Store(e)
    }
}

impl From<StateError> for MemoError {
    fn from(e: StateError) -> Self {
        MemoError::State(e)
    }
}

// === FocusError ===

/// Errors related to starting or stopping a focus session.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusError {
    /// The supplied note name was empty.
    EmptyName,
    /// The note store call failed.
    Store(NoteStoreError),
    /// Persisting the session to settings failed.
    Settings(SettingsError),
}

impl fmt::Display for FocusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusError::EmptyName => write!(f, "Please enter a file name"),
            FocusError::Store(e) => write!(f, "{}", e),
            FocusError::Settings(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FocusError {}

impl From<NoteStoreError> for FocusError {
    fn from(e: NoteStoreError) -> Self {
        FocusError::Store(e)
    }
}

impl From<SettingsError> for FocusError {
    fn from(e: SettingsError) -> Self {
        FocusError::Settings(e)
    }
}

// === SettingsError ===

/// Errors related to settings operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// File system I/O error.
    IoError(String),
    /// JSON serialization/deserialization error.
    SerializationError(String),
    /// The settings key does not exist.
    InvalidKey(String),
    /// The value is not valid for the given key.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
