// Conversation data model, backend wire types, and the messages exchanged
// between the session loop and the terminal view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the chat transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Message {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

/// A completed question/answer turn, replayed to the backend as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
}

/// Tells the backend whether a chat request opens the conversation or
/// continues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptClass {
    /// Opening turn: rank the retrieved resumes against the job requirement.
    RetrieveApplicantJd,
    /// Any later turn: answer with the chat history as context.
    FollowUp,
}

impl PromptClass {
    /// Opening class iff no turn has completed yet.
    pub fn for_history(history: &[HistoryEntry]) -> Self {
        if history.is_empty() {
            PromptClass::RetrieveApplicantJd
        } else {
            PromptClass::FollowUp
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromptClass::RetrieveApplicantJd => "retrieve_applicant_jd",
            PromptClass::FollowUp => "follow_up",
        }
    }
}

// ---------------------------------------------------------------------------
// Backend wire types
// ---------------------------------------------------------------------------

/// Body of `POST /generate/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub docs: Vec<String>,
    pub subquestions: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub prompt_cls: PromptClass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Body of `POST /generate_subquestions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubquestionsRequest {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubquestionsResponse {
    pub subquestions: Vec<String>,
}

/// Body of `POST /retrieve_resumes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumesRequest {
    pub subquestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumesResponse {
    pub resumes: Vec<String>,
}

/// Split the editable sub-question blob into the list sent to the backend.
///
/// Deliberately stricter than a plain `split('\n')`: blank lines are dropped,
/// so the backend never receives an empty question, and a trailing `\r` is
/// stripped from each line.
pub fn split_subquestions(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`split_subquestions`] for freshly generated questions.
pub fn join_subquestions(subquestions: &[String]) -> String {
    subquestions.join("\n")
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Editing state of a generated sub-question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Open for edits.
    Editable,
    /// Edits are refused until unlocked.
    Locked,
    /// Posted to the transcript; the editor is closed.
    Submitted,
}

/// Where the conversation is, derived from the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    SubquestionsPending,
    SubquestionsEditable,
    SubquestionsLocked,
    SubquestionsSubmitted,
    ResumesRetrieved,
    Chatting,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Enter a job description",
            Phase::SubquestionsPending => "Generating sub-questions",
            Phase::SubquestionsEditable => "Sub-questions editable",
            Phase::SubquestionsLocked => "Sub-questions locked",
            Phase::SubquestionsSubmitted => "Sub-questions submitted",
            Phase::ResumesRetrieved => "Resumes retrieved",
            Phase::Chatting => "Chatting",
        }
    }
}

/// The user action an error can be retried with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryAction {
    GenerateSubquestions,
    RetrieveResumes,
    /// Re-send the question whose reply failed.
    SendChat(String),
}

// ---------------------------------------------------------------------------
// Channel messages
// ---------------------------------------------------------------------------

/// Editable text buffers owned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    JobDescription,
    Subquestions,
    Input,
}

/// A single key-level edit applied to a [`TextField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Newline,
    Backspace,
    Clear,
}

/// Commands sent from the view to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Edit { field: TextField, edit: TextEdit },
    SubmitJobDescription,
    ToggleLock,
    SubmitSubquestions,
    RetrieveResumes,
    /// Send the chat input buffer.
    SendInput,
    ClearError,
    Retry,
    ClearChat,
    Quit,
}

/// Completion of a spawned backend call.
///
/// `generation` is the per-category counter value at dispatch time; the
/// session drops any event that is not from the latest dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiEvent {
    Subquestions {
        generation: u64,
        result: Result<Vec<String>, ApiError>,
    },
    Resumes {
        generation: u64,
        result: Result<Vec<String>, ApiError>,
    },
    ChatReply {
        generation: u64,
        result: Result<String, ApiError>,
    },
}

impl ApiEvent {
    pub fn generation(&self) -> u64 {
        match self {
            ApiEvent::Subquestions { generation, .. }
            | ApiEvent::Resumes { generation, .. }
            | ApiEvent::ChatReply { generation, .. } => *generation,
        }
    }
}

/// Updates pushed from the session loop to the view.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<SessionSnapshot>),
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubquestionsView {
    pub text: String,
    pub mode: EditMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
    pub retry: Option<RetryAction>,
}

/// Read-only copy of everything the view renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub messages: Vec<Message>,
    pub input: String,
    pub job_description: String,
    pub subquestions: Option<SubquestionsView>,
    pub subquestions_pending: bool,
    pub resumes: Vec<String>,
    pub retrieving_resumes: bool,
    /// A chat reply is in flight.
    pub loading: bool,
    pub error: Option<ErrorBanner>,
    pub history_len: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
