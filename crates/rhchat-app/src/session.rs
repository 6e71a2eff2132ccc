// Conversation state machine.
//
// `Session` owns every piece of mutable chat state: the transcript, the
// question/answer history, the job description and chat input buffers, the
// sub-question lifecycle, retrieved resumes and the single error slot. All
// transitions are synchronous; the three backend calls are spawned as tokio
// tasks that report back through `ApiEvent`s, which the owner feeds into
// `handle_api_event`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rhchat_api::ChatBackend;
use rhchat_core::config::ChatConfig;
use rhchat_core::error::ChatError;
use rhchat_core::protocol::{
    join_subquestions, split_subquestions, ApiEvent, ChatRequest, EditMode, ErrorBanner,
    HistoryEntry, Message, Phase, PromptClass, RetryAction, SessionSnapshot, SubquestionsView,
    TextEdit, TextField,
};

// ---------------------------------------------------------------------------
// Sub-question lifecycle
// ---------------------------------------------------------------------------

/// A generated sub-question set and its editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquestions {
    /// Newline-delimited questions.
    pub text: String,
    pub mode: EditMode,
}

/// Sub-question lifecycle as a single tagged value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubquestionStage {
    /// Nothing generated yet.
    #[default]
    Absent,
    /// Generation in flight. A set from an earlier generation stays usable
    /// until the new one lands.
    Pending { previous: Option<Subquestions> },
    Ready(Subquestions),
}

impl SubquestionStage {
    /// The set currently shown to the user, if any.
    pub fn current(&self) -> Option<&Subquestions> {
        match self {
            SubquestionStage::Absent => None,
            SubquestionStage::Pending { previous } => previous.as_ref(),
            SubquestionStage::Ready(set) => Some(set),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubquestionStage::Pending { .. })
    }
}

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Monotonic dispatch counters, one per request category.
#[derive(Debug, Default)]
struct Generations {
    subquestions: u64,
    resumes: u64,
    chat: u64,
}

/// The chat request currently awaiting a reply.
#[derive(Debug)]
struct PendingChat {
    generation: u64,
    question: String,
}

#[derive(Debug)]
struct ErrorSlot {
    error: ChatError,
    retry: Option<RetryAction>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    chat_config: ChatConfig,
    backend: Arc<dyn ChatBackend>,
    /// Spawned requests report back through clones of this sender.
    api_tx: mpsc::Sender<ApiEvent>,

    messages: Vec<Message>,
    history: Vec<HistoryEntry>,
    job_description: String,
    input: String,
    stage: SubquestionStage,
    resumes: Vec<String>,

    resumes_pending: Option<u64>,
    chat_pending: Option<PendingChat>,
    generations: Generations,
    error: Option<ErrorSlot>,
}

impl Session {
    pub fn new(
        chat_config: ChatConfig,
        backend: Arc<dyn ChatBackend>,
        api_tx: mpsc::Sender<ApiEvent>,
    ) -> Self {
        Session {
            chat_config,
            backend,
            api_tx,
            messages: Vec::new(),
            history: Vec::new(),
            job_description: String::new(),
            input: String::new(),
            stage: SubquestionStage::Absent,
            resumes: Vec::new(),
            resumes_pending: None,
            chat_pending: None,
            generations: Generations::default(),
            error: None,
        }
    }

    // -- Read access --

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn stage(&self) -> &SubquestionStage {
        &self.stage
    }

    /// Text of the visible sub-question set, empty when there is none.
    pub fn subquestion_text(&self) -> &str {
        self.stage.current().map_or("", |set| set.text.as_str())
    }

    pub fn resumes(&self) -> &[String] {
        &self.resumes
    }

    pub fn error(&self) -> Option<&ChatError> {
        self.error.as_ref().map(|slot| &slot.error)
    }

    pub fn retry_action(&self) -> Option<&RetryAction> {
        self.error.as_ref().and_then(|slot| slot.retry.as_ref())
    }

    /// A chat reply is in flight.
    pub fn is_loading(&self) -> bool {
        self.chat_pending.is_some()
    }

    pub fn is_retrieving_resumes(&self) -> bool {
        self.resumes_pending.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.stage.is_pending() {
            return Phase::SubquestionsPending;
        }
        if !self.history.is_empty() || self.chat_pending.is_some() {
            return Phase::Chatting;
        }
        if !self.resumes.is_empty() {
            return Phase::ResumesRetrieved;
        }
        match &self.stage {
            SubquestionStage::Ready(set) => match set.mode {
                EditMode::Editable => Phase::SubquestionsEditable,
                EditMode::Locked => Phase::SubquestionsLocked,
                EditMode::Submitted => Phase::SubquestionsSubmitted,
            },
            _ => Phase::Idle,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            messages: self.messages.clone(),
            input: self.input.clone(),
            job_description: self.job_description.clone(),
            subquestions: self.stage.current().map(|set| SubquestionsView {
                text: set.text.clone(),
                mode: set.mode,
            }),
            subquestions_pending: self.stage.is_pending(),
            resumes: self.resumes.clone(),
            retrieving_resumes: self.is_retrieving_resumes(),
            loading: self.is_loading(),
            error: self.error.as_ref().map(|slot| ErrorBanner {
                message: slot.error.to_string(),
                retry: slot.retry.clone(),
            }),
            history_len: self.history.len(),
        }
    }

    // -- Buffers --

    #[cfg(test)]
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    /// Replace the chat input, truncated to the maximum message length.
    #[cfg(test)]
    pub fn set_input(&mut self, text: impl Into<String>) {
        let text: String = text.into();
        self.input = text.chars().take(self.chat_config.max_message_length).collect();
    }

    /// Apply a key-level edit to one of the session's text buffers.
    ///
    /// Sub-question edits go through [`Session::edit_subquestions`] and are
    /// dropped unless the set is open for editing. The chat input is single
    /// line and capped at the maximum message length.
    pub fn apply_edit(&mut self, field: TextField, edit: TextEdit) {
        match field {
            TextField::JobDescription => {
                apply_text_edit(&mut self.job_description, edit, None, true);
            }
            TextField::Input => {
                let limit = self.chat_config.max_message_length;
                apply_text_edit(&mut self.input, edit, Some(limit), false);
            }
            TextField::Subquestions => {
                let SubquestionStage::Ready(set) = &self.stage else {
                    debug!("sub-question edit ignored: no editable set");
                    return;
                };
                let mut text = set.text.clone();
                apply_text_edit(&mut text, edit, None, true);
                self.edit_subquestions(text);
            }
        }
    }

    // -- Operations --

    /// Request sub-questions for the job description buffer.
    ///
    /// On completion the joined questions become an editable, unlocked set.
    pub fn submit_job_description(&mut self) -> Result<(), ChatError> {
        if self.job_description.trim().is_empty() {
            return Err(self.reject("Please enter a job description first."));
        }
        self.error = None;

        let previous = match std::mem::take(&mut self.stage) {
            SubquestionStage::Absent => None,
            SubquestionStage::Pending { previous } => previous,
            SubquestionStage::Ready(set) => Some(set),
        };
        self.stage = SubquestionStage::Pending { previous };

        self.generations.subquestions += 1;
        let generation = self.generations.subquestions;
        let description = self.job_description.clone();
        let backend = Arc::clone(&self.backend);
        let tx = self.api_tx.clone();

        tokio::spawn(async move {
            let result = backend.generate_subquestions(&description).await;
            let _ = tx.send(ApiEvent::Subquestions { generation, result }).await;
        });

        info!("Requested sub-questions (gen: {})", generation);
        Ok(())
    }

    /// Flip between editable and locked. Does nothing in any other state.
    pub fn toggle_lock(&mut self) {
        if let SubquestionStage::Ready(set) = &mut self.stage {
            set.mode = match set.mode {
                EditMode::Editable => EditMode::Locked,
                EditMode::Locked => EditMode::Editable,
                EditMode::Submitted => EditMode::Submitted,
            };
            debug!("Sub-question mode now {:?}", set.mode);
        }
    }

    /// Replace the sub-question text. Silently ignored unless the set is
    /// editable (locked or submitted sets are left untouched).
    pub fn edit_subquestions(&mut self, text: impl Into<String>) {
        match &mut self.stage {
            SubquestionStage::Ready(set) if set.mode == EditMode::Editable => {
                set.text = text.into();
            }
            _ => debug!("sub-question edit ignored: set is not editable"),
        }
    }

    /// Post the edited sub-questions to the transcript and close the editor.
    /// No-op when the text is blank or the editor is already closed.
    pub fn submit_edited_subquestions(&mut self) {
        let SubquestionStage::Ready(set) = &mut self.stage else {
            return;
        };
        if set.mode == EditMode::Submitted || set.text.trim().is_empty() {
            return;
        }
        self.messages
            .push(Message::user(format!("Sub-questions: {}", set.text)));
        set.mode = EditMode::Submitted;
        info!("Sub-questions submitted");
    }

    /// Fetch resumes matching the current sub-questions. The result replaces
    /// any previously retrieved list.
    pub fn retrieve_resumes(&mut self) -> Result<(), ChatError> {
        let subquestions = split_subquestions(self.subquestion_text());
        if subquestions.is_empty() {
            return Err(self.reject("Please generate sub-questions first."));
        }
        self.error = None;

        self.generations.resumes += 1;
        let generation = self.generations.resumes;
        self.resumes_pending = Some(generation);
        let backend = Arc::clone(&self.backend);
        let tx = self.api_tx.clone();
        let count = subquestions.len();

        tokio::spawn(async move {
            let result = backend.retrieve_resumes(&subquestions).await;
            let _ = tx.send(ApiEvent::Resumes { generation, result }).await;
        });

        info!("Requested resumes for {} sub-questions (gen: {})", count, generation);
        Ok(())
    }

    /// Send a chat question.
    ///
    /// The user message is appended before the request leaves and is kept
    /// even if the request fails.
    pub fn send_chat_message(&mut self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            return Err(self.reject("Please enter a message."));
        }
        if self.chat_pending.is_some() {
            return Err(self.reject("Please wait for the current reply."));
        }
        let limit = self.chat_config.max_message_length;
        if text.chars().count() > limit {
            return Err(self.reject(&format!("Messages are limited to {limit} characters.")));
        }

        self.messages.push(Message::user(text));
        self.error = None;

        let request = ChatRequest {
            question: text.to_string(),
            docs: self.resumes.clone(),
            subquestions: split_subquestions(self.subquestion_text()),
            history: self.history.clone(),
            prompt_cls: PromptClass::for_history(&self.history),
        };

        self.generations.chat += 1;
        let generation = self.generations.chat;
        self.chat_pending = Some(PendingChat {
            generation,
            question: text.to_string(),
        });

        let backend = Arc::clone(&self.backend);
        let tx = self.api_tx.clone();
        let prompt_cls = request.prompt_cls;

        tokio::spawn(async move {
            let result = backend.generate_response(&request).await;
            let _ = tx.send(ApiEvent::ChatReply { generation, result }).await;
        });

        info!(
            "Sent chat question (prompt_cls: {}, gen: {})",
            prompt_cls.as_str(),
            generation
        );
        Ok(())
    }

    /// Send the input buffer, clearing it once the message is accepted.
    pub fn submit_input(&mut self) -> Result<(), ChatError> {
        let text = self.input.clone();
        self.send_chat_message(&text)?;
        self.input.clear();
        Ok(())
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Reset the chat: transcript, history, resumes and error. The job
    /// description and sub-questions survive. Replies and resume lists still
    /// in flight are orphaned so they cannot repopulate the cleared session.
    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.history.clear();
        self.resumes.clear();
        self.error = None;
        self.chat_pending = None;
        self.resumes_pending = None;
        info!("Chat cleared");
    }

    /// Re-run the action recorded with the current error, if any.
    pub fn retry(&mut self) -> Result<(), ChatError> {
        let Some(action) = self.retry_action().cloned() else {
            return Ok(());
        };
        info!("Retrying {:?}", action);
        match action {
            RetryAction::GenerateSubquestions => self.submit_job_description(),
            RetryAction::RetrieveResumes => self.retrieve_resumes(),
            RetryAction::SendChat(question) => self.send_chat_message(&question),
        }
    }

    // -- API completions --

    /// Apply a completed backend call.
    ///
    /// Returns `false` when the event is stale (not from the latest dispatch
    /// of its category, or orphaned by `clear_chat`) and was dropped.
    pub fn handle_api_event(&mut self, event: ApiEvent) -> bool {
        match event {
            ApiEvent::Subquestions { generation, result } => {
                if generation != self.generations.subquestions || !self.stage.is_pending() {
                    debug!("Discarding stale sub-questions (gen: {})", generation);
                    return false;
                }
                let previous = match std::mem::take(&mut self.stage) {
                    SubquestionStage::Pending { previous } => previous,
                    other => {
                        self.stage = other;
                        return false;
                    }
                };
                match result {
                    Ok(subquestions) => {
                        info!("Received {} sub-questions", subquestions.len());
                        self.stage = SubquestionStage::Ready(Subquestions {
                            text: join_subquestions(&subquestions),
                            mode: EditMode::Editable,
                        });
                    }
                    Err(e) => {
                        self.stage = previous.map_or(SubquestionStage::Absent, SubquestionStage::Ready);
                        self.fail(e.into(), Some(RetryAction::GenerateSubquestions));
                    }
                }
                true
            }
            ApiEvent::Resumes { generation, result } => {
                if self.resumes_pending != Some(generation) {
                    debug!("Discarding stale resumes (gen: {})", generation);
                    return false;
                }
                self.resumes_pending = None;
                match result {
                    Ok(resumes) => {
                        info!("Retrieved {} resumes", resumes.len());
                        self.resumes = resumes;
                    }
                    Err(e) => self.fail(e.into(), Some(RetryAction::RetrieveResumes)),
                }
                true
            }
            ApiEvent::ChatReply { generation, result } => {
                let pending = match self.chat_pending.take() {
                    Some(pending) if pending.generation == generation => pending,
                    other => {
                        self.chat_pending = other;
                        debug!("Discarding stale chat reply (gen: {})", generation);
                        return false;
                    }
                };
                match result {
                    Ok(answer) => {
                        self.messages.push(Message::bot(answer.clone()));
                        self.history.push(HistoryEntry {
                            question: pending.question,
                            answer,
                        });
                    }
                    Err(e) => {
                        self.fail(e.into(), Some(RetryAction::SendChat(pending.question)));
                    }
                }
                true
            }
        }
    }

    // -- Helpers --

    /// Record a validation failure in the error slot and hand it back.
    fn reject(&mut self, message: &str) -> ChatError {
        debug!("Rejected input: {}", message);
        let error = ChatError::validation(message);
        self.error = Some(ErrorSlot {
            error: error.clone(),
            retry: None,
        });
        error
    }

    fn fail(&mut self, error: ChatError, retry: Option<RetryAction>) {
        warn!("Request failed: {}", error);
        self.error = Some(ErrorSlot { error, retry });
    }
}

/// Apply `edit` to `buffer`. `limit` caps the length in characters;
/// newlines are dropped when `multiline` is false.
fn apply_text_edit(buffer: &mut String, edit: TextEdit, limit: Option<usize>, multiline: bool) {
    let ch = match edit {
        TextEdit::Insert(c) => c,
        TextEdit::Newline if multiline => '\n',
        TextEdit::Newline => return,
        TextEdit::Backspace => {
            buffer.pop();
            return;
        }
        TextEdit::Clear => {
            buffer.clear();
            return;
        }
    };
    if limit.is_some_and(|max| buffer.chars().count() >= max) {
        return;
    }
    buffer.push(ch);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
