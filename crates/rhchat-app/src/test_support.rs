// In-memory backend shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use rhchat_api::ChatBackend;
use rhchat_core::error::ApiError;
use rhchat_core::protocol::ChatRequest;

/// Scripted backend that records every request it receives. Calls with no
/// scripted response fail with a network error.
#[derive(Default)]
pub struct MockBackend {
    subquestions: Mutex<VecDeque<Result<Vec<String>, ApiError>>>,
    resumes: Mutex<VecDeque<Result<Vec<String>, ApiError>>>,
    replies: Mutex<VecDeque<Result<String, ApiError>>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub resume_requests: Mutex<Vec<Vec<String>>>,
    calls: AtomicUsize,
}

fn unscripted() -> ApiError {
    ApiError::Network("no scripted response".into())
}

fn owned(result: Result<Vec<&str>, ApiError>) -> Result<Vec<String>, ApiError> {
    result.map(|v| v.into_iter().map(String::from).collect())
}

impl MockBackend {
    pub fn script_subquestions(&self, result: Result<Vec<&str>, ApiError>) {
        self.subquestions.lock().unwrap().push_back(owned(result));
    }

    pub fn script_resumes(&self, result: Result<Vec<&str>, ApiError>) {
        self.resumes.lock().unwrap().push_back(owned(result));
    }

    pub fn script_reply(&self, result: Result<&str, ApiError>) {
        self.replies.lock().unwrap().push_back(result.map(String::from));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn generate_response(&self, request: &ChatRequest) -> Result<String, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.chat_requests.lock().unwrap().push(request.clone());
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn generate_subquestions(&self, _description: &str) -> Result<Vec<String>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.subquestions.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    async fn retrieve_resumes(&self, subquestions: &[String]) -> Result<Vec<String>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.resume_requests.lock().unwrap().push(subquestions.to_vec());
        self.resumes.lock().unwrap().pop_front().unwrap_or_else(|| Err(unscripted()))
    }
}
