//! Service for the assistant chat transcript.
//!
//! Holds the conversation history and the request status of the in-flight
//! exchange. Producing assistant replies is the embedding app's concern;
//! this store only keeps the transcript. The error message is transient
//! session state and is not persisted.

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::models::chat::{ChatMessage, ChatRole, ChatStatus};
use crate::domain::notify::ChangeNotifier;
use crate::storage::json::chat_repository::{ChatSnapshot, ChatStoreRepository, CHAT_SNAPSHOT_VERSION};

struct ChatState {
    messages: Vec<ChatMessage>,
    status: ChatStatus,
    error: Option<String>,
}

/// The chat transcript store.
#[derive(Clone)]
pub struct ChatService {
    state: Arc<Mutex<ChatState>>,
    repository: ChatStoreRepository,
    notifier: Arc<ChangeNotifier>,
}

impl ChatService {
    /// Create the service, rehydrating the persisted transcript if any.
    pub fn new(repository: ChatStoreRepository) -> Result<Self> {
        let state = match repository.load()? {
            Some(snapshot) => {
                info!("Rehydrated chat store: {} messages", snapshot.messages.len());
                ChatState {
                    messages: snapshot.messages,
                    status: snapshot.status,
                    error: None,
                }
            }
            None => ChatState {
                messages: Vec::new(),
                status: ChatStatus::Idle,
                error: None,
            },
        };

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            repository,
            notifier: Arc::new(ChangeNotifier::new()),
        })
    }

    /// Register a listener called after every committed mutation.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener);
    }

    /// Append a message, stamping its id and creation time.
    pub fn add_message(&self, role: ChatRole, content: &str) -> Result<ChatMessage> {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let message = ChatMessage {
            id: ChatMessage::generate_id(now_ms),
            role,
            content: content.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.messages.push(message.clone());
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)?;
        Ok(message)
    }

    /// Set the request status; `error` only accompanies `ChatStatus::Error`.
    pub fn set_status(&self, status: ChatStatus, error: Option<String>) -> Result<()> {
        debug!("Chat status: {:?}", status);
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.status = status;
            state.error = error;
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Drop the transcript and reset to idle.
    pub fn clear_messages(&self) -> Result<()> {
        info!("Clearing chat transcript");
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.messages.clear();
            state.status = ChatStatus::Idle;
            state.error = None;
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /* ---------- Queries ---------- */

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn status(&self) -> ChatStatus {
        self.state.lock().unwrap().status
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    /* ---------- Persistence ---------- */

    fn snapshot_of(state: &ChatState) -> ChatSnapshot {
        ChatSnapshot {
            version: CHAT_SNAPSHOT_VERSION,
            messages: state.messages.clone(),
            status: state.status,
        }
    }

    fn commit(&self, snapshot: &ChatSnapshot) -> Result<()> {
        self.notifier.notify();
        self.repository.save(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::TestEnvironment;

    fn setup() -> (ChatService, TestEnvironment) {
        let env = TestEnvironment::new().unwrap();
        let service = ChatService::new(ChatStoreRepository::new(env.store())).unwrap();
        (service, env)
    }

    #[test]
    fn test_starts_empty_and_idle() {
        let (service, _env) = setup();
        assert!(service.messages().is_empty());
        assert_eq!(service.status(), ChatStatus::Idle);
        assert_eq!(service.error(), None);
    }

    #[test]
    fn test_add_message_stamps_id_and_time() {
        let (service, _env) = setup();
        let message = service
            .add_message(ChatRole::User, "Is magnesium safe with zinc?")
            .unwrap();
        assert!(message.id.starts_with("msg-"));
        assert!(!message.created_at.is_empty());

        let messages = service.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
    }

    #[test]
    fn test_error_is_session_only() {
        let env = TestEnvironment::new().unwrap();
        {
            let service = ChatService::new(ChatStoreRepository::new(env.store())).unwrap();
            service.add_message(ChatRole::User, "hello").unwrap();
            service
                .set_status(ChatStatus::Error, Some("network down".to_string()))
                .unwrap();
            assert_eq!(service.error().as_deref(), Some("network down"));
        }

        // After a restart the transcript and status survive; the error does not.
        let service = ChatService::new(ChatStoreRepository::new(env.store())).unwrap();
        assert_eq!(service.messages().len(), 1);
        assert_eq!(service.status(), ChatStatus::Error);
        assert_eq!(service.error(), None);
    }

    #[test]
    fn test_clear_messages_resets_everything() {
        let (service, _env) = setup();
        service.add_message(ChatRole::User, "hello").unwrap();
        service.add_message(ChatRole::Assistant, "hi").unwrap();
        service
            .set_status(ChatStatus::Error, Some("boom".to_string()))
            .unwrap();

        service.clear_messages().unwrap();
        assert!(service.messages().is_empty());
        assert_eq!(service.status(), ChatStatus::Idle);
        assert_eq!(service.error(), None);
    }
}
