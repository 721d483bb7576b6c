//! Shared fakes for exercising the core against scripted provider behavior.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{MessageId, PendingHandle, SessionBlob, UserInfo};
use crate::gateway::{CodeSent, ProviderGateway, SignInOutcome};
use crate::phone::PhoneNumber;
use crate::store::{SessionRecord, SessionStore};
use crate::Result;

/// Scripted gateway: every operation pops its next result from a queue and
/// counts the call. Popping an empty queue is a test bug, so it panics.
#[derive(Default)]
pub(crate) struct FakeGateway {
    request_code: Mutex<VecDeque<Result<CodeSent>>>,
    submit_code: Mutex<VecDeque<Result<SignInOutcome>>>,
    submit_password: Mutex<VecDeque<Result<SignInOutcome>>>,
    send_message: Mutex<VecDeque<Result<MessageId>>>,
    revoke: Mutex<VecDeque<Result<()>>>,

    pub(crate) request_code_calls: AtomicUsize,
    pub(crate) submit_code_calls: AtomicUsize,
    pub(crate) submit_password_calls: AtomicUsize,
    pub(crate) send_message_calls: AtomicUsize,
    pub(crate) revoke_calls: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn push_request_code(&self, result: Result<CodeSent>) {
        self.request_code.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_submit_code(&self, result: Result<SignInOutcome>) {
        self.submit_code.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_submit_password(&self, result: Result<SignInOutcome>) {
        self.submit_password.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_send_message(&self, result: Result<MessageId>) {
        self.send_message.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_revoke(&self, result: Result<()>) {
        self.revoke.lock().unwrap().push_back(result);
    }

    pub(crate) fn code_sent(handle: &str) -> CodeSent {
        CodeSent {
            handle: PendingHandle(handle.to_string()),
            valid_for: None,
        }
    }

    pub(crate) fn authenticated(phone: &PhoneNumber, blob: &[u8]) -> SignInOutcome {
        SignInOutcome::Authenticated {
            blob: SessionBlob::new(blob.to_vec()),
            user: UserInfo {
                account_identifier: phone.clone(),
                display_name: Some("Alice".to_string()),
            },
        }
    }

    pub(crate) fn password_required(handle: &str) -> SignInOutcome {
        SignInOutcome::PasswordRequired {
            handle: PendingHandle(handle.to_string()),
        }
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T>>>, op: &str) -> Result<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted result for {op}"))
    }
}

#[async_trait]
impl ProviderGateway for FakeGateway {
    async fn request_code(&self, _phone: &PhoneNumber) -> Result<CodeSent> {
        self.request_code_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.request_code, "request_code")
    }

    async fn submit_code(
        &self,
        _phone: &PhoneNumber,
        _code: &str,
        _handle: &PendingHandle,
    ) -> Result<SignInOutcome> {
        self.submit_code_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.submit_code, "submit_code")
    }

    async fn submit_password(
        &self,
        _phone: &PhoneNumber,
        _password: &str,
        _handle: &PendingHandle,
    ) -> Result<SignInOutcome> {
        self.submit_password_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.submit_password, "submit_password")
    }

    async fn send_message(
        &self,
        _blob: &SessionBlob,
        _recipient: &str,
        _text: &str,
    ) -> Result<MessageId> {
        self.send_message_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.send_message, "send_message")
    }

    async fn revoke(&self, _blob: &SessionBlob) -> Result<()> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        Self::pop(&self.revoke, "revoke")
    }
}

/// In-memory session store for state machine tests.
#[derive(Default)]
pub(crate) struct MemoryStore {
    map: Mutex<HashMap<PhoneNumber, SessionRecord>>,
}

impl MemoryStore {
    pub(crate) fn contains(&self, phone: &PhoneNumber) -> bool {
        self.map.lock().unwrap().contains_key(phone)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put(&self, phone: &PhoneNumber, record: &SessionRecord) -> Result<()> {
        self.map.lock().unwrap().insert(phone.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, phone: &PhoneNumber) -> Result<Option<SessionRecord>> {
        Ok(self.map.lock().unwrap().get(phone).cloned())
    }

    async fn delete(&self, phone: &PhoneNumber) -> Result<()> {
        self.map.lock().unwrap().remove(phone);
        Ok(())
    }
}
