//! Telegram provider adapter (grammers).
//!
//! Implements the `pnba-core` [`ProviderGateway`] port over the
//! `grammers-client` MTProto library. Login attempts that span several calls
//! (code request, code submission, optional password) keep their connected
//! client in an in-memory table keyed by the continuation handle; stale
//! entries are dropped lazily on the next call, so no background task runs.

mod classify;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::session::Session;
use grammers_client::types::{Chat, LoginToken, PasswordToken, User};
use grammers_client::{Client, Config, InitParams, SignInError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use pnba_core::{
    domain::{MessageId, PendingHandle, SessionBlob, UserInfo},
    gateway::{CodeSent, ProviderGateway, SignInOutcome},
    phone::PhoneNumber,
    Error, Result,
};

use classify::{classify_authorization, classify_invocation, classify_sign_in};

/// How long an in-flight login attempt is kept before lazy cleanup drops it.
/// Comfortably above any code validity window the provider hands out.
const ATTEMPT_TTL: Duration = Duration::from_secs(900);

/// One in-flight login: the connected client plus whatever continuation
/// state the provider handed back last.
struct LoginAttempt {
    client: Client,
    login_token: LoginToken,
    /// Submitted code, kept so a failed password attempt can re-arm the
    /// challenge (the SRP token is single-use).
    code: Option<String>,
    password_token: Option<PasswordToken>,
    started_at: DateTime<Utc>,
}

/// Telegram implementation of the provider boundary.
///
/// Credentials arrive already resolved (see `pnba_core::config`); this type
/// never reads the environment itself.
pub struct TelegramGateway {
    api_id: i32,
    api_hash: String,
    attempts: Mutex<HashMap<String, LoginAttempt>>,
    next_handle: AtomicU64,
}

impl TelegramGateway {
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
            attempts: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    async fn connect_fresh(&self) -> Result<Client> {
        Client::connect(Config {
            session: Session::new(),
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(classify_authorization)
    }

    async fn connect_with(&self, blob: &SessionBlob) -> Result<Client> {
        // A corrupt blob is local bookkeeping damage, not a provider error.
        let session = Session::load(blob.as_bytes()).map_err(Error::storage)?;
        Client::connect(Config {
            session,
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            params: InitParams::default(),
        })
        .await
        .map_err(classify_authorization)
    }

    fn issue_handle(&self, phone: &PhoneNumber) -> PendingHandle {
        let seq = self.next_handle.fetch_add(1, Ordering::Relaxed);
        PendingHandle(format!("{}#{seq}", phone.as_str()))
    }

    /// Remove the attempt for the duration of the provider round trip; the
    /// network call must not run under the table lock.
    async fn take_attempt(&self, handle: &PendingHandle) -> Result<LoginAttempt> {
        let mut attempts = self.attempts.lock().await;
        purge_stale(&mut attempts, Utc::now());
        attempts.remove(&handle.0).ok_or(Error::CodeExpired)
    }

    async fn park_attempt(&self, handle: &PendingHandle, attempt: LoginAttempt) {
        let mut attempts = self.attempts.lock().await;
        purge_stale(&mut attempts, Utc::now());
        attempts.insert(handle.0.clone(), attempt);
    }

    /// Replay the code submission to obtain a fresh SRP challenge after a
    /// wrong password.
    async fn rearm_password(&self, attempt: &mut LoginAttempt) -> Result<()> {
        let code = attempt.code.clone().ok_or(Error::CodeExpired)?;
        match attempt.client.sign_in(&attempt.login_token, &code).await {
            Err(SignInError::PasswordRequired(token)) => {
                attempt.password_token = Some(token);
                Ok(())
            }
            Ok(_) => Err(Error::CodeExpired),
            Err(other) => Err(classify_sign_in(other)),
        }
    }
}

#[async_trait]
impl ProviderGateway for TelegramGateway {
    async fn request_code(&self, phone: &PhoneNumber) -> Result<CodeSent> {
        let client = self.connect_fresh().await?;
        let login_token = client
            .request_login_code(phone.as_str())
            .await
            .map_err(classify_authorization)?;

        let handle = self.issue_handle(phone);
        self.park_attempt(
            &handle,
            LoginAttempt {
                client,
                login_token,
                code: None,
                password_token: None,
                started_at: Utc::now(),
            },
        )
        .await;
        debug!(phone = %phone, handle = %handle.0, "login code requested");

        // The provider does not expose the code validity window here; the
        // core falls back to its configured TTL.
        Ok(CodeSent {
            handle,
            valid_for: None,
        })
    }

    async fn submit_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
        handle: &PendingHandle,
    ) -> Result<SignInOutcome> {
        let mut attempt = self.take_attempt(handle).await?;
        if attempt.password_token.is_some() {
            self.park_attempt(handle, attempt).await;
            return Err(Error::PendingMismatch(
                "login attempt is waiting for a password, not a code",
            ));
        }

        match attempt.client.sign_in(&attempt.login_token, code).await {
            Ok(user) => Ok(authenticated(&attempt.client, phone, &user)),
            Err(SignInError::PasswordRequired(password_token)) => {
                let refreshed = self.issue_handle(phone);
                attempt.code = Some(code.to_string());
                attempt.password_token = Some(password_token);
                self.park_attempt(&refreshed, attempt).await;
                debug!(phone = %phone, "two-step verification required");
                Ok(SignInOutcome::PasswordRequired { handle: refreshed })
            }
            Err(SignInError::InvalidCode) => {
                // The provider allows a bounded number of retries on the
                // same attempt; keep it parked under the original handle.
                self.park_attempt(handle, attempt).await;
                Err(Error::InvalidCode)
            }
            Err(other) => Err(classify_sign_in(other)),
        }
    }

    async fn submit_password(
        &self,
        phone: &PhoneNumber,
        password: &str,
        handle: &PendingHandle,
    ) -> Result<SignInOutcome> {
        let mut attempt = self.take_attempt(handle).await?;
        let Some(password_token) = attempt.password_token.take() else {
            self.park_attempt(handle, attempt).await;
            return Err(Error::PendingMismatch(
                "login attempt is not waiting for a password",
            ));
        };

        match attempt.client.check_password(password_token, password).await {
            Ok(user) => Ok(authenticated(&attempt.client, phone, &user)),
            Err(SignInError::InvalidPassword) => {
                match self.rearm_password(&mut attempt).await {
                    Ok(()) => self.park_attempt(handle, attempt).await,
                    Err(e) => {
                        warn!(phone = %phone, error = %e, "could not refresh password challenge")
                    }
                }
                Err(Error::InvalidPassword)
            }
            Err(other) => Err(classify_sign_in(other)),
        }
    }

    async fn send_message(
        &self,
        blob: &SessionBlob,
        recipient: &str,
        text: &str,
    ) -> Result<MessageId> {
        let client = self.connect_with(blob).await?;
        if !client.is_authorized().await.map_err(classify_invocation)? {
            return Err(Error::SessionRevoked);
        }

        let chat = resolve_recipient(&client, recipient).await?;
        let message = client
            .send_message(&chat, text)
            .await
            .map_err(classify_invocation)?;
        debug!(recipient, message_id = message.id(), "message sent");
        Ok(MessageId(message.id()))
    }

    async fn revoke(&self, blob: &SessionBlob) -> Result<()> {
        let client = self.connect_with(blob).await?;
        client.sign_out().await.map_err(classify_invocation)?;
        Ok(())
    }
}

fn authenticated(client: &Client, phone: &PhoneNumber, user: &User) -> SignInOutcome {
    SignInOutcome::Authenticated {
        blob: SessionBlob::new(client.session().save()),
        user: UserInfo {
            account_identifier: phone.clone(),
            display_name: non_empty(user.full_name()),
        },
    }
}

/// Resolve a `@username` (or bare username) to a sendable peer.
async fn resolve_recipient(client: &Client, recipient: &str) -> Result<Chat> {
    let name = recipient.strip_prefix('@').unwrap_or(recipient);
    match client
        .resolve_username(name)
        .await
        .map_err(classify_invocation)?
    {
        Some(chat) => Ok(chat),
        None => Err(Error::ProviderUnavailable(format!(
            "recipient {recipient} not found"
        ))),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn purge_stale(attempts: &mut HashMap<String, LoginAttempt>, now: DateTime<Utc>) {
    attempts.retain(|_, a| {
        (now - a.started_at)
            .to_std()
            .map(|age| age < ATTEMPT_TTL)
            .unwrap_or(true)
    });
}
