use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::{MessageId, PendingHandle, SessionBlob, UserInfo},
    phone::PhoneNumber,
    Result,
};

/// Result of asking the provider to deliver a login code.
#[derive(Clone, Debug)]
pub struct CodeSent {
    pub handle: PendingHandle,
    /// Validity window reported by the provider, if any. Callers fall back
    /// to a configured default when absent.
    pub valid_for: Option<Duration>,
}

/// Outcome of submitting a code or password for an in-flight login.
#[derive(Debug)]
pub enum SignInOutcome {
    /// Fully signed in; `blob` is the serialized session to persist.
    Authenticated { blob: SessionBlob, user: UserInfo },
    /// The account has two-step verification enabled; the password must be
    /// submitted with this refreshed handle.
    PasswordRequired { handle: PendingHandle },
}

/// Boundary to the Telegram network client.
///
/// Implementations translate raw client errors into the canonical kinds of
/// [`crate::Error`] — flood control arrives as `RateLimited` with the wait
/// attached — so the core never sees provider-specific error objects.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Ask the provider to deliver a login code for `phone`.
    async fn request_code(&self, phone: &PhoneNumber) -> Result<CodeSent>;

    /// Submit the code the user received, continuing the attempt behind
    /// `handle`.
    async fn submit_code(
        &self,
        phone: &PhoneNumber,
        code: &str,
        handle: &PendingHandle,
    ) -> Result<SignInOutcome>;

    /// Submit the two-factor password, continuing the attempt behind
    /// `handle`.
    async fn submit_password(
        &self,
        phone: &PhoneNumber,
        password: &str,
        handle: &PendingHandle,
    ) -> Result<SignInOutcome>;

    /// Send `text` to `recipient` on behalf of the session in `blob`.
    async fn send_message(
        &self,
        blob: &SessionBlob,
        recipient: &str,
        text: &str,
    ) -> Result<MessageId>;

    /// Log the session out on the provider side. Callers treat failures as
    /// best-effort; local deletion proceeds regardless.
    async fn revoke(&self, blob: &SessionBlob) -> Result<()>;
}
