use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    domain::{SessionBlob, UserInfo},
    errors::Error,
    gateway::{ProviderGateway, SignInOutcome},
    pending::{PendingAuth, PendingStage},
    phone::PhoneNumber,
    store::{SessionRecord, SessionStore},
    Result,
};

/// Outcome of a successful validation step.
#[derive(Debug)]
pub enum AuthOutcome {
    /// The session was committed to the store; the flow is complete.
    Authenticated(UserInfo),
    /// Two-step verification is enabled; call
    /// [`AuthFlow::validate_password`] with this refreshed pending token.
    PasswordRequired(PendingAuth),
}

/// Drives a phone number through code request, code validation and optional
/// password validation, committing the session on success.
///
/// States move `Idle -> CodeRequested -> CodeSubmitted -> {Authenticated |
/// PasswordRequired} -> PasswordSubmitted -> Authenticated`, with the state
/// carried by the [`PendingAuth`] token the caller holds.
///
/// Every operation is a plain future: dropping it cancels the provider round
/// trip, and the only durable effect is the single atomic store write at the
/// end of a successful validation.
pub struct AuthFlow {
    gateway: Arc<dyn ProviderGateway>,
    store: Arc<dyn SessionStore>,
    code_ttl: Duration,
}

impl AuthFlow {
    /// `code_ttl` is the fallback validity window for login codes when the
    /// provider does not report one.
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        store: Arc<dyn SessionStore>,
        code_ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            store,
            code_ttl,
        }
    }

    /// Ask the provider to deliver a login code to `phone`.
    ///
    /// Flood control fails with [`Error::RateLimited`] and creates no pending
    /// state; the wait belongs to the caller, not to an internal backoff.
    pub async fn send_code(&self, phone: &str) -> Result<PendingAuth> {
        let phone = PhoneNumber::parse(phone)?;
        let sent = self.gateway.request_code(&phone).await?;

        let now = Utc::now();
        let ttl = sent.valid_for.unwrap_or(self.code_ttl);
        let expires_at = now + chrono::Duration::seconds(ttl.as_secs() as i64);
        let pending = PendingAuth::new(phone, sent.handle, PendingStage::Code, now, expires_at);

        info!(phone = %pending.phone(), expires_at = %expires_at, "login code requested");
        Ok(pending)
    }

    /// Submit the code the user received.
    ///
    /// A rejected code fails with [`Error::InvalidCode`] and leaves `pending`
    /// usable for another attempt; an expired one fails with
    /// [`Error::CodeExpired`] without reaching the provider, and the flow
    /// restarts with [`AuthFlow::send_code`].
    pub async fn validate_code(
        &self,
        phone: &str,
        code: &str,
        pending: &PendingAuth,
    ) -> Result<AuthOutcome> {
        let phone = PhoneNumber::parse(phone)?;
        check_pending(&phone, pending, PendingStage::Code)?;

        match self.gateway.submit_code(&phone, code, pending.handle()).await? {
            SignInOutcome::Authenticated { blob, user } => {
                self.commit(&phone, blob).await?;
                info!(phone = %phone, "authenticated");
                Ok(AuthOutcome::Authenticated(user))
            }
            SignInOutcome::PasswordRequired { handle } => {
                debug!(phone = %phone, "two-step verification enabled");
                Ok(AuthOutcome::PasswordRequired(pending.for_password(handle)))
            }
        }
    }

    /// Submit the two-factor password for a pending login in the
    /// password-required stage.
    ///
    /// A wrong password fails with [`Error::InvalidPassword`] and preserves
    /// `pending`; once the provider reports its retry budget exhausted the
    /// attempt ends with [`Error::TooManyAttempts`].
    pub async fn validate_password(
        &self,
        phone: &str,
        password: &str,
        pending: &PendingAuth,
    ) -> Result<AuthOutcome> {
        let phone = PhoneNumber::parse(phone)?;
        check_pending(&phone, pending, PendingStage::Password)?;

        match self
            .gateway
            .submit_password(&phone, password, pending.handle())
            .await?
        {
            SignInOutcome::Authenticated { blob, user } => {
                self.commit(&phone, blob).await?;
                info!(phone = %phone, "authenticated with two-step verification");
                Ok(AuthOutcome::Authenticated(user))
            }
            SignInOutcome::PasswordRequired { .. } => Err(Error::ProviderUnavailable(
                "provider demanded a password twice".to_string(),
            )),
        }
    }

    /// Revoke and delete the session for `phone`.
    ///
    /// Idempotent. A provider-side revoke failure is reported at `warn` and
    /// does not block local deletion.
    pub async fn invalidate(&self, phone: &str) -> Result<()> {
        let phone = PhoneNumber::parse(phone)?;

        if let Some(record) = self.store.get(&phone).await? {
            if let Err(e) = self.gateway.revoke(record.blob()).await {
                warn!(phone = %phone, error = %e, "provider-side revoke failed, deleting local session anyway");
            }
        }

        self.store.delete(&phone).await?;
        info!(phone = %phone, "session invalidated");
        Ok(())
    }

    async fn commit(&self, phone: &PhoneNumber, blob: SessionBlob) -> Result<()> {
        // Overwrites any previous record for this phone: re-authentication
        // replaces the old session wholesale.
        let record = SessionRecord::new(blob, Utc::now());
        self.store.put(phone, &record).await
    }
}

fn check_pending(phone: &PhoneNumber, pending: &PendingAuth, stage: PendingStage) -> Result<()> {
    if pending.phone() != phone {
        return Err(Error::PendingMismatch(
            "pending auth belongs to a different phone number",
        ));
    }
    if pending.stage() != stage {
        return Err(Error::PendingMismatch(match stage {
            PendingStage::Code => "pending auth is already past code validation",
            PendingStage::Password => "pending auth is not waiting for a password",
        }));
    }
    if pending.is_expired(Utc::now()) {
        return Err(Error::CodeExpired);
    }
    Ok(())
}
