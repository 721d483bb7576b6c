use chrono::{DateTime, Utc};

use crate::{domain::PendingHandle, phone::PhoneNumber};

/// Which validation step an in-flight login attempt is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingStage {
    /// Waiting for the code the provider delivered to the user.
    Code,
    /// Code accepted; waiting for the two-factor password.
    Password,
}

/// Transient token for an in-flight login attempt.
///
/// Created by `send_code` and handed to the caller, who passes it back to the
/// validation calls. Carrying the continuation handle explicitly (instead of
/// keeping one global in-progress login per process) lets logins for
/// different phone numbers run concurrently without shared mutable state.
#[derive(Clone, Debug)]
pub struct PendingAuth {
    phone: PhoneNumber,
    handle: PendingHandle,
    stage: PendingStage,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl PendingAuth {
    pub(crate) fn new(
        phone: PhoneNumber,
        handle: PendingHandle,
        stage: PendingStage,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            phone,
            handle,
            stage,
            created_at,
            expires_at,
        }
    }

    /// Refreshed token for the two-factor round trip. Keeps the original
    /// attempt's expiry; only the handle and stage change.
    pub(crate) fn for_password(&self, handle: PendingHandle) -> Self {
        Self {
            phone: self.phone.clone(),
            handle,
            stage: PendingStage::Password,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn handle(&self) -> &PendingHandle {
        &self.handle
    }

    pub fn stage(&self) -> PendingStage {
        self.stage
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Expiry is evaluated lazily at the point of use; there is no
    /// background sweep.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
