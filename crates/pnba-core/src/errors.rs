/// Canonical error vocabulary of the PNBA adapter.
///
/// The Provider Gateway classifies every raw Telegram error into exactly one
/// of these kinds before it reaches the core; the core and its callers never
/// inspect provider-specific error objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provider flood control. The caller must wait `retry_after_seconds`
    /// before retrying; the adapter never sleeps on its behalf.
    #[error("rate limited by provider, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    /// The login code (or the underlying login attempt) is no longer valid.
    /// The flow restarts with a fresh `send_code`.
    #[error("login code expired")]
    CodeExpired,

    /// The provider rejected the submitted code. The pending auth stays
    /// usable for another attempt until it expires.
    #[error("login code rejected")]
    InvalidCode,

    /// The provider rejected the two-factor password. The pending auth stays
    /// usable for another attempt.
    #[error("two-factor password rejected")]
    InvalidPassword,

    /// The provider terminated the login attempt after too many wrong
    /// submissions. The retry budget is the provider's, not ours.
    #[error("too many attempts, login attempt terminated by provider")]
    TooManyAttempts,

    /// Transient network/service failure. Safe to retry the same step after
    /// a backoff chosen by the caller.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Precondition violation: no stored session for this phone number.
    #[error("no authenticated session for this phone number")]
    NotAuthenticated,

    /// The stored session is no longer honored by the provider. Local state
    /// has already been cleaned up; the caller must re-authenticate.
    #[error("session revoked by provider")]
    SessionRevoked,

    /// Local persistence failure. Fatal to the current operation and never
    /// conflated with provider errors.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The pending-auth token passed in does not fit the requested
    /// operation (wrong phone number or wrong stage).
    #[error("pending auth mismatch: {0}")]
    PendingMismatch(&'static str),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn provider_unavailable(err: impl std::fmt::Display) -> Self {
        Self::ProviderUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
