//! Classification of raw Telegram errors into the canonical taxonomy.
//!
//! Telegram reports errors as SCREAMING_SNAKE_CASE names with a numeric
//! suffix split off into a separate value (`FLOOD_WAIT_30` arrives as name
//! `FLOOD_WAIT`, value 30). Code 401 uniformly means the stored
//! authorization is gone.

use grammers_client::client::auth::AuthorizationError;
use grammers_client::{InvocationError, SignInError};

use pnba_core::Error;

/// Map an RPC error by code/name/value. Pure so it can be tested without a
/// live client.
pub(crate) fn classify_rpc(code: i32, name: &str, value: Option<u32>) -> Error {
    match name {
        "FLOOD_WAIT" | "FLOOD_PREMIUM_WAIT" | "SLOWMODE_WAIT" => Error::RateLimited {
            retry_after_seconds: u64::from(value.unwrap_or(0)),
        },
        "PHONE_PASSWORD_FLOOD" => Error::TooManyAttempts,
        "PHONE_CODE_EXPIRED" => Error::CodeExpired,
        name if name.starts_with("PHONE_CODE_") => Error::InvalidCode,
        "PASSWORD_HASH_INVALID" | "SRP_ID_INVALID" | "SRP_PASSWORD_CHANGED" => {
            Error::InvalidPassword
        }
        _ if code == 401 => Error::SessionRevoked,
        _ => Error::ProviderUnavailable(format!("rpc error {code}: {name}")),
    }
}

pub(crate) fn classify_invocation(err: InvocationError) -> Error {
    match err {
        InvocationError::Rpc(rpc) => classify_rpc(rpc.code, &rpc.name, rpc.value),
        other => Error::ProviderUnavailable(other.to_string()),
    }
}

pub(crate) fn classify_authorization(err: AuthorizationError) -> Error {
    match err {
        AuthorizationError::Invoke(e) => classify_invocation(e),
        other => Error::ProviderUnavailable(other.to_string()),
    }
}

/// Sign-in errors the gateway does not handle structurally (password
/// challenges and retryable wrong codes are dealt with at the call site).
pub(crate) fn classify_sign_in(err: SignInError) -> Error {
    match err {
        SignInError::InvalidCode => Error::InvalidCode,
        SignInError::InvalidPassword => Error::InvalidPassword,
        SignInError::Other(e) => classify_invocation(e),
        other => Error::ProviderUnavailable(other.to_string()),
    }
}
