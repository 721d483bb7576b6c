use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    domain::MessageId,
    errors::Error,
    gateway::ProviderGateway,
    phone::PhoneNumber,
    store::SessionStore,
    Result,
};

/// Sends messages on behalf of an already-authenticated phone number.
///
/// This facade never initiates authentication: a missing session fails with
/// [`Error::NotAuthenticated`], and a provider-reported revocation cleans up
/// the local session and fails with [`Error::SessionRevoked`] — both are the
/// caller's signal to run the auth flow.
pub struct Messenger {
    gateway: Arc<dyn ProviderGateway>,
    store: Arc<dyn SessionStore>,
}

impl Messenger {
    pub fn new(gateway: Arc<dyn ProviderGateway>, store: Arc<dyn SessionStore>) -> Self {
        Self { gateway, store }
    }

    pub async fn send_message(
        &self,
        phone: &str,
        recipient: &str,
        text: &str,
    ) -> Result<MessageId> {
        let phone = PhoneNumber::parse(phone)?;

        let Some(mut record) = self.store.get(&phone).await? else {
            return Err(Error::NotAuthenticated);
        };

        match self
            .gateway
            .send_message(record.blob(), recipient, text)
            .await
        {
            Ok(id) => {
                record.touch(Utc::now());
                self.store.put(&phone, &record).await?;
                debug!(phone = %phone, recipient, message_id = id.0, "message sent");
                Ok(id)
            }
            Err(Error::SessionRevoked) => {
                // The provider no longer honors this session; drop the local
                // copy so the caller re-authenticates instead of retrying.
                self.store.delete(&phone).await?;
                warn!(phone = %phone, "session revoked by provider, local session deleted");
                Err(Error::SessionRevoked)
            }
            Err(e) => Err(e),
        }
    }
}
