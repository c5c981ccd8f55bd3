//! Single-flight access token refresh
//!
//! Every request that comes back 401 funnels through [`RefreshCoordinator::recover`].
//! Refreshes are serialised behind one async mutex, and a waiter that finds
//! the stored access token already changed replays with it instead of
//! refreshing again. At most one refresh round trip is in flight per client.
//! A waiter whose token was rejected by a failed refresh receives that same
//! failure.

use super::store::TokenKind;
use super::{ApiClient, ClientError};
use shopfront_core::Credentials;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of the last refresh that ended a session
#[derive(Debug)]
struct FailedRefresh {
    /// Access token the failed refresh was meant to replace
    rejected_token: String,
    error: Arc<ClientError>,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    last_failure: Mutex<Option<FailedRefresh>>,
}

impl RefreshCoordinator {
    /// Try to obtain a usable access token after `sent_token` was rejected.
    ///
    /// `Ok(())` means the caller should replay its request once. On refresh
    /// failure the session has been ended and the refresh error is returned.
    pub(crate) async fn recover(
        &self,
        client: &ApiClient,
        sent_token: Option<&str>,
        original: ClientError,
    ) -> Result<(), ClientError> {
        let mut last_failure = self.last_failure.lock().await;
        let store = client.token_store();

        let rejected = match (sent_token, store.get(TokenKind::Access)) {
            (sent, Some(current)) if sent != Some(current.as_str()) => {
                tracing::debug!("Access token rotated while waiting, replaying");
                return Ok(());
            }
            (Some(sent), None) => {
                return Err(match last_failure.as_ref() {
                    Some(failure) if failure.rejected_token == sent => {
                        tracing::debug!("Sharing the result of a concurrent failed refresh");
                        ClientError::RefreshFailed(Arc::clone(&failure.error))
                    }
                    _ => ClientError::SessionExpired,
                });
            }
            (None, None) => return Err(original),
            (_, Some(current)) => current,
        };

        let Some(refresh_token) = store.get(TokenKind::Refresh) else {
            tracing::debug!("No session to refresh");
            return Err(original);
        };

        let result = match client.refresh_tokens(&refresh_token).await {
            Ok(response) => match response.refresh_token {
                Some(rotated) => store.set(&Credentials::new(response.access_token, rotated)),
                None => store.set_access_token(&response.access_token),
            }
            .map_err(ClientError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                tracing::info!("Access token refreshed");
                *last_failure = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, ending session");
                let error = Arc::new(err);
                *last_failure = Some(FailedRefresh {
                    rejected_token: rejected,
                    error: Arc::clone(&error),
                });
                client.end_session();
                Err(ClientError::RefreshFailed(error))
            }
        }
    }
}
