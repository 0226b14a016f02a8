//! Cancellation of in-flight registry calls

use imprint_client::ClientError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Runs a registry call unless `ctx` is cancelled first
///
/// On cancellation the call's future is dropped and [`ClientError::Cancelled`]
/// is returned, so nothing the call would have produced reaches local state.
pub(crate) async fn with_cancel<T, F>(ctx: &CancellationToken, call: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(ClientError::Cancelled),
        result = call => result,
    }
}
