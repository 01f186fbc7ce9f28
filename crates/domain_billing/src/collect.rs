//! Bounded, cancellable payment runs
//!
//! A payment run races three things: the gateway's answer, a deadline and
//! the user closing the payment modal. Whichever finishes first decides
//! the outcome.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::PaymentError;
use crate::gateway::PaymentGateway;
use crate::payment::{PaymentMethod, PaymentRequest, PaymentResult};

/// Sending half of a cancellation pair, held by whoever owns the modal
#[derive(Debug)]
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    /// Cancels the payment run; a no-op if it already finished
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

/// Receiving half of a cancellation pair, handed to the payment run
///
/// Dropping the matching `CancelHandle` without calling `cancel` does not
/// cancel the run.
#[derive(Debug, Default)]
pub struct CancelSignal(Option<oneshot::Receiver<()>>);

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self(None)
    }

    async fn cancelled(self) {
        match self.0 {
            Some(rx) => {
                if rx.await.is_err() {
                    std::future::pending::<()>().await
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Creates a linked cancellation pair
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelHandle(tx), CancelSignal(Some(rx)))
}

/// Runs a payment through the gateway
///
/// Returns `Ok(Some(result))` once paid and `Ok(None)` if the run was
/// cancelled before the gateway answered. At most one outcome is produced.
///
/// # Errors
///
/// - `PaymentError::InvalidRequest` if the request fails validation; the
///   gateway is not called
/// - `PaymentError::Timeout` if the gateway does not answer within `bound`
/// - `PaymentError::Declined` if the gateway rejects the payment
pub async fn collect_payment(
    gateway: &dyn PaymentGateway,
    method: PaymentMethod,
    request: &PaymentRequest,
    bound: Duration,
    cancel: CancelSignal,
) -> Result<Option<PaymentResult>, PaymentError> {
    request.validate(method)?;

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            info!(reference = %request.reference, %method, "Payment cancelled");
            Ok(None)
        }
        outcome = tokio::time::timeout(bound, gateway.charge(method, request)) => match outcome {
            Ok(Ok(result)) if result.success => Ok(Some(result)),
            Ok(Ok(result)) => Err(PaymentError::Declined(format!(
                "gateway reported failure for {}",
                result.reference
            ))),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(reference = %request.reference, %method, ?bound, "Payment timed out");
                Err(PaymentError::Timeout(bound))
            }
        },
    }
}
