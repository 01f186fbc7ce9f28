//! Settling pending quotes

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use core_kernel::QuoteId;
use domain_quote::{PaymentSelection, PendingQuoteRepository};

use crate::collect::{collect_payment, CancelSignal};
use crate::error::BillingError;
use crate::gateway::PaymentGateway;
use crate::payment::{PaymentMethod, PaymentRequest, PaymentResult};

/// Charges pending quotes and clears them once paid
#[derive(Clone)]
pub struct QuoteSettlement {
    quotes: PendingQuoteRepository,
    gateway: Arc<dyn PaymentGateway>,
    bound: Duration,
}

impl QuoteSettlement {
    pub fn new(quotes: PendingQuoteRepository, gateway: Arc<dyn PaymentGateway>, bound: Duration) -> Self {
        Self {
            quotes,
            gateway,
            bound,
        }
    }

    /// Builds the payment request for a pending quote
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NothingDue` if the quote carries no premium
    pub async fn payment_request(
        &self,
        quote_id: QuoteId,
        phone_number: Option<String>,
    ) -> Result<PaymentRequest, BillingError> {
        let quote = self.quotes.require(quote_id).await?;
        let amount = quote.amount_due().ok_or(BillingError::NothingDue(quote_id))?;

        let mut request = PaymentRequest::new(amount, quote.id.to_string(), quote.title);
        request.phone_number = phone_number;
        Ok(request)
    }

    /// Pays for a pending quote
    ///
    /// The quote is removed from the pending list only when payment
    /// succeeds; a cancelled, declined or timed-out run leaves it in place.
    pub async fn settle(
        &self,
        quote_id: QuoteId,
        method: PaymentMethod,
        phone_number: Option<String>,
        cancel: CancelSignal,
    ) -> Result<Option<PaymentResult>, BillingError> {
        let request = self.payment_request(quote_id, phone_number).await?;

        let Some(result) =
            collect_payment(self.gateway.as_ref(), method, &request, self.bound, cancel).await?
        else {
            return Ok(None);
        };

        self.quotes.remove(quote_id).await?;
        info!(%quote_id, %method, amount = %request.money(), "Quote paid");
        Ok(Some(result))
    }

    /// Pays using the selection made at the payment step of the wizard
    pub async fn settle_selection(
        &self,
        selection: &PaymentSelection,
        cancel: CancelSignal,
    ) -> Result<Option<PaymentResult>, BillingError> {
        let method: PaymentMethod = selection.method.parse()?;
        self.settle(selection.quote_id, method, selection.phone_number.clone(), cancel)
            .await
    }
}
