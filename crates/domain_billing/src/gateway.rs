//! Payment gateway port and the simulated gateway

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use core_kernel::DomainPort;

use crate::error::PaymentError;
use crate::payment::{PaymentMethod, PaymentRequest, PaymentResult};

const RECEIPT_LENGTH: usize = 10;
const RECEIPT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A rail that can charge a payment request
#[async_trait]
pub trait PaymentGateway: DomainPort {
    /// Charges the request and waits for the rail's answer
    async fn charge(
        &self,
        method: PaymentMethod,
        request: &PaymentRequest,
    ) -> Result<PaymentResult, PaymentError>;
}

/// Generates an M-PESA style receipt: 10 uppercase letters and digits
pub fn generate_receipt() -> String {
    let mut rng = rand::thread_rng();
    (0..RECEIPT_LENGTH)
        .map(|_| RECEIPT_CHARSET[rng.gen_range(0..RECEIPT_CHARSET.len())] as char)
        .collect()
}

/// A gateway that answers after a fixed delay without moving money
///
/// STK push payments come back with a generated receipt.
#[derive(Debug, Clone, Default)]
pub struct SimulatedGateway {
    delay: Duration,
    decline: Option<String>,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            decline: None,
        }
    }

    /// A gateway that answers immediately
    pub fn instant() -> Self {
        Self::default()
    }

    /// Makes every charge fail with the given reason
    pub fn declining(mut self, reason: impl Into<String>) -> Self {
        self.decline = Some(reason.into());
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl DomainPort for SimulatedGateway {}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(
        &self,
        method: PaymentMethod,
        request: &PaymentRequest,
    ) -> Result<PaymentResult, PaymentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(reason) = &self.decline {
            warn!(reference = %request.reference, %method, reason, "Simulated payment declined");
            return Err(PaymentError::Declined(reason.clone()));
        }

        let mpesa_receipt = (method == PaymentMethod::Stk).then(generate_receipt);
        info!(
            reference = %request.reference,
            %method,
            amount = %request.money(),
            receipt = mpesa_receipt.as_deref().unwrap_or("-"),
            "Simulated payment completed"
        );

        Ok(PaymentResult {
            success: true,
            method,
            reference: request.reference.clone(),
            mpesa_receipt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn receipt_is_ten_uppercase_alphanumerics(_seed in 0u8..32) {
            let receipt = generate_receipt();
            prop_assert_eq!(receipt.len(), RECEIPT_LENGTH);
            prop_assert!(receipt.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
