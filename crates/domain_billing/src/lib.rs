//! Billing Domain - Quote Payments
//!
//! This crate turns a pending quote into a paid one:
//!
//! - **Payment contract**: the request handed to a payment modal
//!   (`amount`, `phoneNumber`, `reference`, `description`) and the result it
//!   returns (`success`, `method`, `reference`, `mpesaReceipt`)
//! - **Gateway port**: `PaymentGateway`, implemented here by a simulated
//!   gateway that stands in for M-PESA STK push, paybill and card rails
//! - **Collection**: a payment run bounded by a timeout and cancellable by
//!   the user closing the modal
//! - **Settlement**: charging a pending quote and removing it once paid
//!
//! # Outcomes of a payment run
//!
//! ```text
//! collect_payment ──▶ Ok(Some(result))   paid
//!                 ──▶ Ok(None)           cancelled by the user
//!                 ──▶ Err(Timeout)       no answer within the bound
//!                 ──▶ Err(Declined)      rejected by the gateway
//!                 ──▶ Err(InvalidRequest)
//! ```

pub mod payment;
pub mod gateway;
pub mod collect;
pub mod settlement;
pub mod error;

pub use payment::{PaymentMethod, PaymentRequest, PaymentResult};
pub use gateway::{PaymentGateway, SimulatedGateway, generate_receipt};
pub use collect::{collect_payment, cancellation, CancelHandle, CancelSignal};
pub use settlement::QuoteSettlement;
pub use error::{BillingError, PaymentError};
