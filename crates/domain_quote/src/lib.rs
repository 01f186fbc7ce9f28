//! Quoting Domain
//!
//! This crate implements the quoting core of the marine cargo and travel
//! portal, independent of any web framework or storage engine:
//!
//! - **Products**: named cover products and their premium rates
//! - **Premium**: the premium breakdown (base premium, PHCF, training levy,
//!   stamp duty, intermediary commission, total payable)
//! - **Quote requests**: typed marine and travel requests built from form values
//! - **Policy**: per-step field rules, keyed by line of business, role and
//!   account type
//! - **Wizard**: the four-step quote flow with export and high-risk overlays
//! - **Pending quotes**: the per-user list of quotes awaiting payment
//!
//! # Quote Flow
//!
//! ```text
//! Details -> Review -> KYC -> Payment
//!    |                  |
//!    |                  +--> PendingQuote (upserted into the store)
//!    +--> export / high-risk origin --> overlay --> ReferralRequest
//! ```
//!
//! # Example
//!
//! ```rust
//! use domain_quote::PremiumCalculator;
//! use domain_party::ActorRole;
//! use rust_decimal_macros::dec;
//!
//! let calculator = PremiumCalculator::default();
//! let premium = calculator.quote(dec!(500000), "All Risks", ActorRole::Individual).unwrap();
//!
//! assert_eq!(premium.base_premium.amount(), dec!(2500));
//! assert_eq!(premium.rounded().total_payable.amount(), dec!(27512.50));
//! ```

pub mod products;
pub mod premium;
pub mod quote;
pub mod policy;
pub mod wizard;
pub mod pending;
pub mod error;

pub use products::{CoverProduct, RateTable};
pub use premium::{
    compute_premium, CommissionTreatment, PhcfBasis, PremiumBreakdown, PremiumCalculator,
    PremiumPolicy,
};
pub use quote::{
    InsuranceType, MarineQuoteRequest, QuoteDetails, QuoteStatus, ShipmentMode, TradeType,
    TravelQuoteRequest,
};
pub use policy::{IdentifierPolicy, QuotePolicy};
pub use wizard::{
    Overlay, OverlayResolution, PaymentSelection, QuoteWizard, ReferralRequest, StepOutcome,
    WizardContext, WizardStep,
};
pub use pending::{PendingQuote, PendingQuoteRepository, PendingWriteLocks, PENDING_QUOTES_KEY};
pub use error::QuoteError;
