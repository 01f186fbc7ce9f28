//! Party Domain
//!
//! This crate covers everything the quoting portal knows about the person
//! on the other side of the form:
//!
//! - **Roles**: an actor is either an individual customer or an
//!   intermediary (broker/agent) who earns commission
//! - **Account types**: the KYC discriminator (individual, corporate,
//!   intermediary) and the field rules each one requires
//! - **Sessions**: a placeholder credential check against an injected
//!   directory, with a 24-hour session window
//! - **Registration**: validation of the sign-up form and the stored
//!   snapshot of the last submission
//!
//! The session policy is a stand-in for a real identity provider and is
//! not a security boundary.
//!
//! # Examples
//!
//! ```rust
//! use domain_party::kyc::validators_for;
//! use domain_party::AccountType;
//!
//! let rules = validators_for(AccountType::Intermediary);
//! assert!(rules.contains("ira_number"));
//! assert!(!rules.contains("kra_pin"));
//! ```

pub mod role;
pub mod kyc;
pub mod credentials;
pub mod session;
pub mod registration;
pub mod error;

pub use role::{ActorRole, AccountType};
pub use credentials::{Credential, CredentialDirectory, normalize_username};
pub use session::{UserSession, SessionService, SESSION_KEY, LAST_USERNAME_KEY};
pub use registration::{RegistrationService, RegistrationSnapshot, REGISTRATION_KEY};
pub use error::PartyError;
