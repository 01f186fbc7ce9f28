//! Core Kernel - Foundational types and utilities for the quoting system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Clocks and the calendar-day timezone
//! - Typed identifiers
//! - Ports (key-value persistence, health checks)
//! - Declarative field validation

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod validation;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone};
pub use identifiers::{QuoteId, ReferralId, PaymentId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, KeyValueStore, ScopedStore,
    HealthCheckable, HealthCheckResult, AdapterHealth,
    read_json, write_json,
};
pub use validation::{
    FormValues, FieldRules, Rule, Pattern, ErrorKind, FieldError, ValidationReport,
};
