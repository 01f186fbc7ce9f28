//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the quoting flow. These fixtures are
//! designed to be consistent and predictable: "today" is 18 October 2026
//! in Nairobi throughout.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{Currency, FixedClock, FormValues, KeyValueStore, Money, QuoteId, Timezone};
use domain_party::{ActorRole, CredentialDirectory, SessionService};
use domain_quote::{
    InsuranceType, PendingQuote, PremiumCalculator, QuotePolicy, QuoteStatus, WizardContext,
};
use infra_db::InMemoryKeyValueStore;

/// The standard rate table and policy, shared across tests
static CALCULATOR: Lazy<Arc<PremiumCalculator>> = Lazy::new(|| Arc::new(PremiumCalculator::default()));
static POLICY: Lazy<Arc<QuotePolicy>> = Lazy::new(|| Arc::new(QuotePolicy::default()));

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Sum insured of the worked example
    pub fn kes_500k() -> Money {
        Money::new(dec!(500000), Currency::KES)
    }

    /// Total payable of the worked example (All Risks, individual)
    pub fn worked_example_total() -> Money {
        Money::new(dec!(27512.50), Currency::KES)
    }

    /// The smallest sum insured the default policy accepts
    pub fn kes_minimum_sum_insured() -> Money {
        Money::new(dec!(10000), Currency::KES)
    }

    pub fn kes_zero() -> Money {
        Money::zero(Currency::KES)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// 09:00 UTC on 18 October 2026, midday in Nairobi
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    /// 22:30 UTC on 17 October 2026, already the 18th in Nairobi
    pub fn late_evening_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 22, 30, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    pub fn yesterday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    pub fn next_month() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 18).unwrap()
    }

    /// A clock frozen at `now()`
    pub fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Self::now()))
    }

    pub fn timezone() -> Timezone {
        Timezone::default()
    }
}

/// Fixture for stores and sessions
pub struct SessionFixtures;

impl SessionFixtures {
    pub const INDIVIDUAL: (&'static str, &'static str) = ("individual", "individual123");
    pub const INTERMEDIARY: (&'static str, &'static str) = ("intermediary", "intermediary123");

    pub fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(InMemoryKeyValueStore::new())
    }

    pub fn directory() -> Arc<CredentialDirectory> {
        Arc::new(CredentialDirectory::demo())
    }

    /// A session service over a fresh store and the given clock
    pub fn service(clock: Arc<FixedClock>) -> SessionService {
        SessionService::new(Self::store(), Self::directory(), clock)
    }
}

/// Fixture for quote forms and stored quotes
pub struct QuoteFixtures;

impl QuoteFixtures {
    /// A wizard context with the standard tables and a fixed clock
    pub fn context(role: ActorRole, clock: Arc<FixedClock>) -> WizardContext {
        WizardContext::new(role, POLICY.clone(), CALCULATOR.clone(), clock, TemporalFixtures::timezone())
    }

    pub fn calculator() -> Arc<PremiumCalculator> {
        CALCULATOR.clone()
    }

    pub fn individual_kyc() -> FormValues {
        FormValues::from_pairs([
            ("account_type", "individual"),
            ("full_name", "Jane Wanjiku"),
            ("email", "jane@example.co.ke"),
            ("kra_pin", "A123456789B"),
            ("phone_number", "0712345678"),
        ])
    }

    pub fn corporate_kyc() -> FormValues {
        FormValues::from_pairs([
            ("account_type", "corporate"),
            ("full_name", "Pwani Traders Ltd"),
            ("email", "accounts@pwanitraders.co.ke"),
            ("kra_pin", "P051234567Q"),
            ("phone_number", "0110000222"),
        ])
    }

    pub fn intermediary_kyc() -> FormValues {
        FormValues::from_pairs([
            ("account_type", "intermediary"),
            ("ira_number", "IRA/05/2026/0001"),
            ("pin_number", "P051234568R"),
        ])
    }

    /// A complete export referral sub-form
    pub fn export_referral() -> FormValues {
        FormValues::from_pairs([
            ("contact_name", "Achieng Otieno"),
            ("contact_email", "achieng@example.co.ke"),
            ("contact_phone", "0722333444"),
            ("destination_country", "Uganda"),
            ("cargo_details", "Forty tonnes of roasted coffee beans in jute sacks"),
        ])
    }

    /// A complete high-risk referral sub-form
    pub fn high_risk_referral() -> FormValues {
        FormValues::from_pairs([
            ("contact_name", "Achieng Otieno"),
            ("contact_email", "achieng@example.co.ke"),
            ("contact_phone", "0722333444"),
            ("additional_information", "Humanitarian medical supplies, consigned to an NGO"),
        ])
    }

    /// A stored marine quote priced at the worked example
    pub fn pending_marine_quote() -> PendingQuote {
        PendingQuote {
            id: QuoteId::new(),
            title: "Marine Cargo - Containerized (import)".to_string(),
            insurance_type: InsuranceType::Marine,
            status: QuoteStatus::Pending,
            created_date: TemporalFixtures::now(),
            quote_details: crate::builders::MarineFormBuilder::new().build(),
            premium: Some(
                CALCULATOR
                    .quote(dec!(500000), "All Risks", ActorRole::Individual)
                    .unwrap(),
            ),
        }
    }
}
