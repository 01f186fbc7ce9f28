//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, Rate};
use domain_party::ActorRole;
use domain_quote::{ShipmentMode, TradeType};

/// Strategy for positive sums insured, in whole shillings up to 1 billion
pub fn sum_insured_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(Decimal::from)
}

/// Strategy for sums insured with cents
pub fn sum_insured_with_cents_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for KES amounts, possibly negative
pub fn kes_money_strategy() -> impl Strategy<Value = Money> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(|minor| Money::from_minor(minor, Currency::KES))
}

/// Strategy for product rates between 0 and 1%
pub fn product_rate_strategy() -> impl Strategy<Value = Rate> {
    (0u32..=100u32).prop_map(|n| Rate::new(Decimal::new(n as i64, 4)))
}

/// Strategy for product keys: the standard names and codes plus unknown ones
pub fn product_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("All Risks".to_string()),
        Just("Named Perils".to_string()),
        Just("Limited Perils".to_string()),
        Just("ICC-A".to_string()),
        Just("icc-b".to_string()),
        "[A-Za-z ]{1,20}",
    ]
}

pub fn role_strategy() -> impl Strategy<Value = ActorRole> {
    prop_oneof![Just(ActorRole::Individual), Just(ActorRole::Intermediary)]
}

pub fn shipment_mode_strategy() -> impl Strategy<Value = ShipmentMode> {
    prop::sample::select(ShipmentMode::ALL.to_vec())
}

pub fn trade_type_strategy() -> impl Strategy<Value = TradeType> {
    prop_oneof![Just(TradeType::Import), Just(TradeType::Export)]
}

/// Strategy for usernames with stray case and surrounding whitespace
pub fn messy_username_strategy(username: &'static str) -> impl Strategy<Value = String> {
    (" {0,3}", " {0,3}", proptest::collection::vec(any::<bool>(), username.len())).prop_map(
        move |(lead, trail, upper)| {
            let body: String = username
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            format!("{}{}{}", lead, body, trail)
        },
    )
}

/// Strategy for valid Kenyan mobile numbers
pub fn kenyan_phone_strategy() -> impl Strategy<Value = String> {
    "0[17][0-9]{8}"
}
