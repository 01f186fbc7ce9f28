//! Premium Engine Tests
//!
//! # Test Organization
//!
//! - `worked_example_tests` - the reference All Risks quote
//! - `role_tests` - commission behavior for intermediaries
//! - `property_tests` - proptest invariants over arbitrary sums insured

use core_kernel::{Currency, Money, Rate};
use domain_party::ActorRole;
use domain_quote::{compute_premium, PremiumCalculator, PremiumPolicy, QuoteError, RateTable};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ============================================================================
// WORKED EXAMPLE TESTS
// ============================================================================

mod worked_example_tests {
    use super::*;

    /// 500,000 KES of All Risks cover for an individual
    #[test]
    fn test_all_risks_500k_individual() {
        let premium = PremiumCalculator::default()
            .quote(dec!(500000), "All Risks", ActorRole::Individual)
            .unwrap()
            .rounded();

        assert_eq!(premium.base_premium.amount(), dec!(2500.00));
        assert_eq!(premium.phcf.amount(), dec!(6.25));
        assert_eq!(premium.training_levy.amount(), dec!(6.25));
        assert_eq!(premium.stamp_duty.amount(), dec!(25000.00));
        assert_eq!(premium.commission.amount(), dec!(0));
        // base + phcf + levy + stamp duty
        assert_eq!(premium.total_payable.amount(), dec!(27512.50));
        assert_eq!(premium.currency(), Currency::KES);
    }

    #[test]
    fn test_unknown_product_charges_only_stamp_duty() {
        let premium = PremiumCalculator::default()
            .quote(dec!(100000), "Warehouse to Warehouse", ActorRole::Individual)
            .unwrap();

        assert!(premium.base_premium.is_zero());
        assert!(premium.phcf.is_zero());
        assert_eq!(premium.total_payable.amount(), dec!(5000));
    }

    #[test]
    fn test_product_code_prices_like_name() {
        let calculator = PremiumCalculator::new(RateTable::standard(), PremiumPolicy::default());
        let by_name = calculator.quote(dec!(750000), "Named Perils", ActorRole::Individual).unwrap();
        let by_code = calculator.quote(dec!(750000), "ICC-B", ActorRole::Individual).unwrap();

        assert_eq!(by_name, by_code);
    }

    #[test]
    fn test_zero_sum_insured_is_an_error() {
        let result = PremiumCalculator::default().quote(dec!(0), "All Risks", ActorRole::Individual);
        assert!(matches!(result, Err(QuoteError::InvalidSumInsured(_))));
    }
}

// ============================================================================
// ROLE TESTS
// ============================================================================

mod role_tests {
    use super::*;

    #[test]
    fn test_intermediary_commission_is_ten_percent_of_base() {
        let premium = PremiumCalculator::default()
            .quote(dec!(500000), "All Risks", ActorRole::Intermediary)
            .unwrap();

        assert_eq!(premium.commission.amount(), dec!(250));
        assert_eq!(premium.total_payable.amount(), dec!(27262.50));
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

fn sum_insured_strategy() -> impl Strategy<Value = Decimal> {
    // 0.01 .. 1,000,000,000.00 in cents
    (1i64..100_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn rate_strategy() -> impl Strategy<Value = Rate> {
    prop_oneof![Just(dec!(0.005)), Just(dec!(0.0035)), Just(dec!(0.0025))].prop_map(Rate::new)
}

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn base_premium_is_sum_times_rate(sum in sum_insured_strategy(), rate in rate_strategy()) {
            let sum_insured = Money::new(sum, Currency::KES);
            let premium = compute_premium(sum_insured, rate, ActorRole::Individual, &PremiumPolicy::default()).unwrap();

            prop_assert_eq!(premium.base_premium.amount(), sum * rate.as_decimal());
            prop_assert!(premium.total_payable.amount() >= premium.base_premium.amount());
            prop_assert!(premium.commission.is_zero());
        }

        #[test]
        fn intermediary_pays_exactly_the_commission_less(sum in sum_insured_strategy(), rate in rate_strategy()) {
            let policy = PremiumPolicy::default();
            let sum_insured = Money::new(sum, Currency::KES);
            let individual = compute_premium(sum_insured, rate, ActorRole::Individual, &policy).unwrap();
            let intermediary = compute_premium(sum_insured, rate, ActorRole::Intermediary, &policy).unwrap();

            let difference = individual.total_payable.amount() - intermediary.total_payable.amount();
            prop_assert_eq!(difference, individual.base_premium.amount() * dec!(0.10));
            prop_assert!(intermediary.total_payable.amount() < individual.total_payable.amount());
        }

        #[test]
        fn every_component_is_non_negative(sum in sum_insured_strategy(), rate in rate_strategy()) {
            let sum_insured = Money::new(sum, Currency::KES);
            for role in [ActorRole::Individual, ActorRole::Intermediary] {
                let p = compute_premium(sum_insured, rate, role, &PremiumPolicy::phcf_on_sum_insured()).unwrap();
                for part in [p.base_premium, p.phcf, p.training_levy, p.stamp_duty, p.commission, p.total_payable] {
                    prop_assert!(!part.is_negative());
                }
            }
        }
    }
}
