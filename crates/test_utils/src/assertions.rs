//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::{ErrorKind, Money, Rate, ValidationReport};
use domain_party::ActorRole;
use domain_quote::{PremiumBreakdown, PremiumPolicy};

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is not negative
pub fn assert_money_non_negative(money: &Money) {
    assert!(!money.is_negative(), "Expected non-negative money, got {}", money);
}

/// Asserts that the report has an error of the given kind on the field
pub fn assert_field_error(report: &ValidationReport, field: &str, kind: ErrorKind) {
    assert!(
        report.has_error(field, kind),
        "Expected {:?} on {}, got: {:?}",
        kind,
        field,
        report.errors()
    );
}

/// Asserts that the report has no error on the field
pub fn assert_field_ok(report: &ValidationReport, field: &str) {
    let errors: Vec<_> = report.errors_for(field).collect();
    assert!(errors.is_empty(), "Expected {} to pass, got: {:?}", field, errors);
}

/// Asserts that every part of a breakdown follows from the sum insured
///
/// Checks base = sum x rate, the levies on the configured bases, the
/// commission by role and that the total is the sum of its parts.
pub fn assert_breakdown_consistent(
    breakdown: &PremiumBreakdown,
    sum_insured: Decimal,
    rate: Rate,
    role: ActorRole,
    policy: &PremiumPolicy,
) {
    use domain_quote::{CommissionTreatment, PhcfBasis};

    let base = sum_insured * rate.as_decimal();
    assert_eq!(breakdown.base_premium.amount(), base, "base premium");

    let phcf_basis = match policy.phcf_basis {
        PhcfBasis::BasePremium => base,
        PhcfBasis::SumInsured => sum_insured,
    };
    assert_eq!(breakdown.phcf.amount(), phcf_basis * policy.phcf_rate.as_decimal(), "phcf");
    assert_eq!(
        breakdown.training_levy.amount(),
        base * policy.training_levy_rate.as_decimal(),
        "training levy"
    );
    assert_eq!(
        breakdown.stamp_duty.amount(),
        sum_insured * policy.stamp_duty_rate.as_decimal(),
        "stamp duty"
    );

    let commission = if role.is_intermediary() {
        base * policy.commission_rate.as_decimal()
    } else {
        Decimal::ZERO
    };
    assert_eq!(breakdown.commission.amount(), commission, "commission");

    let mut total = base + breakdown.phcf.amount() + breakdown.training_levy.amount() + breakdown.stamp_duty.amount();
    if policy.commission_treatment == CommissionTreatment::Deducted {
        total -= commission;
    }
    assert_eq!(breakdown.total_payable.amount(), total, "total payable");
}
