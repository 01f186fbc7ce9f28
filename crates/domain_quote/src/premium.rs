//! Premium calculation
//!
//! A marine cargo premium is a base premium (sum insured × product rate)
//! plus statutory charges:
//!
//! ```text
//! base_premium  = sum_insured × product_rate
//! phcf          = base_premium × 0.25%      (or sum_insured × 5%, see PhcfBasis)
//! training_levy = base_premium × 0.25%
//! stamp_duty    = sum_insured × 5%
//! commission    = base_premium × 10%        (intermediaries only)
//! total_payable = base + phcf + levy + stamp − commission
//! ```
//!
//! Amounts keep full decimal precision; [`PremiumBreakdown::rounded`] is
//! the presentation step.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{Currency, Money, Rate};
use domain_party::ActorRole;

use crate::error::QuoteError;
use crate::products::RateTable;

/// What the PHCF levy is charged on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhcfBasis {
    #[default]
    BasePremium,
    SumInsured,
}

/// Whether intermediary commission reduces the amount payable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionTreatment {
    /// Commission is subtracted from the total payable
    #[default]
    Deducted,
    /// Commission is reported but the total is unchanged
    Informational,
}

/// Statutory rates and conventions used to price a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumPolicy {
    pub phcf_basis: PhcfBasis,
    pub phcf_rate: Rate,
    pub training_levy_rate: Rate,
    pub stamp_duty_rate: Rate,
    pub commission_rate: Rate,
    pub commission_treatment: CommissionTreatment,
    pub currency: Currency,
}

impl Default for PremiumPolicy {
    fn default() -> Self {
        Self {
            phcf_basis: PhcfBasis::BasePremium,
            phcf_rate: Rate::new(dec!(0.0025)),
            training_levy_rate: Rate::new(dec!(0.0025)),
            stamp_duty_rate: Rate::new(dec!(0.05)),
            commission_rate: Rate::new(dec!(0.10)),
            commission_treatment: CommissionTreatment::Deducted,
            currency: Currency::KES,
        }
    }
}

impl PremiumPolicy {
    /// The variant that levies PHCF at 5% of the sum insured
    pub fn phcf_on_sum_insured() -> Self {
        Self {
            phcf_basis: PhcfBasis::SumInsured,
            phcf_rate: Rate::new(dec!(0.05)),
            ..Self::default()
        }
    }

    /// Sets how commission affects the total payable
    pub fn with_commission_treatment(mut self, treatment: CommissionTreatment) -> Self {
        self.commission_treatment = treatment;
        self
    }
}

/// Itemized premium for one quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BreakdownRecord", from = "BreakdownRecord")]
pub struct PremiumBreakdown {
    pub base_premium: Money,
    pub phcf: Money,
    pub training_levy: Money,
    pub stamp_duty: Money,
    pub commission: Money,
    pub total_payable: Money,
}

impl PremiumBreakdown {
    pub fn currency(&self) -> Currency {
        self.total_payable.currency()
    }

    /// Every field rounded to the currency's minor unit
    pub fn rounded(&self) -> Self {
        Self {
            base_premium: self.base_premium.round_to_currency(),
            phcf: self.phcf.round_to_currency(),
            training_levy: self.training_levy.round_to_currency(),
            stamp_duty: self.stamp_duty.round_to_currency(),
            commission: self.commission.round_to_currency(),
            total_payable: self.total_payable.round_to_currency(),
        }
    }
}

/// Wire form of a breakdown: bare amounts plus one currency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownRecord {
    base_premium: Decimal,
    phcf: Decimal,
    training_levy: Decimal,
    stamp_duty: Decimal,
    commission: Decimal,
    total_payable: Decimal,
    currency: Currency,
}

impl From<PremiumBreakdown> for BreakdownRecord {
    fn from(b: PremiumBreakdown) -> Self {
        Self {
            base_premium: b.base_premium.amount(),
            phcf: b.phcf.amount(),
            training_levy: b.training_levy.amount(),
            stamp_duty: b.stamp_duty.amount(),
            commission: b.commission.amount(),
            total_payable: b.total_payable.amount(),
            currency: b.currency(),
        }
    }
}

impl From<BreakdownRecord> for PremiumBreakdown {
    fn from(r: BreakdownRecord) -> Self {
        let money = |amount| Money::new(amount, r.currency);
        Self {
            base_premium: money(r.base_premium),
            phcf: money(r.phcf),
            training_levy: money(r.training_levy),
            stamp_duty: money(r.stamp_duty),
            commission: money(r.commission),
            total_payable: money(r.total_payable),
        }
    }
}

/// Computes the premium breakdown for a sum insured at a product rate
///
/// # Errors
///
/// Returns `QuoteError::InvalidSumInsured` unless the sum insured is positive
pub fn compute_premium(
    sum_insured: Money,
    rate: Rate,
    role: ActorRole,
    policy: &PremiumPolicy,
) -> Result<PremiumBreakdown, QuoteError> {
    if !sum_insured.is_positive() {
        return Err(QuoteError::InvalidSumInsured(format!(
            "{} must be greater than zero",
            sum_insured
        )));
    }

    let currency = sum_insured.currency();
    let base_premium = rate.apply(&sum_insured);

    let phcf = match policy.phcf_basis {
        PhcfBasis::BasePremium => policy.phcf_rate.apply(&base_premium),
        PhcfBasis::SumInsured => policy.phcf_rate.apply(&sum_insured),
    };
    let training_levy = policy.training_levy_rate.apply(&base_premium);
    let stamp_duty = policy.stamp_duty_rate.apply(&sum_insured);

    let commission = if role.is_intermediary() {
        policy.commission_rate.apply(&base_premium)
    } else {
        Money::zero(currency)
    };

    let gross = base_premium + phcf + training_levy + stamp_duty;
    let total_payable = match policy.commission_treatment {
        CommissionTreatment::Deducted => gross - commission,
        CommissionTreatment::Informational => gross,
    };

    Ok(PremiumBreakdown {
        base_premium,
        phcf,
        training_levy,
        stamp_duty,
        commission,
        total_payable,
    })
}

/// Prices quotes against a rate table and premium policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumCalculator {
    pub rates: RateTable,
    pub policy: PremiumPolicy,
}

impl PremiumCalculator {
    pub fn new(rates: RateTable, policy: PremiumPolicy) -> Self {
        Self { rates, policy }
    }

    /// Looks up the product rate and computes the breakdown
    ///
    /// # Arguments
    ///
    /// * `sum_insured` - Amount insured, in the policy currency
    /// * `product` - Cover product name or code
    /// * `role` - Role of the actor requesting the quote
    pub fn quote(
        &self,
        sum_insured: Decimal,
        product: &str,
        role: ActorRole,
    ) -> Result<PremiumBreakdown, QuoteError> {
        let rate = match self.rates.find(product) {
            Some(p) => p.rate,
            None => {
                warn!(product, "Unknown cover product, pricing at rate zero");
                Rate::zero()
            }
        };

        let breakdown = compute_premium(
            Money::new(sum_insured, self.policy.currency),
            rate,
            role,
            &self.policy,
        )?;
        debug!(
            product,
            %rate,
            role = %role,
            total = %breakdown.total_payable,
            "Premium computed"
        );
        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kes(amount: Decimal) -> Money {
        Money::new(amount, Currency::KES)
    }

    #[test]
    fn test_all_risks_individual() {
        let breakdown = compute_premium(
            kes(dec!(500000)),
            Rate::new(dec!(0.005)),
            ActorRole::Individual,
            &PremiumPolicy::default(),
        )
        .unwrap();

        assert_eq!(breakdown.base_premium.amount(), dec!(2500));
        assert_eq!(breakdown.phcf.amount(), dec!(6.25));
        assert_eq!(breakdown.training_levy.amount(), dec!(6.25));
        assert_eq!(breakdown.stamp_duty.amount(), dec!(25000));
        assert!(breakdown.commission.is_zero());
        assert_eq!(breakdown.total_payable.amount(), dec!(27512.50));
    }

    #[test]
    fn test_phcf_on_sum_insured_variant() {
        let breakdown = compute_premium(
            kes(dec!(500000)),
            Rate::new(dec!(0.005)),
            ActorRole::Individual,
            &PremiumPolicy::phcf_on_sum_insured(),
        )
        .unwrap();

        assert_eq!(breakdown.phcf.amount(), dec!(25000));
        assert_eq!(breakdown.total_payable.amount(), dec!(52506.25));
    }

    #[test]
    fn test_informational_commission_leaves_total() {
        let policy = PremiumPolicy::default()
            .with_commission_treatment(CommissionTreatment::Informational);
        let individual =
            compute_premium(kes(dec!(200000)), Rate::new(dec!(0.005)), ActorRole::Individual, &policy).unwrap();
        let intermediary =
            compute_premium(kes(dec!(200000)), Rate::new(dec!(0.005)), ActorRole::Intermediary, &policy).unwrap();

        assert_eq!(intermediary.commission.amount(), dec!(100));
        assert_eq!(intermediary.total_payable, individual.total_payable);
    }

    #[test]
    fn test_non_positive_sum_insured_rejected() {
        let policy = PremiumPolicy::default();
        for amount in [dec!(0), dec!(-1)] {
            let result = compute_premium(kes(amount), Rate::new(dec!(0.005)), ActorRole::Individual, &policy);
            assert!(matches!(result, Err(QuoteError::InvalidSumInsured(_))));
        }
    }

    #[test]
    fn test_rounding_is_presentation_only() {
        let breakdown = compute_premium(
            kes(dec!(12345.67)),
            Rate::new(dec!(0.0035)),
            ActorRole::Intermediary,
            &PremiumPolicy::default(),
        )
        .unwrap();

        assert_eq!(breakdown.base_premium.amount(), dec!(43.209845));
        assert_eq!(breakdown.rounded().base_premium.amount(), dec!(43.21));
    }

    #[test]
    fn test_breakdown_wire_format() {
        let breakdown = PremiumCalculator::default()
            .quote(dec!(500000), "All Risks", ActorRole::Individual)
            .unwrap()
            .rounded();
        let json = serde_json::to_value(breakdown).unwrap();

        assert_eq!(json["basePremium"], "2500.00");
        assert_eq!(json["totalPayable"], "27512.50");
        assert_eq!(json["currency"], "KES");

        let back: PremiumBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back, breakdown);
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: PremiumPolicy =
            serde_json::from_str(r#"{"commission_treatment": "informational"}"#).unwrap();
        assert_eq!(policy.commission_treatment, CommissionTreatment::Informational);
        assert_eq!(policy.stamp_duty_rate, Rate::new(dec!(0.05)));
    }
}
