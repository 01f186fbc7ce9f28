//! Quote validation policy
//!
//! Which fields each wizard step requires, and how they are checked, is a
//! pure function of the step, the line of business, the actor's role and
//! (for KYC) the chosen account type. The tunable parts (identifier
//! formats, the minimum sum insured, description limits and the high-risk
//! country list) are configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{FieldRules, FormValues, Pattern, Rule};
use domain_party::kyc::{self, ACCOUNT_TYPE_FIELD};
use domain_party::{AccountType, ActorRole};

use crate::error::QuoteError;
use crate::quote::{InsuranceType, ShipmentMode};
use crate::wizard::{Overlay, WizardStep};

/// Accepted payment method names on the payment step
pub const PAYMENT_METHODS: [&str; 3] = ["stk", "paybill", "card"];

/// How UCR and IDF document numbers are checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Letters and digits, at least `min_length` characters
    FreeForm { min_length: usize },
    /// A fixed prefix followed by an exact digit count
    Structured {
        ucr_prefix: String,
        ucr_digits: usize,
        idf_prefix: String,
        idf_digits: usize,
    },
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        IdentifierPolicy::FreeForm { min_length: 15 }
    }
}

impl IdentifierPolicy {
    /// The conventional structured format
    pub fn structured() -> Self {
        IdentifierPolicy::Structured {
            ucr_prefix: "UCR".to_string(),
            ucr_digits: 12,
            idf_prefix: "IDF".to_string(),
            idf_digits: 11,
        }
    }

    fn rules(&self) -> Result<FieldRules, QuoteError> {
        let rules = match self {
            IdentifierPolicy::FreeForm { min_length } => {
                let checks = || {
                    [
                        Rule::Required,
                        Rule::Pattern(Pattern::alphanumeric()),
                        Rule::MinLength(*min_length),
                    ]
                };
                FieldRules::new()
                    .field("ucr_number", checks())
                    .field("idf_number", checks())
            }
            IdentifierPolicy::Structured {
                ucr_prefix,
                ucr_digits,
                idf_prefix,
                idf_digits,
            } => FieldRules::new()
                .field(
                    "ucr_number",
                    [
                        Rule::Required,
                        Rule::Pattern(Pattern::prefixed_digits("ucr", ucr_prefix, *ucr_digits)?),
                    ],
                )
                .field(
                    "idf_number",
                    [
                        Rule::Required,
                        Rule::Pattern(Pattern::prefixed_digits("idf", idf_prefix, *idf_digits)?),
                    ],
                ),
        };
        Ok(rules)
    }
}

/// Tunable validation settings for the quote wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotePolicy {
    pub identifiers: IdentifierPolicy,
    pub min_sum_insured: Decimal,
    pub description_min_length: usize,
    pub description_max_words: Option<usize>,
    pub high_risk_countries: Vec<String>,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        Self {
            identifiers: IdentifierPolicy::default(),
            min_sum_insured: dec!(10000),
            description_min_length: 20,
            description_max_words: Some(100),
            high_risk_countries: [
                "Afghanistan",
                "Iran",
                "Iraq",
                "Libya",
                "North Korea",
                "Somalia",
                "South Sudan",
                "Sudan",
                "Syria",
                "Yemen",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl QuotePolicy {
    /// True if the origin country is on the high-risk list
    pub fn is_high_risk(&self, country: &str) -> bool {
        let country = country.trim();
        !country.is_empty()
            && self
                .high_risk_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country))
    }

    /// Builds the rules for a wizard step
    ///
    /// # Arguments
    ///
    /// * `step` - The step being submitted
    /// * `insurance_type` - Marine or travel
    /// * `role` - The actor's role; intermediaries must name their client
    /// * `values` - Current form values, used to read the account type and
    ///   payment method discriminators
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::Configuration` if a configured identifier
    /// pattern does not compile
    pub fn rules_for_step(
        &self,
        step: WizardStep,
        insurance_type: InsuranceType,
        role: ActorRole,
        values: &FormValues,
    ) -> Result<FieldRules, QuoteError> {
        let rules = match step {
            WizardStep::Details => {
                let details = match insurance_type {
                    InsuranceType::Marine => self.marine_rules()?,
                    InsuranceType::Travel => travel_rules()?,
                };
                if role.is_intermediary() {
                    details.field("client_name", [Rule::Required])
                } else {
                    details
                }
            }
            WizardStep::Review => FieldRules::new().field("declaration", [Rule::Accepted]),
            WizardStep::Kyc => {
                let selector = FieldRules::new().field(
                    ACCOUNT_TYPE_FIELD,
                    [
                        Rule::Required,
                        Rule::OneOf(AccountType::ALL.iter().map(|t| t.as_str().to_string()).collect()),
                    ],
                );
                match kyc::account_type_of(values) {
                    Some(account_type) => selector.merge(kyc::validators_for(account_type)),
                    None => selector,
                }
            }
            WizardStep::Payment => {
                let method = FieldRules::new()
                    .field("payment_method", [Rule::Required, Rule::one_of(PAYMENT_METHODS)]);
                let is_stk = values
                    .get("payment_method")
                    .is_some_and(|m| m.eq_ignore_ascii_case("stk"));
                if is_stk {
                    method.field(
                        "mpesa_phone",
                        [Rule::Required, Rule::Pattern(Pattern::kenyan_phone())],
                    )
                } else {
                    method
                }
            }
        };
        Ok(rules)
    }

    /// Rules for an overlay sub-form
    pub fn overlay_rules(&self, overlay: Overlay) -> FieldRules {
        let contact = FieldRules::new()
            .field("contact_name", [Rule::Required])
            .field("contact_email", [Rule::Required, Rule::Email])
            .field(
                "contact_phone",
                [Rule::Required, Rule::Pattern(Pattern::kenyan_phone())],
            );
        match overlay {
            Overlay::ExportRequest => contact
                .field("destination_country", [Rule::Required])
                .field("cargo_details", [Rule::Required, Rule::MinLength(self.description_min_length)]),
            Overlay::HighRisk => contact.field(
                "additional_information",
                [Rule::Required, Rule::MinLength(self.description_min_length)],
            ),
        }
    }

    fn marine_rules(&self) -> Result<FieldRules, QuoteError> {
        let mut description = vec![Rule::Required, Rule::MinLength(self.description_min_length)];
        if let Some(max) = self.description_max_words {
            description.push(Rule::MaxWords(max));
        }

        let rules = FieldRules::new()
            .field("cargo_type", [Rule::Required])
            .field("trade_type", [Rule::Required, Rule::one_of(["import", "export"])])
            .field(
                "shipment_mode",
                [
                    Rule::Required,
                    Rule::OneOf(ShipmentMode::ALL.iter().map(|m| m.as_str().to_string()).collect()),
                ],
            )
            .field("marine_product", [Rule::Required])
            .field("cargo_category", [Rule::Required])
            .field("origin_country", [Rule::Required])
            .field("destination", [Rule::Required])
            .field("sum_insured", [Rule::Required, Rule::MinValue(self.min_sum_insured)])
            .field("goods_description", description)
            .merge(self.identifiers.rules()?)
            .field("cover_start", [Rule::Required, Rule::NotInPast]);
        Ok(rules)
    }
}

fn travel_rules() -> Result<FieldRules, QuoteError> {
    let whole_number = Pattern::new("whole_number", r"^[1-9]\d?$", "must be a whole number from 1 to 99")?;
    Ok(FieldRules::new()
        .field("destination", [Rule::Required])
        .field("departure_date", [Rule::Required, Rule::NotInPast])
        .field(
            "return_date",
            [Rule::Required, Rule::After("departure_date".to_string())],
        )
        .field("travellers", [Rule::Required, Rule::Pattern(whole_number)])
        .field("trip_purpose", [Rule::Required]))
}
