//! Quote wizard
//!
//! The wizard walks a user through four steps:
//!
//! ```text
//! 1 Details ──submit──▶ 2 Review ──submit──▶ 3 KYC ──submit──▶ 4 Payment
//!     ▲                    │                    │
//!     └──────── back ──────┴─────── back ───────┘
//! ```
//!
//! Steps only change on an explicit submit or back. A submit is rejected,
//! with every field of the step marked as touched, when any rule fails.
//!
//! # Overlays
//!
//! On a marine quote, choosing the `export` trade type opens the export
//! request overlay and choosing a high-risk origin country opens the
//! high-risk overlay. While an overlay is open the main form cannot be
//! edited or submitted. Resolving the overlay (submitting its sub-form or
//! cancelling) resets the trade type to `import` and clears the origin
//! country; a submitted overlay produces a [`ReferralRequest`] for manual
//! underwriting.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{Clock, FormValues, QuoteId, ReferralId, Timezone, ValidationReport};
use domain_party::kyc::{self, ACCOUNT_TYPE_FIELD};
use domain_party::{AccountType, ActorRole};

use crate::error::QuoteError;
use crate::pending::{PendingQuote, PendingQuoteRepository};
use crate::policy::QuotePolicy;
use crate::premium::{PremiumBreakdown, PremiumCalculator};
use crate::quote::{InsuranceType, MarineQuoteRequest, QuoteDetails, QuoteStatus, TradeType};

/// A wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Details,
    Review,
    Kyc,
    Payment,
}

impl WizardStep {
    /// 1-based position of the step
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Details => 1,
            WizardStep::Review => 2,
            WizardStep::Kyc => 3,
            WizardStep::Payment => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WizardStep::Details),
            2 => Some(WizardStep::Review),
            3 => Some(WizardStep::Kyc),
            4 => Some(WizardStep::Payment),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Details => "Quote details",
            WizardStep::Review => "Review premium",
            WizardStep::Kyc => "Know your customer",
            WizardStep::Payment => "Payment",
        }
    }
}

/// An auxiliary sub-form that blocks the main form until resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    ExportRequest,
    HighRisk,
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overlay::ExportRequest => f.write_str("export request"),
            Overlay::HighRisk => f.write_str("high-risk country"),
        }
    }
}

/// How an open overlay is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayResolution {
    Submit,
    Cancel,
}

/// A request for manual underwriting raised from an overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    pub id: ReferralId,
    pub kind: Overlay,
    pub trade_type: TradeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    /// The overlay sub-form values
    pub values: FormValues,
    /// The main form as it stood when the overlay opened
    pub quote_values: FormValues,
    pub requested_at: DateTime<Utc>,
}

/// The payment choice made on the last step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSelection {
    pub quote_id: QuoteId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// What a successful submit produced
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved to the next step; carries the premium when one was computed
    Advanced {
        step: WizardStep,
        premium: Option<PremiumBreakdown>,
    },
    /// The KYC step completed and the quote is ready to be stored
    QuoteReady(PendingQuote),
    /// The payment step completed
    PaymentSelected(PaymentSelection),
}

/// Collaborators shared by every wizard of a user
#[derive(Clone)]
pub struct WizardContext {
    pub role: ActorRole,
    pub policy: Arc<QuotePolicy>,
    pub calculator: Arc<PremiumCalculator>,
    pub clock: Arc<dyn Clock>,
    pub timezone: Timezone,
}

impl WizardContext {
    pub fn new(
        role: ActorRole,
        policy: Arc<QuotePolicy>,
        calculator: Arc<PremiumCalculator>,
        clock: Arc<dyn Clock>,
        timezone: Timezone,
    ) -> Self {
        Self {
            role,
            policy,
            calculator,
            clock,
            timezone,
        }
    }

    /// Today's calendar day in the configured timezone
    pub fn today(&self) -> NaiveDate {
        self.timezone.today(self.clock.as_ref())
    }
}

impl fmt::Debug for WizardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardContext")
            .field("role", &self.role)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

/// Identity carried over when an existing quote is edited
#[derive(Debug, Clone, Copy)]
struct QuoteIdentity {
    id: QuoteId,
    created: DateTime<Utc>,
}

/// The state of one pass through the quote wizard
#[derive(Debug, Clone)]
pub struct QuoteWizard {
    ctx: WizardContext,
    insurance_type: InsuranceType,
    step: WizardStep,
    values: FormValues,
    touched: BTreeSet<String>,
    report: ValidationReport,
    overlay: Option<Overlay>,
    overlay_values: FormValues,
    premium: Option<PremiumBreakdown>,
    identity: Option<QuoteIdentity>,
}

impl QuoteWizard {
    /// Starts a new quote at the details step
    pub fn new(ctx: WizardContext, insurance_type: InsuranceType) -> Self {
        let mut values = FormValues::new();
        if insurance_type == InsuranceType::Marine {
            values.set("trade_type", TradeType::Import.as_str());
        }
        values.set(ACCOUNT_TYPE_FIELD, default_account_type(ctx.role).as_str());

        Self {
            ctx,
            insurance_type,
            step: WizardStep::Details,
            values,
            touched: BTreeSet::new(),
            report: ValidationReport::ok(),
            overlay: None,
            overlay_values: FormValues::new(),
            premium: None,
            identity: None,
        }
    }

    /// Reopens a stored quote for editing
    ///
    /// Completing the KYC step again produces a quote with the same id and
    /// creation date, so storing it replaces the original.
    pub fn edit(ctx: WizardContext, quote: &PendingQuote) -> Self {
        let mut wizard = Self::new(ctx, quote.insurance_type);
        wizard.values.extend(quote.quote_details.clone());
        wizard.premium = quote.premium;
        wizard.identity = Some(QuoteIdentity {
            id: quote.id,
            created: quote.created_date,
        });
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn insurance_type(&self) -> InsuranceType {
        self.insurance_type
    }

    pub fn role(&self) -> ActorRole {
        self.ctx.role
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn overlay_values(&self) -> &FormValues {
        &self.overlay_values
    }

    pub fn premium(&self) -> Option<&PremiumBreakdown> {
        self.premium.as_ref()
    }

    /// The id of the quote being edited, or of the quote produced so far
    pub fn quote_id(&self) -> Option<QuoteId> {
        self.identity.map(|i| i.id)
    }

    pub fn is_editing(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Field errors from the last rejected submit
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Sets a main-form field and applies its side effects
    ///
    /// Returns the overlay the change opened, if any. Changing the account
    /// type clears the KYC fields of the previous type.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::OverlayOpen` while an overlay is open
    pub fn set_field(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Option<Overlay>, QuoteError> {
        if let Some(open) = self.overlay {
            return Err(QuoteError::OverlayOpen(open));
        }

        let value = value.into();
        self.touched.insert(field.to_string());

        if field == ACCOUNT_TYPE_FIELD {
            if let Ok(account_type) = value.parse::<AccountType>() {
                let cleared = kyc::switch_account_type(&mut self.values, account_type);
                debug!(?cleared, account_type = %account_type, "Account type switched");
                return Ok(None);
            }
        }

        let opened = self.overlay_for(field, &value);
        self.values.set(field, value);

        if let Some(overlay) = opened {
            self.overlay = Some(overlay);
            self.overlay_values = FormValues::new();
            info!(%overlay, "Overlay opened");
        }
        Ok(opened)
    }

    /// Sets a field of the open overlay's sub-form
    pub fn set_overlay_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), QuoteError> {
        if self.overlay.is_none() {
            return Err(QuoteError::NoOverlayOpen);
        }
        self.overlay_values.set(field, value);
        Ok(())
    }

    /// Closes the open overlay
    ///
    /// Submitting validates the sub-form first; on failure the overlay
    /// stays open. Either way a closed overlay resets the trade type to
    /// `import` and clears the origin country.
    pub fn resolve_overlay(
        &mut self,
        resolution: OverlayResolution,
    ) -> Result<Option<ReferralRequest>, QuoteError> {
        let overlay = self.overlay.ok_or(QuoteError::NoOverlayOpen)?;

        let referral = match resolution {
            OverlayResolution::Submit => {
                self.ctx
                    .policy
                    .overlay_rules(overlay)
                    .validate(&self.overlay_values, self.ctx.today())
                    .into_result()?;

                Some(ReferralRequest {
                    id: ReferralId::new(),
                    kind: overlay,
                    trade_type: self
                        .values
                        .get("trade_type")
                        .and_then(|t| t.parse().ok())
                        .unwrap_or_default(),
                    origin_country: self.values.get("origin_country").map(str::to_string),
                    values: std::mem::take(&mut self.overlay_values),
                    quote_values: self.values.clone(),
                    requested_at: self.ctx.clock.now(),
                })
            }
            OverlayResolution::Cancel => None,
        };

        self.values.set("trade_type", TradeType::Import.as_str());
        self.values.clear("origin_country");
        self.overlay = None;
        self.overlay_values = FormValues::new();

        info!(%overlay, ?resolution, "Overlay closed");
        Ok(referral)
    }

    /// Submits the current step
    ///
    /// # Errors
    ///
    /// - `QuoteError::OverlayOpen` while an overlay is open
    /// - `QuoteError::Validation` if a rule fails; the step is unchanged
    ///   and every field of the step is marked touched
    pub fn submit_step(&mut self) -> Result<StepOutcome, QuoteError> {
        if let Some(open) = self.overlay {
            return Err(QuoteError::OverlayOpen(open));
        }

        let rules = self.ctx.policy.rules_for_step(
            self.step,
            self.insurance_type,
            self.ctx.role,
            &self.values,
        )?;
        let report = rules.validate(&self.values, self.ctx.today());
        if !report.is_valid() {
            self.touched.extend(rules.field_names().map(str::to_string));
            self.report = report.clone();
            debug!(step = self.step.number(), errors = report.errors().len(), "Step rejected");
            return Err(QuoteError::Validation(report));
        }
        self.report = ValidationReport::ok();

        let outcome = match self.step {
            WizardStep::Details => {
                self.premium = match self.insurance_type {
                    InsuranceType::Marine => {
                        let request = MarineQuoteRequest::from_values(&self.values)?;
                        Some(self.ctx.calculator.quote(
                            request.sum_insured,
                            &request.marine_product,
                            self.ctx.role,
                        )?)
                    }
                    InsuranceType::Travel => None,
                };
                self.advance(WizardStep::Review);
                StepOutcome::Advanced {
                    step: WizardStep::Review,
                    premium: self.premium,
                }
            }
            WizardStep::Review => {
                self.advance(WizardStep::Kyc);
                StepOutcome::Advanced {
                    step: WizardStep::Kyc,
                    premium: self.premium,
                }
            }
            WizardStep::Kyc => {
                let quote = self.build_quote()?;
                self.advance(WizardStep::Payment);
                StepOutcome::QuoteReady(quote)
            }
            WizardStep::Payment => {
                let quote_id = self
                    .quote_id()
                    .ok_or_else(|| QuoteError::InvalidState("no quote to pay for".to_string()))?;
                let method = self.values.get("payment_method").unwrap_or_default().to_ascii_lowercase();
                let phone_number = if method == "stk" {
                    self.values.get("mpesa_phone").map(str::to_string)
                } else {
                    None
                };
                StepOutcome::PaymentSelected(PaymentSelection {
                    quote_id,
                    method,
                    phone_number,
                })
            }
        };
        Ok(outcome)
    }

    /// Submits the current step and stores the quote when one is produced
    pub async fn submit_and_save(
        &mut self,
        repository: &PendingQuoteRepository,
    ) -> Result<StepOutcome, QuoteError> {
        let outcome = self.submit_step()?;
        if let StepOutcome::QuoteReady(quote) = &outcome {
            repository.upsert(quote.clone()).await?;
        }
        Ok(outcome)
    }

    /// Returns to the previous step; the first step stays put
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            debug!(from = self.step.number(), to = previous.number(), "Wizard back");
            self.step = previous;
        }
        self.step
    }

    fn advance(&mut self, to: WizardStep) {
        debug!(from = self.step.number(), to = to.number(), "Wizard advanced");
        self.step = to;
    }

    fn overlay_for(&self, field: &str, value: &str) -> Option<Overlay> {
        if self.insurance_type != InsuranceType::Marine {
            return None;
        }
        match field {
            "trade_type" if value.trim().eq_ignore_ascii_case(TradeType::Export.as_str()) => {
                Some(Overlay::ExportRequest)
            }
            "origin_country" if self.ctx.policy.is_high_risk(value) => Some(Overlay::HighRisk),
            _ => None,
        }
    }

    fn build_quote(&mut self) -> Result<PendingQuote, QuoteError> {
        let details = QuoteDetails::from_values(self.insurance_type, &self.values)?;
        let now = self.ctx.clock.now();
        let identity = *self.identity.get_or_insert_with(|| QuoteIdentity {
            id: QuoteId::new(),
            created: now,
        });

        let payment_fields = ["payment_method", "mpesa_phone"];
        let mut quote_details = self.values.clone();
        for field in payment_fields {
            quote_details.clear(field);
        }

        Ok(PendingQuote {
            id: identity.id,
            title: details.title(),
            insurance_type: self.insurance_type,
            status: QuoteStatus::Pending,
            created_date: identity.created,
            quote_details,
            premium: self.premium,
        })
    }
}

fn default_account_type(role: ActorRole) -> AccountType {
    match role {
        ActorRole::Individual => AccountType::Individual,
        ActorRole::Intermediary => AccountType::Intermediary,
    }
}
