//! Quote Wizard Tests
//!
//! # Test Organization
//!
//! - `step_tests` - advancing, rejecting and going back
//! - `overlay_tests` - export and high-risk overlays
//! - `kyc_tests` - account-type switching on the KYC step
//! - `edit_tests` - reopening a stored quote
//! - `travel_tests` - travel quotes and date ordering

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ErrorKind, FixedClock, FormValues, Timezone};
use domain_party::ActorRole;
use domain_quote::{
    InsuranceType, Overlay, OverlayResolution, PendingQuoteRepository, PremiumCalculator,
    QuoteError, QuotePolicy, QuoteWizard, StepOutcome, WizardContext, WizardStep,
};
use infra_db::InMemoryKeyValueStore;

/// 09:00 UTC on 18 October 2026, midday in Nairobi
fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()))
}

fn context(role: ActorRole, clock: Arc<FixedClock>) -> WizardContext {
    WizardContext::new(
        role,
        Arc::new(QuotePolicy::default()),
        Arc::new(PremiumCalculator::default()),
        clock,
        Timezone::default(),
    )
}

fn marine_details() -> FormValues {
    FormValues::from_pairs([
        ("cargo_type", "Containerized"),
        ("shipment_mode", "sea"),
        ("marine_product", "All Risks"),
        ("cargo_category", "Machinery"),
        ("origin_country", "Germany"),
        ("destination", "Mombasa"),
        ("sum_insured", "500000"),
        ("goods_description", "Industrial milling machine and spare parts"),
        ("ucr_number", "UCR20261018000001"),
        ("idf_number", "IDF20261018000002"),
        ("cover_start", "2026-10-18"),
    ])
}

fn fill(wizard: &mut QuoteWizard, values: &FormValues) {
    for (field, value) in values.iter() {
        wizard.set_field(field, value).unwrap();
    }
}

fn individual_kyc() -> FormValues {
    FormValues::from_pairs([
        ("full_name", "Jane Wanjiku"),
        ("email", "jane@example.co.ke"),
        ("kra_pin", "A123456789B"),
        ("phone_number", "0712345678"),
    ])
}

/// Drives a marine wizard through details, review and KYC
fn complete_marine(wizard: &mut QuoteWizard) -> StepOutcome {
    fill(wizard, &marine_details());
    wizard.submit_step().unwrap();
    wizard.set_field("declaration", "true").unwrap();
    wizard.submit_step().unwrap();
    fill(wizard, &individual_kyc());
    wizard.submit_step().unwrap()
}

// ============================================================================
// STEP TESTS
// ============================================================================

mod step_tests {
    use super::*;

    #[test]
    fn test_details_submit_computes_premium() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());

        let outcome = wizard.submit_step().unwrap();

        let StepOutcome::Advanced { step, premium: Some(premium) } = outcome else {
            panic!("expected advance with premium, got {:?}", outcome);
        };
        assert_eq!(step, WizardStep::Review);
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(premium.rounded().total_payable.amount(), dec!(27512.50));
        assert_eq!(wizard.premium(), Some(&premium));
    }

    #[test]
    fn test_rejected_submit_marks_fields_touched_and_stays() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        wizard.set_field("sum_insured", "9999").unwrap();

        let error = wizard.submit_step().unwrap_err();
        let report = error.report().expect("validation report");

        assert_eq!(wizard.step(), WizardStep::Details);
        assert!(report.has_error("sum_insured", ErrorKind::OutOfRange));
        assert!(report.has_error("cargo_type", ErrorKind::Required));
        assert!(wizard.is_touched("goods_description"));
        assert!(wizard.is_touched("cover_start"));
        assert!(wizard.report().has_errors_for("ucr_number"));
    }

    #[test]
    fn test_yesterday_rejected_today_accepted() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.set_field("cover_start", "2026-10-17").unwrap();

        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("cover_start", ErrorKind::PastDate));

        wizard.set_field("cover_start", "2026-10-18").unwrap();
        assert!(wizard.submit_step().is_ok());
    }

    #[test]
    fn test_correcting_input_recovers() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        let mut details = marine_details();
        details.set("ucr_number", "UCR123");
        fill(&mut wizard, &details);
        assert!(wizard.submit_step().is_err());

        wizard.set_field("ucr_number", "UCR20261018000001").unwrap();
        assert!(wizard.submit_step().is_ok());
        assert!(wizard.report().is_valid());
    }

    #[test]
    fn test_review_requires_declaration() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.submit_step().unwrap();

        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("declaration", ErrorKind::NotAccepted));
        assert_eq!(wizard.step(), WizardStep::Review);
    }

    #[test]
    fn test_back_never_goes_before_first_step() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.submit_step().unwrap();

        assert_eq!(wizard.back(), WizardStep::Details);
        assert_eq!(wizard.back(), WizardStep::Details);
    }

    #[test]
    fn test_kyc_submit_produces_pending_quote() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);

        let StepOutcome::QuoteReady(quote) = complete_marine(&mut wizard) else {
            panic!("expected a quote");
        };

        assert_eq!(wizard.step(), WizardStep::Payment);
        assert_eq!(wizard.quote_id(), Some(quote.id));
        assert_eq!(quote.insurance_type, InsuranceType::Marine);
        assert_eq!(quote.title, "Marine Cargo - Containerized (import)");
        assert_eq!(quote.quote_details.get("kra_pin"), Some("A123456789B"));
        assert_eq!(quote.amount_due().unwrap().amount(), dec!(27512.50));
    }

    #[test]
    fn test_payment_step_selects_method() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        complete_marine(&mut wizard);

        wizard.set_field("payment_method", "stk").unwrap();
        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("mpesa_phone", ErrorKind::Required));

        wizard.set_field("mpesa_phone", "0712345678").unwrap();
        let StepOutcome::PaymentSelected(selection) = wizard.submit_step().unwrap() else {
            panic!("expected a payment selection");
        };
        assert_eq!(selection.method, "stk");
        assert_eq!(selection.phone_number.as_deref(), Some("0712345678"));
        assert_eq!(Some(selection.quote_id), wizard.quote_id());
    }

    #[test]
    fn test_intermediary_needs_client_name_and_earns_commission() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Intermediary, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());

        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("client_name", ErrorKind::Required));

        wizard.set_field("client_name", "Mombasa Traders Ltd").unwrap();
        wizard.submit_step().unwrap();
        assert_eq!(wizard.premium().unwrap().commission.amount(), dec!(250));
    }
}

// ============================================================================
// OVERLAY TESTS
// ============================================================================

mod overlay_tests {
    use super::*;

    fn export_contact() -> FormValues {
        FormValues::from_pairs([
            ("contact_name", "Amina Odhiambo"),
            ("contact_email", "amina@exporters.co.ke"),
            ("contact_phone", "0798765432"),
            ("destination_country", "Netherlands"),
            ("cargo_details", "Fresh cut flowers in refrigerated containers"),
        ])
    }

    #[test]
    fn test_export_opens_overlay_and_blocks_submit() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());

        let opened = wizard.set_field("trade_type", "Export").unwrap();

        assert_eq!(opened, Some(Overlay::ExportRequest));
        assert!(matches!(wizard.submit_step(), Err(QuoteError::OverlayOpen(Overlay::ExportRequest))));
        assert!(matches!(wizard.set_field("cargo_type", "Bulk"), Err(QuoteError::OverlayOpen(_))));
        assert_eq!(wizard.step(), WizardStep::Details);
    }

    #[test]
    fn test_cancel_resets_trade_type_and_origin() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.set_field("trade_type", "export").unwrap();

        let referral = wizard.resolve_overlay(OverlayResolution::Cancel).unwrap();

        assert!(referral.is_none());
        assert_eq!(wizard.overlay(), None);
        assert_eq!(wizard.values().get("trade_type"), Some("import"));
        assert_eq!(wizard.values().get("origin_country"), None);
    }

    #[test]
    fn test_submitting_overlay_raises_referral() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.set_field("trade_type", "export").unwrap();
        fill_overlay(&mut wizard, &export_contact());

        let referral = wizard
            .resolve_overlay(OverlayResolution::Submit)
            .unwrap()
            .expect("referral");

        assert_eq!(referral.kind, Overlay::ExportRequest);
        assert_eq!(referral.origin_country.as_deref(), Some("Germany"));
        assert_eq!(referral.values.get("destination_country"), Some("Netherlands"));
        assert_eq!(wizard.values().get("trade_type"), Some("import"));
        assert!(wizard.overlay_values().is_empty());
    }

    #[test]
    fn test_invalid_overlay_submit_keeps_overlay_open() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        wizard.set_field("trade_type", "export").unwrap();
        wizard.set_overlay_field("contact_email", "not-an-email").unwrap();

        let error = wizard.resolve_overlay(OverlayResolution::Submit).unwrap_err();

        assert!(error.report().unwrap().has_error("contact_email", ErrorKind::Format));
        assert_eq!(wizard.overlay(), Some(Overlay::ExportRequest));
        assert_eq!(wizard.values().get("trade_type"), Some("export"));
    }

    #[test]
    fn test_high_risk_origin_opens_overlay() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);

        let opened = wizard.set_field("origin_country", "Yemen").unwrap();
        assert_eq!(opened, Some(Overlay::HighRisk));

        wizard.resolve_overlay(OverlayResolution::Cancel).unwrap();
        assert_eq!(wizard.values().get("origin_country"), None);

        fill(&mut wizard, &marine_details());
        assert!(wizard.submit_step().is_ok());
    }

    #[test]
    fn test_resolving_without_overlay_is_an_error() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        assert!(matches!(
            wizard.resolve_overlay(OverlayResolution::Cancel),
            Err(QuoteError::NoOverlayOpen)
        ));
        assert!(wizard.set_overlay_field("contact_name", "x").is_err());
    }

    fn fill_overlay(wizard: &mut QuoteWizard, values: &FormValues) {
        for (field, value) in values.iter() {
            wizard.set_overlay_field(field, value).unwrap();
        }
    }
}

// ============================================================================
// KYC TESTS
// ============================================================================

mod kyc_tests {
    use super::*;

    #[test]
    fn test_switching_account_type_clears_other_fields() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.submit_step().unwrap();
        wizard.set_field("declaration", "true").unwrap();
        wizard.submit_step().unwrap();
        fill(&mut wizard, &individual_kyc());

        wizard.set_field("account_type", "intermediary").unwrap();

        assert_eq!(wizard.values().get("full_name"), None);
        assert_eq!(wizard.values().get("kra_pin"), None);
        let error = wizard.submit_step().unwrap_err();
        let report = error.report().unwrap();
        assert!(report.has_error("ira_number", ErrorKind::Required));
        assert!(!report.has_errors_for("email"));

        wizard.set_field("ira_number", "IRA/05/0099/2026").unwrap();
        wizard.set_field("pin_number", "P051234567Q").unwrap();
        assert!(matches!(wizard.submit_step(), Ok(StepOutcome::QuoteReady(_))));
    }
}

// ============================================================================
// EDIT TESTS
// ============================================================================

mod edit_tests {
    use super::*;

    #[tokio::test]
    async fn test_edit_keeps_identity_and_replaces_on_save() {
        let clock = clock();
        let repository = PendingQuoteRepository::new(Arc::new(InMemoryKeyValueStore::new()));

        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock.clone()), InsuranceType::Marine);
        fill(&mut wizard, &marine_details());
        wizard.submit_and_save(&repository).await.unwrap();
        wizard.set_field("declaration", "true").unwrap();
        wizard.submit_and_save(&repository).await.unwrap();
        fill(&mut wizard, &individual_kyc());
        let StepOutcome::QuoteReady(original) = wizard.submit_and_save(&repository).await.unwrap() else {
            panic!("expected a quote");
        };

        clock.advance(Duration::hours(2));
        let mut editor = QuoteWizard::edit(context(ActorRole::Individual, clock.clone()), &original);
        assert!(editor.is_editing());
        assert_eq!(editor.step(), WizardStep::Details);
        assert_eq!(editor.values().get("sum_insured"), Some("500000"));

        editor.set_field("sum_insured", "1000000").unwrap();
        editor.submit_step().unwrap();
        editor.submit_step().unwrap();
        let StepOutcome::QuoteReady(edited) = editor.submit_and_save(&repository).await.unwrap() else {
            panic!("expected a quote");
        };

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_date, original.created_date);
        assert_eq!(edited.premium.unwrap().base_premium.amount(), dec!(5000));

        let stored = repository.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], edited);
    }
}

// ============================================================================
// TRAVEL TESTS
// ============================================================================

mod travel_tests {
    use super::*;

    fn travel_details() -> FormValues {
        FormValues::from_pairs([
            ("destination", "Dubai"),
            ("departure_date", "2026-12-01"),
            ("return_date", "2026-12-08"),
            ("travellers", "2"),
            ("trip_purpose", "Leisure"),
        ])
    }

    #[test]
    fn test_return_must_follow_departure() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Travel);
        let mut details = travel_details();
        details.set("return_date", "2026-12-01");
        fill(&mut wizard, &details);

        let error = wizard.submit_step().unwrap_err();
        let report = error.report().unwrap();
        assert!(report
            .errors_for("return_date")
            .any(|e| e.message == "Return date must be after departure date"));
    }

    #[test]
    fn test_travel_has_no_overlays_and_no_premium() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Travel);
        assert_eq!(wizard.set_field("trade_type", "export").unwrap(), None);
        fill(&mut wizard, &travel_details());

        let outcome = wizard.submit_step().unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Advanced {
                step: WizardStep::Review,
                premium: None
            }
        );

        wizard.set_field("declaration", "yes").unwrap();
        wizard.submit_step().unwrap();
        fill(&mut wizard, &individual_kyc());
        let StepOutcome::QuoteReady(quote) = wizard.submit_step().unwrap() else {
            panic!("expected a quote");
        };
        assert_eq!(quote.title, "Travel - Dubai");
        assert!(quote.premium.is_none());
        assert!(quote.amount_due().is_none());
    }

    #[test]
    fn test_travellers_must_be_a_whole_number() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Travel);
        let mut details = travel_details();
        details.set("travellers", "0");
        fill(&mut wizard, &details);

        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("travellers", ErrorKind::Format));
    }

    #[test]
    fn test_oversized_traveller_count_is_rejected_on_details_step() {
        let mut wizard = QuoteWizard::new(context(ActorRole::Individual, clock()), InsuranceType::Travel);
        let mut details = travel_details();
        details.set("travellers", "99999999999");
        fill(&mut wizard, &details);

        let error = wizard.submit_step().unwrap_err();
        assert!(error.report().unwrap().has_error("travellers", ErrorKind::Format));
        assert_eq!(wizard.step(), WizardStep::Details);

        details.set("travellers", "99");
        fill(&mut wizard, &details);
        assert!(wizard.submit_step().is_ok());
    }
}
