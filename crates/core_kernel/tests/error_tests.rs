//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::ports::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Quote not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Quote not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("KES".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_core_error_from_port_error() {
    let core_error: CoreError = PortError::conflict("duplicate quote").into();

    assert!(matches!(core_error, CoreError::Port(PortError::Conflict { .. })));
    assert!(core_error.to_string().contains("duplicate quote"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing rate table");

    assert!(error.to_string().contains("Configuration error"));
    assert!(error.to_string().contains("Missing rate table"));
}
