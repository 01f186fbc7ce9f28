//! KYC (Know Your Customer) field rules
//!
//! The KYC step asks for a different set of fields depending on the account
//! type: individuals and corporates identify themselves by name, email, KRA
//! PIN and phone; intermediaries by their IRA licence number and PIN.
//! Rule sets are built by [`validators_for`]; changing the account type is
//! done with [`switch_account_type`], which also clears the fields that no
//! longer apply.

use core_kernel::{FieldRules, FormValues, Pattern, Rule};

use crate::role::AccountType;

/// Form field holding the account type
pub const ACCOUNT_TYPE_FIELD: &str = "account_type";

/// Fields collected from individual and corporate accounts
pub const CUSTOMER_FIELDS: [&str; 4] = ["full_name", "email", "kra_pin", "phone_number"];

/// Fields collected from intermediaries
pub const INTERMEDIARY_FIELDS: [&str; 2] = ["ira_number", "pin_number"];

/// The KYC fields an account type must supply
pub fn fields_for(account_type: AccountType) -> &'static [&'static str] {
    match account_type {
        AccountType::Individual | AccountType::Corporate => &CUSTOMER_FIELDS,
        AccountType::Intermediary => &INTERMEDIARY_FIELDS,
    }
}

/// Builds the KYC rule set for an account type
pub fn validators_for(account_type: AccountType) -> FieldRules {
    match account_type {
        AccountType::Individual | AccountType::Corporate => FieldRules::new()
            .field("full_name", [Rule::Required])
            .field("email", [Rule::Required, Rule::Email])
            .field("kra_pin", [Rule::Required, Rule::Pattern(Pattern::kra_pin())])
            .field(
                "phone_number",
                [Rule::Required, Rule::Pattern(Pattern::kenyan_phone())],
            ),
        AccountType::Intermediary => FieldRules::new()
            .field("ira_number", [Rule::Required])
            .field("pin_number", [Rule::Required, Rule::Pattern(Pattern::kra_pin())]),
    }
}

/// Reads the account type from the form, if one has been chosen
pub fn account_type_of(values: &FormValues) -> Option<AccountType> {
    values.get(ACCOUNT_TYPE_FIELD).and_then(|v| v.parse().ok())
}

/// Changes the account type and clears the fields of the other set
///
/// Returns the names of the fields whose values were discarded.
pub fn switch_account_type(values: &mut FormValues, account_type: AccountType) -> Vec<&'static str> {
    values.set(ACCOUNT_TYPE_FIELD, account_type.as_str());

    let keep = fields_for(account_type);
    let mut cleared = Vec::new();
    for field in CUSTOMER_FIELDS.into_iter().chain(INTERMEDIARY_FIELDS) {
        if !keep.contains(&field) && values.clear(field).is_some() {
            cleared.push(field);
        }
    }
    cleared
}
