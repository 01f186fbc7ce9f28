//! Declarative field validation
//!
//! Forms in the quoting flow are validated against `FieldRules`: an ordered
//! list of fields, each with the rules that apply to it. Rule sets are plain
//! values built by pure functions (for example "the KYC rules for a corporate
//! account"), so switching a discriminator means building a different rule
//! set rather than mutating validator state on individual controls.
//!
//! # Rule semantics
//!
//! - `Required` fails on a missing or blank value; the field's other rules are
//!   then skipped.
//! - Every other rule except `Accepted` passes on an empty value, so optional
//!   fields are only checked when filled in.
//! - Date rules compare calendar days (`YYYY-MM-DD`), never times of day.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use core_kernel::validation::{FieldRules, FormValues, Rule, Pattern, ErrorKind};
//!
//! let rules = FieldRules::new()
//!     .field("phone_number", [Rule::Required, Rule::Pattern(Pattern::kenyan_phone())]);
//!
//! let values = FormValues::from_pairs([("phone_number", "0812345678")]);
//! let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
//! let report = rules.validate(&values, today);
//!
//! assert!(report.has_error("phone_number", ErrorKind::Format));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

static KENYAN_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[17]\d{8}$").expect("invalid phone pattern"));

static KRA_PIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z]\d{9}[a-z]$").expect("invalid KRA PIN pattern"));

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("invalid alphanumeric pattern"));

/// Raw form values keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds values from `(field, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the trimmed value, or `None` when missing or blank
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns the untrimmed value, or an empty string when missing
    pub fn raw(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    /// Sets a field value, returning the previous one
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(field.into(), value.into())
    }

    /// Removes a field value
    pub fn clear(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    /// Copies every value from `other`, overwriting existing fields
    pub fn extend(&mut self, other: FormValues) {
        self.0.extend(other.0);
    }

    /// Returns a copy containing only the given fields
    pub fn select<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> FormValues {
        FormValues(
            fields
                .into_iter()
                .filter_map(|f| self.0.get(f).map(|v| (f.to_string(), v.clone())))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named regular expression with a human-readable hint
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    regex: Regex,
    hint: String,
}

impl Pattern {
    /// Compiles a pattern
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if the expression does not compile
    pub fn new(
        name: impl Into<String>,
        expression: &str,
        hint: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let regex = Regex::new(expression).map_err(|e| {
            CoreError::Configuration(format!("pattern {}: {}", name, e))
        })?;
        Ok(Self {
            name,
            regex,
            hint: hint.into(),
        })
    }

    /// Kenyan mobile number: "07" or "01" followed by 8 digits
    pub fn kenyan_phone() -> Self {
        Self {
            name: "kenyan_phone".to_string(),
            regex: KENYAN_PHONE.clone(),
            hint: "must start with 07 or 01 followed by 8 digits".to_string(),
        }
    }

    /// KRA PIN: one letter, nine digits, one letter
    pub fn kra_pin() -> Self {
        Self {
            name: "kra_pin".to_string(),
            regex: KRA_PIN.clone(),
            hint: "must be a letter, 9 digits and a letter (e.g. A123456789B)".to_string(),
        }
    }

    /// Letters and digits only
    pub fn alphanumeric() -> Self {
        Self {
            name: "alphanumeric".to_string(),
            regex: ALPHANUMERIC.clone(),
            hint: "must contain only letters and digits".to_string(),
        }
    }

    /// A fixed prefix followed by an exact number of digits
    pub fn prefixed_digits(name: impl Into<String>, prefix: &str, digits: usize) -> Result<Self, CoreError> {
        let expression = format!("(?i)^{}\\d{{{}}}$", regex::escape(prefix), digits);
        Self::new(
            name,
            &expression,
            format!("must be {} followed by {} digits", prefix, digits),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A single validation rule
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and non-blank
    Required,
    /// Value must be an email address
    Email,
    /// Value must parse as a number no smaller than the bound
    MinValue(Decimal),
    /// Value must match the pattern
    Pattern(Pattern),
    /// Value must have at least this many characters
    MinLength(usize),
    /// Value must have at most this many whitespace-separated words
    MaxWords(usize),
    /// Value must be a date no earlier than today
    NotInPast,
    /// Value must be a date strictly after the date in the named field
    After(String),
    /// Value must equal the value of the named field
    SameAs(String),
    /// Value must be an affirmative checkbox value
    Accepted,
    /// Value must be one of the listed choices (case-insensitive)
    OneOf(Vec<String>),
}

impl Rule {
    /// Convenience constructor for `OneOf`
    pub fn one_of<'a>(choices: impl IntoIterator<Item = &'a str>) -> Self {
        Rule::OneOf(choices.into_iter().map(str::to_string).collect())
    }
}

/// Category of a field error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    Format,
    OutOfRange,
    TooShort,
    TooLong,
    PastDate,
    DateOrder,
    Mismatch,
    NotAccepted,
    InvalidChoice,
}

/// A failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of validating a form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// A report with no errors
    pub fn ok() -> Self {
        Self::default()
    }

    /// Whether every rule passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors attached to one field
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Whether the field failed with the given kind
    pub fn has_error(&self, field: &str, kind: ErrorKind) -> bool {
        self.errors_for(field).any(|e| e.kind == kind)
    }

    /// Whether the field failed any rule
    pub fn has_errors_for(&self, field: &str) -> bool {
        self.errors_for(field).next().is_some()
    }

    /// Adds an error
    pub fn add(&mut self, field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    /// Merges another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    /// Converts into `Ok(())` when valid
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Ordered rules for a set of fields
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds rules for a field, appending to any rules it already has
    pub fn field(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => existing.extend(rules),
            None => self.fields.push((name, rules.into_iter().collect())),
        }
        self
    }

    /// Combines two rule sets
    pub fn merge(mut self, other: FieldRules) -> Self {
        for (name, rules) in other.fields {
            self = self.field(name, rules);
        }
        self
    }

    /// Names of the fields that carry rules, in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == field)
    }

    pub fn rules_for(&self, field: &str) -> &[Rule] {
        self.fields
            .iter()
            .find(|(n, _)| n == field)
            .map(|(_, r)| r.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validates values against every rule
    ///
    /// # Arguments
    ///
    /// * `values` - The raw form values
    /// * `today` - The calendar day used by date rules
    pub fn validate(&self, values: &FormValues, today: NaiveDate) -> ValidationReport {
        let mut report = ValidationReport::ok();
        for (field, rules) in &self.fields {
            check_field(field, rules, values, today, &mut report);
        }
        report
    }
}

fn check_field(
    field: &str,
    rules: &[Rule],
    values: &FormValues,
    today: NaiveDate,
    report: &mut ValidationReport,
) {
    let label = humanize(field);
    let value = values.get(field);

    if value.is_none() && rules.iter().any(|r| matches!(r, Rule::Required)) {
        report.add(field, ErrorKind::Required, format!("{} is required", label));
        return;
    }

    for rule in rules {
        if let Rule::Accepted = rule {
            let accepted = value.is_some_and(|v| {
                matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1")
            });
            if !accepted {
                report.add(field, ErrorKind::NotAccepted, format!("{} must be accepted", label));
            }
            continue;
        }

        let Some(value) = value else {
            continue;
        };

        match rule {
            Rule::Required | Rule::Accepted => {}
            Rule::Email => {
                if !value.validate_email() {
                    report.add(field, ErrorKind::Format, format!("{} must be a valid email address", label));
                }
            }
            Rule::MinValue(min) => match parse_amount(value) {
                Some(amount) if amount < *min => report.add(
                    field,
                    ErrorKind::OutOfRange,
                    format!("{} must be at least {}", label, min),
                ),
                Some(_) => {}
                None => report.add(field, ErrorKind::Format, format!("{} must be a number", label)),
            },
            Rule::Pattern(pattern) => {
                if !pattern.is_match(value) {
                    report.add(field, ErrorKind::Format, format!("{} {}", label, pattern.hint()));
                }
            }
            Rule::MinLength(min) => {
                if value.chars().count() < *min {
                    report.add(
                        field,
                        ErrorKind::TooShort,
                        format!("{} must be at least {} characters", label, min),
                    );
                }
            }
            Rule::MaxWords(max) => {
                if value.split_whitespace().count() > *max {
                    report.add(
                        field,
                        ErrorKind::TooLong,
                        format!("{} must not exceed {} words", label, max),
                    );
                }
            }
            Rule::NotInPast => match parse_date(value) {
                Some(date) if date < today => report.add(
                    field,
                    ErrorKind::PastDate,
                    format!("{} cannot be in the past", label),
                ),
                Some(_) => {}
                None => report.add(field, ErrorKind::Format, format!("{} must be a valid date", label)),
            },
            Rule::After(other) => {
                // An unparseable counterpart is reported by its own rules
                let ordered = match (parse_date(value), values.get(other).and_then(parse_date)) {
                    (Some(date), Some(reference)) => date > reference,
                    (None, _) => {
                        report.add(field, ErrorKind::Format, format!("{} must be a valid date", label));
                        continue;
                    }
                    (Some(_), None) => true,
                };
                if !ordered {
                    report.add(
                        field,
                        ErrorKind::DateOrder,
                        format!("{} must be after {}", label, humanize(other).to_lowercase()),
                    );
                }
            }
            Rule::SameAs(other) => {
                if values.raw(field) != values.raw(other) {
                    report.add(
                        field,
                        ErrorKind::Mismatch,
                        format!("{} must match {}", label, humanize(other).to_lowercase()),
                    );
                }
            }
            Rule::OneOf(choices) => {
                if !choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
                    report.add(
                        field,
                        ErrorKind::InvalidChoice,
                        format!("{} must be one of: {}", label, choices.join(", ")),
                    );
                }
            }
        }
    }
}

/// Parses a calendar date, accepting `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

/// Parses an amount, ignoring thousands separators
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    Decimal::from_str(&cleaned).ok()
}

/// "sum_insured" -> "Sum insured"
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_required_short_circuits_other_rules() {
        let rules = FieldRules::new().field("email", [Rule::Required, Rule::Email]);
        let report = rules.validate(&FormValues::from_pairs([("email", "   ")]), today());

        assert_eq!(report.errors().len(), 1);
        assert!(report.has_error("email", ErrorKind::Required));
    }

    #[test]
    fn test_optional_empty_field_passes() {
        let rules = FieldRules::new().field("email", [Rule::Email]);
        assert!(rules.validate(&FormValues::new(), today()).is_valid());
    }

    #[test]
    fn test_min_value_and_thousands_separator() {
        let rules = FieldRules::new().field("sum_insured", [Rule::MinValue(dec!(10000))]);

        assert!(rules
            .validate(&FormValues::from_pairs([("sum_insured", "10,000")]), today())
            .is_valid());
        assert!(rules
            .validate(&FormValues::from_pairs([("sum_insured", "9999.99")]), today())
            .has_error("sum_insured", ErrorKind::OutOfRange));
        assert!(rules
            .validate(&FormValues::from_pairs([("sum_insured", "lots")]), today())
            .has_error("sum_insured", ErrorKind::Format));
    }

    #[test]
    fn test_kra_pin_is_case_insensitive() {
        let pin = Pattern::kra_pin();
        assert!(pin.is_match("A123456789B"));
        assert!(pin.is_match("a123456789b"));
        assert!(!pin.is_match("A12345678B"));
        assert!(!pin.is_match("1123456789B"));
    }

    #[test]
    fn test_kenyan_phone() {
        let phone = Pattern::kenyan_phone();
        assert!(phone.is_match("0712345678"));
        assert!(phone.is_match("0112345678"));
        assert!(!phone.is_match("0812345678"));
        assert!(!phone.is_match("071234567"));
        assert!(!phone.is_match("+254712345678"));
    }

    #[test]
    fn test_prefixed_digits_escapes_prefix() {
        let ucr = Pattern::prefixed_digits("ucr", "UCR.", 4).unwrap();
        assert!(ucr.is_match("UCR.1234"));
        assert!(!ucr.is_match("UCRX1234"));
    }

    #[test]
    fn test_word_limit() {
        let rules = FieldRules::new().field("notes", [Rule::MaxWords(3)]);
        assert!(rules
            .validate(&FormValues::from_pairs([("notes", "one  two\nthree")]), today())
            .is_valid());
        assert!(rules
            .validate(&FormValues::from_pairs([("notes", "one two three four")]), today())
            .has_error("notes", ErrorKind::TooLong));
    }

    #[test]
    fn test_accepted_fails_when_missing() {
        let rules = FieldRules::new().field("terms", [Rule::Accepted]);
        assert!(rules
            .validate(&FormValues::new(), today())
            .has_error("terms", ErrorKind::NotAccepted));
        assert!(rules
            .validate(&FormValues::from_pairs([("terms", "true")]), today())
            .is_valid());
    }

    #[test]
    fn test_merge_appends_rules_for_same_field() {
        let rules = FieldRules::new()
            .field("a", [Rule::Required])
            .merge(FieldRules::new().field("a", [Rule::MinLength(3)]).field("b", [Rule::Required]));

        assert_eq!(rules.rules_for("a").len(), 2);
        assert_eq!(rules.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("sum_insured"), "Sum insured");
        assert_eq!(humanize(""), "");
    }
}
