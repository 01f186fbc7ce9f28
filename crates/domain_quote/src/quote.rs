//! Quote requests
//!
//! Typed views over the raw form values collected by the wizard. The raw
//! values stay the source of truth (they are what a pending quote carries
//! and what an edit restores); these types are built from them once the
//! form has passed validation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::validation::{parse_amount, parse_date};
use core_kernel::FormValues;

use crate::error::QuoteError;

/// Line of business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceType {
    Marine,
    Travel,
}

impl InsuranceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceType::Marine => "marine",
            InsuranceType::Travel => "travel",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsuranceType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marine" => Ok(InsuranceType::Marine),
            "travel" => Ok(InsuranceType::Travel),
            other => Err(QuoteError::invalid_field("type", format!("unknown insurance type {}", other))),
        }
    }
}

/// Direction of the shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    #[default]
    Import,
    Export,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Import => "import",
            TradeType::Export => "export",
        }
    }
}

impl FromStr for TradeType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "import" => Ok(TradeType::Import),
            "export" => Ok(TradeType::Export),
            other => Err(QuoteError::invalid_field("trade_type", format!("unknown trade type {}", other))),
        }
    }
}

/// How the cargo travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentMode {
    Sea,
    Air,
    Road,
}

impl ShipmentMode {
    pub const ALL: [ShipmentMode; 3] = [ShipmentMode::Sea, ShipmentMode::Air, ShipmentMode::Road];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentMode::Sea => "sea",
            ShipmentMode::Air => "air",
            ShipmentMode::Road => "road",
        }
    }
}

impl FromStr for ShipmentMode {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShipmentMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| QuoteError::invalid_field("shipment_mode", format!("unknown mode {}", wanted)))
    }
}

/// Lifecycle status of a stored quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[default]
    Pending,
}

/// A marine cargo quote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineQuoteRequest {
    pub cargo_type: String,
    pub trade_type: TradeType,
    pub shipment_mode: ShipmentMode,
    pub marine_product: String,
    pub cargo_category: String,
    pub origin_country: String,
    pub destination: String,
    pub sum_insured: Decimal,
    pub goods_description: String,
    pub ucr_number: String,
    pub idf_number: String,
    pub cover_start: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

impl MarineQuoteRequest {
    /// Builds the request from validated form values
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::InvalidField` for the first missing or
    /// unparseable field
    pub fn from_values(values: &FormValues) -> Result<Self, QuoteError> {
        Ok(Self {
            cargo_type: text(values, "cargo_type")?,
            trade_type: text(values, "trade_type")?.parse()?,
            shipment_mode: text(values, "shipment_mode")?.parse()?,
            marine_product: text(values, "marine_product")?,
            cargo_category: text(values, "cargo_category")?,
            origin_country: text(values, "origin_country")?,
            destination: text(values, "destination")?,
            sum_insured: amount(values, "sum_insured")?,
            goods_description: text(values, "goods_description")?,
            ucr_number: text(values, "ucr_number")?,
            idf_number: text(values, "idf_number")?,
            cover_start: date(values, "cover_start")?,
            client_name: values.get("client_name").map(str::to_string),
        })
    }

    /// Converts back to form values
    pub fn to_values(&self) -> FormValues {
        let mut values = FormValues::from_pairs([
            ("cargo_type", self.cargo_type.clone()),
            ("trade_type", self.trade_type.as_str().to_string()),
            ("shipment_mode", self.shipment_mode.as_str().to_string()),
            ("marine_product", self.marine_product.clone()),
            ("cargo_category", self.cargo_category.clone()),
            ("origin_country", self.origin_country.clone()),
            ("destination", self.destination.clone()),
            ("sum_insured", self.sum_insured.to_string()),
            ("goods_description", self.goods_description.clone()),
            ("ucr_number", self.ucr_number.clone()),
            ("idf_number", self.idf_number.clone()),
            ("cover_start", self.cover_start.format("%Y-%m-%d").to_string()),
        ]);
        if let Some(client) = &self.client_name {
            values.set("client_name", client.clone());
        }
        values
    }
}

/// A travel quote request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelQuoteRequest {
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub travellers: u32,
    pub trip_purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

impl TravelQuoteRequest {
    /// Builds the request from validated form values
    pub fn from_values(values: &FormValues) -> Result<Self, QuoteError> {
        let travellers = text(values, "travellers")?
            .parse::<u32>()
            .map_err(|e| QuoteError::invalid_field("travellers", e.to_string()))?;

        Ok(Self {
            destination: text(values, "destination")?,
            departure_date: date(values, "departure_date")?,
            return_date: date(values, "return_date")?,
            travellers,
            trip_purpose: text(values, "trip_purpose")?,
            client_name: values.get("client_name").map(str::to_string),
        })
    }

    /// Length of the trip in days
    pub fn duration_days(&self) -> i64 {
        (self.return_date - self.departure_date).num_days()
    }

    pub fn to_values(&self) -> FormValues {
        let mut values = FormValues::from_pairs([
            ("destination", self.destination.clone()),
            ("departure_date", self.departure_date.format("%Y-%m-%d").to_string()),
            ("return_date", self.return_date.format("%Y-%m-%d").to_string()),
            ("travellers", self.travellers.to_string()),
            ("trip_purpose", self.trip_purpose.clone()),
        ]);
        if let Some(client) = &self.client_name {
            values.set("client_name", client.clone());
        }
        values
    }
}

/// The typed details of either kind of quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuoteDetails {
    Marine(MarineQuoteRequest),
    Travel(TravelQuoteRequest),
}

impl QuoteDetails {
    /// Parses form values as the given kind of request
    pub fn from_values(insurance_type: InsuranceType, values: &FormValues) -> Result<Self, QuoteError> {
        match insurance_type {
            InsuranceType::Marine => MarineQuoteRequest::from_values(values).map(QuoteDetails::Marine),
            InsuranceType::Travel => TravelQuoteRequest::from_values(values).map(QuoteDetails::Travel),
        }
    }

    pub fn insurance_type(&self) -> InsuranceType {
        match self {
            QuoteDetails::Marine(_) => InsuranceType::Marine,
            QuoteDetails::Travel(_) => InsuranceType::Travel,
        }
    }

    /// Dashboard title for the quote
    pub fn title(&self) -> String {
        match self {
            QuoteDetails::Marine(m) => format!("Marine Cargo - {} ({})", m.cargo_type, m.trade_type.as_str()),
            QuoteDetails::Travel(t) => format!("Travel - {}", t.destination),
        }
    }
}

fn text(values: &FormValues, field: &str) -> Result<String, QuoteError> {
    values
        .get(field)
        .map(str::to_string)
        .ok_or_else(|| QuoteError::invalid_field(field, "value is missing"))
}

fn amount(values: &FormValues, field: &str) -> Result<Decimal, QuoteError> {
    values
        .get(field)
        .and_then(parse_amount)
        .ok_or_else(|| QuoteError::invalid_field(field, "not a number"))
}

fn date(values: &FormValues, field: &str) -> Result<NaiveDate, QuoteError> {
    values
        .get(field)
        .and_then(parse_date)
        .ok_or_else(|| QuoteError::invalid_field(field, "not a date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn marine_values() -> FormValues {
        FormValues::from_pairs([
            ("cargo_type", "Containerized"),
            ("trade_type", "Import"),
            ("shipment_mode", "sea"),
            ("marine_product", "All Risks"),
            ("cargo_category", "Electronics"),
            ("origin_country", "China"),
            ("destination", "Mombasa"),
            ("sum_insured", "1,500,000"),
            ("goods_description", "Flat screen televisions in cartons"),
            ("ucr_number", "UCR2026000000123"),
            ("idf_number", "IDF2026000000456"),
            ("cover_start", "2026-11-01"),
        ])
    }

    #[test]
    fn test_marine_from_values() {
        let request = MarineQuoteRequest::from_values(&marine_values()).unwrap();

        assert_eq!(request.trade_type, TradeType::Import);
        assert_eq!(request.shipment_mode, ShipmentMode::Sea);
        assert_eq!(request.sum_insured, dec!(1500000));
        assert_eq!(request.cover_start, NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert!(request.client_name.is_none());
    }

    #[test]
    fn test_marine_missing_field_names_the_field() {
        let mut values = marine_values();
        values.clear("idf_number");

        match MarineQuoteRequest::from_values(&values) {
            Err(QuoteError::InvalidField { field, .. }) => assert_eq!(field, "idf_number"),
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_travel_duration_and_title() {
        let values = FormValues::from_pairs([
            ("destination", "Dubai"),
            ("departure_date", "2026-12-01"),
            ("return_date", "2026-12-08"),
            ("travellers", "2"),
            ("trip_purpose", "Leisure"),
        ]);
        let details = QuoteDetails::from_values(InsuranceType::Travel, &values).unwrap();

        assert_eq!(details.title(), "Travel - Dubai");
        match details {
            QuoteDetails::Travel(t) => assert_eq!(t.duration_days(), 7),
            QuoteDetails::Marine(_) => panic!("expected travel details"),
        }
    }
}
