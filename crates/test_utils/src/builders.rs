//! Test Data Builders
//!
//! Builders for quote forms with valid defaults. Tests set only the fields
//! they care about and get a form that passes every other rule.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use core_kernel::FormValues;
use domain_quote::{MarineQuoteRequest, QuoteError, TradeType, TravelQuoteRequest};

use crate::fixtures::TemporalFixtures;

/// Builder for the details step of a marine quote
#[derive(Debug, Clone)]
pub struct MarineFormBuilder {
    values: FormValues,
}

impl Default for MarineFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarineFormBuilder {
    /// Creates a builder for the worked example: 500,000 All Risks by sea
    pub fn new() -> Self {
        let cover_start = TemporalFixtures::today().format("%Y-%m-%d").to_string();
        Self {
            values: FormValues::from_pairs([
                ("cargo_type", "Containerized"),
                ("trade_type", "import"),
                ("shipment_mode", "sea"),
                ("marine_product", "All Risks"),
                ("cargo_category", "Machinery"),
                ("origin_country", "Germany"),
                ("destination", "Mombasa"),
                ("sum_insured", "500000"),
                ("goods_description", "Industrial milling machine and spare parts"),
                ("ucr_number", "UCR20261018000001"),
                ("idf_number", "IDF20261018000002"),
                ("cover_start", cover_start.as_str()),
            ]),
        }
    }

    pub fn with_product(self, product: &str) -> Self {
        self.with("marine_product", product)
    }

    pub fn with_sum_insured(self, sum_insured: Decimal) -> Self {
        self.with("sum_insured", sum_insured.to_string())
    }

    pub fn with_trade_type(self, trade_type: TradeType) -> Self {
        self.with("trade_type", trade_type.as_str())
    }

    pub fn with_origin_country(self, country: &str) -> Self {
        self.with("origin_country", country)
    }

    pub fn with_cover_start(self, date: NaiveDate) -> Self {
        self.with("cover_start", date.format("%Y-%m-%d").to_string())
    }

    pub fn with_description(self, description: &str) -> Self {
        self.with("goods_description", description)
    }

    pub fn with_identifiers(self, ucr: &str, idf: &str) -> Self {
        self.with("ucr_number", ucr).with("idf_number", idf)
    }

    pub fn with_client_name(self, client: &str) -> Self {
        self.with("client_name", client)
    }

    /// Sets any field
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.set(field, value);
        self
    }

    /// Removes a field
    pub fn without(mut self, field: &str) -> Self {
        self.values.clear(field);
        self
    }

    pub fn build(self) -> FormValues {
        self.values
    }

    /// Builds and parses the typed request
    pub fn build_request(self) -> Result<MarineQuoteRequest, QuoteError> {
        MarineQuoteRequest::from_values(&self.values)
    }
}

/// Builder for the details step of a travel quote
#[derive(Debug, Clone)]
pub struct TravelFormBuilder {
    values: FormValues,
}

impl Default for TravelFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TravelFormBuilder {
    /// Creates a builder for a two-person week in Dubai next month
    pub fn new() -> Self {
        let departure = TemporalFixtures::next_month();
        Self {
            values: FormValues::from_pairs([
                ("destination", "Dubai".to_string()),
                ("departure_date", departure.format("%Y-%m-%d").to_string()),
                ("return_date", (departure + chrono::Duration::days(7)).format("%Y-%m-%d").to_string()),
                ("travellers", "2".to_string()),
                ("trip_purpose", "Leisure".to_string()),
            ]),
        }
    }

    pub fn with_destination(self, destination: &str) -> Self {
        self.with("destination", destination)
    }

    pub fn with_dates(self, departure: NaiveDate, return_date: NaiveDate) -> Self {
        self.with("departure_date", departure.format("%Y-%m-%d").to_string())
            .with("return_date", return_date.format("%Y-%m-%d").to_string())
    }

    pub fn with_travellers(self, travellers: u32) -> Self {
        self.with("travellers", travellers.to_string())
    }

    pub fn with_client_name(self, client: &str) -> Self {
        self.with("client_name", client)
    }

    /// Sets any field
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.set(field, value);
        self
    }

    /// Removes a field
    pub fn without(mut self, field: &str) -> Self {
        self.values.clear(field);
        self
    }

    pub fn build(self) -> FormValues {
        self.values
    }

    /// Builds and parses the typed request
    pub fn build_request(self) -> Result<TravelQuoteRequest, QuoteError> {
        TravelQuoteRequest::from_values(&self.values)
    }
}
