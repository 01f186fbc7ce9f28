//! Cover products and the premium rate table
//!
//! Marine cargo cover is sold as one of a few named products, each priced
//! as a flat rate on the sum insured. Products are looked up by name or by
//! Institute Cargo Clause code; an unknown product prices at rate zero.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Rate;

use crate::error::QuoteError;

/// A named cover product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverProduct {
    /// Institute Cargo Clause code (e.g. "ICC-A")
    pub code: String,
    /// Display name (e.g. "All Risks")
    pub name: String,
    /// Premium rate applied to the sum insured
    pub rate: Rate,
}

impl CoverProduct {
    pub fn new(code: impl Into<String>, name: impl Into<String>, rate: Rate) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            rate,
        }
    }

    /// True if `key` names this product by name or code
    pub fn matches(&self, key: &str) -> bool {
        let key = key.trim();
        self.name.eq_ignore_ascii_case(key) || self.code.eq_ignore_ascii_case(key)
    }
}

/// The set of products on offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CoverProduct>", into = "Vec<CoverProduct>")]
pub struct RateTable {
    products: Vec<CoverProduct>,
}

impl RateTable {
    /// Builds a table, rejecting products whose name or code collide
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::Configuration` on a duplicate name or code
    pub fn new(products: Vec<CoverProduct>) -> Result<Self, QuoteError> {
        for (i, product) in products.iter().enumerate() {
            let clash = products[..i]
                .iter()
                .any(|p| p.matches(&product.name) || p.matches(&product.code));
            if clash {
                return Err(QuoteError::Configuration(format!(
                    "duplicate cover product {} ({})",
                    product.name, product.code
                )));
            }
        }
        Ok(Self { products })
    }

    /// All Risks, Named Perils and Limited Perils at their standard rates
    pub fn standard() -> Self {
        Self {
            products: vec![
                CoverProduct::new("ICC-A", "All Risks", Rate::new(dec!(0.005))),
                CoverProduct::new("ICC-B", "Named Perils", Rate::new(dec!(0.0035))),
                CoverProduct::new("ICC-C", "Limited Perils", Rate::new(dec!(0.0025))),
            ],
        }
    }

    /// Looks up a product by name or code, ignoring case and surrounding whitespace
    pub fn find(&self, key: &str) -> Option<&CoverProduct> {
        self.products.iter().find(|p| p.matches(key))
    }

    /// The rate for a product; zero when the product is unknown
    pub fn rate_for(&self, key: &str) -> Rate {
        self.find(key).map(|p| p.rate).unwrap_or_else(Rate::zero)
    }

    pub fn products(&self) -> &[CoverProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<CoverProduct>> for RateTable {
    type Error = QuoteError;

    fn try_from(products: Vec<CoverProduct>) -> Result<Self, Self::Error> {
        Self::new(products)
    }
}

impl From<RateTable> for Vec<CoverProduct> {
    fn from(table: RateTable) -> Self {
        table.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_or_code() {
        let table = RateTable::standard();

        assert_eq!(table.rate_for("All Risks").as_decimal(), dec!(0.005));
        assert_eq!(table.rate_for("  named perils ").as_decimal(), dec!(0.0035));
        assert_eq!(table.rate_for("icc-c").as_decimal(), dec!(0.0025));
    }

    #[test]
    fn test_unknown_product_rates_zero() {
        let table = RateTable::standard();
        assert!(table.find("Total Loss Only").is_none());
        assert!(table.rate_for("Total Loss Only").is_zero());
        assert!(table.rate_for("").is_zero());
    }

    #[test]
    fn test_duplicate_products_rejected() {
        let result = RateTable::new(vec![
            CoverProduct::new("ICC-A", "All Risks", Rate::new(dec!(0.005))),
            CoverProduct::new("ICC-X", "ALL RISKS", Rate::new(dec!(0.006))),
        ]);
        assert!(matches!(result, Err(QuoteError::Configuration(_))));
    }

    #[test]
    fn test_table_deserializes_from_list() {
        let json = r#"[{"code": "ICC-A", "name": "All Risks", "rate": "0.0045"}]"#;
        let table: RateTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rate_for("ICC-A").as_decimal(), dec!(0.0045));
    }
}
