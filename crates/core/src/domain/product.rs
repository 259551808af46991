use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::CurrencyCode;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

/// Standalone pre-ledger pricing fields still carried by older products.
///
/// They are used only as the default seed for a brand-new price record when a
/// product has no structured price history yet; they never participate in the
/// non-overlap invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPricing {
    pub supplier_list_price: Decimal,
    pub supplier_currency: CurrencyCode,
    pub exchange_rate_to_base: Decimal,
    pub discount_percent: Decimal,
    pub margin_percent: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub active: bool,
    #[serde(default)]
    pub legacy_pricing: Option<LegacyPricing>,
}
