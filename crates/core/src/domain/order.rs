use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::price_record::PriceRecord;
use crate::domain::product::ProductId;

/// One line of an order or quotation draft.
///
/// `unit_purchase_price` is a snapshot copied from the product's then-current
/// price record when the line is created, never a live reference; it stays
/// frozen unless the user explicitly edits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit_list_price: Decimal,
    pub discount_percent: Decimal,
    pub unit_purchase_price: Decimal,
}

impl OrderLineItem {
    pub fn from_current_price(
        product_id: ProductId,
        quantity: Decimal,
        current: &PriceRecord,
    ) -> Self {
        Self {
            product_id,
            quantity,
            unit_list_price: current.list_price(),
            discount_percent: Decimal::ZERO,
            unit_purchase_price: current.purchase_price(),
        }
    }
}
