use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLineItem;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    pub line_revenue: Decimal,
    pub line_cost: Decimal,
    pub margin: Decimal,
    pub margin_percent: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_margin: Decimal,
    pub total_margin_percent: Decimal,
}

/// Procurement-side view of a line: the discounted unit price and the line
/// total are separate fields, never conflated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcurementLine {
    pub unit_final_price: Decimal,
    pub line_total: Decimal,
}

pub trait MarginEngine: Send + Sync {
    fn line(&self, item: &OrderLineItem) -> Result<LineTotals, DomainError>;
    fn order(&self, items: &[OrderLineItem]) -> Result<OrderTotals, DomainError>;
}

#[derive(Default)]
pub struct DeterministicMarginEngine;

impl MarginEngine for DeterministicMarginEngine {
    fn line(&self, item: &OrderLineItem) -> Result<LineTotals, DomainError> {
        line_totals(item)
    }

    fn order(&self, items: &[OrderLineItem]) -> Result<OrderTotals, DomainError> {
        order_totals(items)
    }
}

pub fn line_totals(item: &OrderLineItem) -> Result<LineTotals, DomainError> {
    ensure_quantity(item)?;

    let line_revenue = item.quantity * price_after_discount(item);
    let line_cost = item.quantity * item.unit_purchase_price;
    let margin = line_revenue - line_cost;

    Ok(LineTotals {
        line_revenue,
        line_cost,
        margin,
        margin_percent: margin_percent_of(margin, line_revenue),
    })
}

pub fn order_totals(items: &[OrderLineItem]) -> Result<OrderTotals, DomainError> {
    let mut total_revenue = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    for item in items {
        let line = line_totals(item)?;
        total_revenue += line.line_revenue;
        total_cost += line.line_cost;
    }

    let total_margin = total_revenue - total_cost;
    Ok(OrderTotals {
        total_revenue,
        total_cost,
        total_margin,
        total_margin_percent: margin_percent_of(total_margin, total_revenue),
    })
}

/// Supplier-order variant: same discount formula, but the unit final price is
/// reported without the quantity multiplication, next to the line total.
pub fn procurement_line(item: &OrderLineItem) -> Result<ProcurementLine, DomainError> {
    ensure_quantity(item)?;

    let unit_final_price = price_after_discount(item);
    Ok(ProcurementLine { unit_final_price, line_total: item.quantity * unit_final_price })
}

fn ensure_quantity(item: &OrderLineItem) -> Result<(), DomainError> {
    if item.quantity < Decimal::ZERO {
        return Err(DomainError::InvalidInput {
            field: "quantity",
            message: format!("must not be negative, got {}", item.quantity),
        });
    }
    Ok(())
}

fn price_after_discount(item: &OrderLineItem) -> Decimal {
    item.unit_list_price * (Decimal::ONE - item.discount_percent / Decimal::ONE_HUNDRED)
}

// Revenue at or below zero yields exactly zero percent, never NaN or an error.
fn margin_percent_of(margin: Decimal, revenue: Decimal) -> Decimal {
    if revenue > Decimal::ZERO {
        margin / revenue * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::domain::order::OrderLineItem;
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    use super::{line_totals, order_totals, procurement_line};

    fn line(
        quantity: Decimal,
        unit_list_price: Decimal,
        discount_percent: Decimal,
        unit_purchase_price: Decimal,
    ) -> OrderLineItem {
        OrderLineItem {
            product_id: ProductId("widget".to_owned()),
            quantity,
            unit_list_price,
            discount_percent,
            unit_purchase_price,
        }
    }

    #[test]
    fn computes_revenue_cost_and_margin_for_a_discounted_line() {
        let totals =
            line_totals(&line(dec!(4), dec!(100), dec!(10), dec!(60))).expect("valid line");

        assert_eq!(totals.line_revenue, dec!(360));
        assert_eq!(totals.line_cost, dec!(240));
        assert_eq!(totals.margin, dec!(120));
        assert_eq!(totals.margin_percent.round_dp(2), dec!(33.33));
    }

    #[test]
    fn zero_quantity_yields_zero_margin_percent_not_nan() {
        let totals = line_totals(&line(dec!(0), dec!(100), dec!(0), dec!(50))).expect("valid line");

        assert_eq!(totals.line_revenue, Decimal::ZERO);
        assert_eq!(totals.margin_percent, Decimal::ZERO);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let error = line_totals(&line(dec!(-1), dec!(100), dec!(0), dec!(50)))
            .expect_err("negative quantity");

        assert!(matches!(error, DomainError::InvalidInput { field: "quantity", .. }));
    }

    #[test]
    fn order_totals_sum_lines_pairwise() {
        let lines = vec![
            line(dec!(1), dec!(100), dec!(0), dec!(60)),
            line(dec!(2), dec!(100), dec!(0), dec!(75)),
        ];

        let totals = order_totals(&lines).expect("valid order");

        assert_eq!(totals.total_revenue, dec!(300));
        assert_eq!(totals.total_cost, dec!(210));
        assert_eq!(totals.total_margin, dec!(90));
        assert_eq!(totals.total_margin_percent, dec!(30));
    }

    #[test]
    fn empty_order_aggregates_to_zero_with_the_zero_guard() {
        let totals = order_totals(&[]).expect("empty order");

        assert_eq!(totals.total_revenue, Decimal::ZERO);
        assert_eq!(totals.total_margin_percent, Decimal::ZERO);
    }

    #[test]
    fn order_totals_reject_any_line_with_negative_quantity() {
        let lines = vec![
            line(dec!(1), dec!(100), dec!(0), dec!(60)),
            line(dec!(-2), dec!(100), dec!(0), dec!(75)),
        ];

        assert!(order_totals(&lines).is_err());
    }

    #[test]
    fn procurement_line_exposes_unit_price_and_line_total_separately() {
        let result =
            procurement_line(&line(dec!(5), dec!(40), dec!(25), dec!(0))).expect("valid line");

        assert_eq!(result.unit_final_price, dec!(30));
        assert_eq!(result.line_total, dec!(150));
    }
}
