use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::money::CurrencyCode;
use crate::domain::price_record::{CostComponent, PriceRecordInputs};

/// Multiplier applied instead of the margin formula once `margin_percent`
/// reaches 100, where the divisor would hit zero or invert the sign. A designed
/// fallback, not an error path.
pub const MARGIN_FALLBACK_MULTIPLIER: Decimal = Decimal::TEN;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedPrices {
    /// Fully loaded unit cost in the base currency, rounded to 2 decimals.
    pub purchase_price: Decimal,
    /// Marked-up sale price in the base currency, always a whole unit.
    pub list_price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupTrace {
    pub currency: CurrencyCode,
    pub steps: Vec<RollupStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupResult {
    pub derived: DerivedPrices,
    pub trace: RollupTrace,
}

pub trait RollupEngine: Send + Sync {
    fn derive(&self, inputs: &PriceRecordInputs, base_currency: &CurrencyCode) -> RollupResult;
}

#[derive(Default)]
pub struct DeterministicRollupEngine;

impl RollupEngine for DeterministicRollupEngine {
    fn derive(&self, inputs: &PriceRecordInputs, base_currency: &CurrencyCode) -> RollupResult {
        derive_with_trace(inputs, base_currency)
    }
}

/// Cost roll-up: supplier price through discount, additive cost components and
/// a single currency conversion to a purchase price, then margin to a list
/// price. Total over all numeric inputs; nothing here errors or clamps.
///
/// Flat (non-percentage) cost components are summed at face value with the
/// discounted supplier price, i.e. they are implicitly denominated in the
/// supplier's currency. Reproduced as-is from the legacy screens; a latent
/// ambiguity for non-base-currency suppliers that the product owner still has
/// to resolve.
pub fn derive(inputs: &PriceRecordInputs) -> DerivedPrices {
    let base_after_discount = discounted_base(inputs);
    let subtotal = base_after_discount
        + resolve_component(&inputs.costs.shipping, base_after_discount)
        + resolve_component(&inputs.costs.import_cost, base_after_discount)
        + resolve_component(&inputs.costs.handling, base_after_discount)
        + resolve_component(&inputs.costs.storage, base_after_discount);

    // Conversion happens exactly once, after all components are summed.
    let purchase_price = (subtotal * inputs.exchange_rate_to_base)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let list_price = list_price_from(purchase_price, inputs.margin_percent);
    DerivedPrices { purchase_price, list_price }
}

pub fn derive_with_trace(inputs: &PriceRecordInputs, base_currency: &CurrencyCode) -> RollupResult {
    let base_after_discount = discounted_base(inputs);
    let mut steps = vec![RollupStep {
        stage: "base_after_discount".to_string(),
        detail: "supplier_list_price * (1 - discount_percent/100)".to_string(),
        amount: base_after_discount,
    }];

    let components = [
        ("shipping", &inputs.costs.shipping),
        ("import_cost", &inputs.costs.import_cost),
        ("handling", &inputs.costs.handling),
        ("storage", &inputs.costs.storage),
    ];
    let mut subtotal = base_after_discount;
    for (stage, component) in components {
        let resolved = resolve_component(component, base_after_discount);
        subtotal += resolved;
        steps.push(RollupStep {
            stage: stage.to_string(),
            detail: if component.is_percentage {
                "base_after_discount * (amount/100)".to_string()
            } else {
                "flat amount in supplier currency".to_string()
            },
            amount: resolved,
        });
    }
    steps.push(RollupStep {
        stage: "subtotal".to_string(),
        detail: "base_after_discount + shipping + import_cost + handling + storage".to_string(),
        amount: subtotal,
    });

    let derived = derive(inputs);
    steps.push(RollupStep {
        stage: "purchase_price".to_string(),
        detail: "subtotal * exchange_rate_to_base, rounded to 2 decimals".to_string(),
        amount: derived.purchase_price,
    });
    steps.push(RollupStep {
        stage: "list_price".to_string(),
        detail: if inputs.margin_percent < Decimal::ONE_HUNDRED {
            "ceil(purchase_price / (1 - margin_percent/100))".to_string()
        } else {
            format!("purchase_price * {MARGIN_FALLBACK_MULTIPLIER} (margin fallback)")
        },
        amount: derived.list_price,
    });

    RollupResult {
        derived,
        trace: RollupTrace { currency: base_currency.clone(), steps },
    }
}

fn discounted_base(inputs: &PriceRecordInputs) -> Decimal {
    inputs.supplier_list_price * (Decimal::ONE - inputs.discount_percent / Decimal::ONE_HUNDRED)
}

fn resolve_component(component: &CostComponent, base_after_discount: Decimal) -> Decimal {
    if component.is_percentage {
        base_after_discount * component.amount / Decimal::ONE_HUNDRED
    } else {
        component.amount
    }
}

fn list_price_from(purchase_price: Decimal, margin_percent: Decimal) -> Decimal {
    if margin_percent < Decimal::ONE_HUNDRED {
        // List prices are never fractional: round up to the next whole unit.
        (purchase_price / (Decimal::ONE - margin_percent / Decimal::ONE_HUNDRED)).ceil()
    } else {
        (purchase_price * MARGIN_FALLBACK_MULTIPLIER)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}
