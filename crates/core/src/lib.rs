//! Cost-to-price core for tradable products: cost roll-up, temporal price
//! history and line-item margins. Pure computation; persistence, transport
//! and rendering stay outside.

pub mod config;
pub mod domain;
pub mod errors;
pub mod ledger;
pub mod pricing;

pub use config::{ConfigError, CoreConfig, LogFormat, LoggingConfig};
pub use domain::money::{CurrencyCode, Money};
pub use domain::order::OrderLineItem;
pub use domain::price_record::{
    CostComponent, CostComponents, PriceDraft, PriceRecord, PriceRecordId, PriceRecordInputs,
    Validity,
};
pub use domain::product::{LegacyPricing, Product, ProductId};
pub use errors::DomainError;
pub use ledger::PriceHistory;
pub use pricing::margin::{
    line_totals, order_totals, procurement_line, DeterministicMarginEngine, LineTotals,
    MarginEngine, OrderTotals, ProcurementLine,
};
pub use pricing::rollup::{
    derive, derive_with_trace, DerivedPrices, DeterministicRollupEngine, RollupEngine,
    RollupResult, RollupStep, RollupTrace, MARGIN_FALLBACK_MULTIPLIER,
};
