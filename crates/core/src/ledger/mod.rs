use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::CoreConfig;
use crate::domain::money::{CurrencyCode, Money};
use crate::domain::price_record::{
    CostComponents, PriceDraft, PriceRecord, PriceRecordId, PriceRecordInputs, Validity,
};
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// Time-bounded price records keyed by product.
///
/// Reads are safe in any order; writes must be serialized per product by the
/// caller, since the overlap check reads the whole collection before a record
/// is committed. Each write happens inside one `&mut self` call, so check and
/// commit cannot interleave within this type.
#[derive(Clone, Debug)]
pub struct PriceHistory {
    base_currency: CurrencyCode,
    records_by_product: HashMap<String, Vec<PriceRecord>>,
}

impl PriceHistory {
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self { base_currency, records_by_product: HashMap::new() }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.base_currency.clone())
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    pub fn records(&self, product_id: &ProductId) -> &[PriceRecord] {
        self.records_by_product.get(&product_id.0).map_or(&[], Vec::as_slice)
    }

    /// Replaces a product's record set with externally persisted state, as-is.
    /// The store is trusted here; `current_price` copes with violated
    /// invariants deterministically instead of failing on read.
    pub fn load(&mut self, product_id: &ProductId, records: Vec<PriceRecord>) {
        self.records_by_product.insert(product_id.0.clone(), records);
    }

    /// Commits a draft as a new record, or replaces the committed record the
    /// draft was opened from. Rejects date ranges that end before they start
    /// and any interval intersecting another record of the same product; a
    /// rejected draft leaves the collection untouched.
    ///
    /// Non-overlap subsumes the open-ended invariants: two open-ended records
    /// always intersect, and an open-ended record that intersects nothing
    /// starts after every bounded one ends.
    pub fn add_or_update(
        &mut self,
        product_id: &ProductId,
        draft: PriceDraft,
    ) -> Result<PriceRecord, DomainError> {
        if let Some(until) = draft.validity.until {
            if until < draft.validity.from {
                return Err(DomainError::InvalidInput {
                    field: "validity",
                    message: format!("ends {until} before it starts {}", draft.validity.from),
                });
            }
        }

        for existing in self.records(product_id) {
            if draft.record_id.as_ref() == Some(&existing.id) {
                continue;
            }
            if existing.validity.overlaps(&draft.validity) {
                return Err(DomainError::Overlap {
                    existing_id: existing.id.clone(),
                    existing: existing.validity,
                    candidate: draft.validity,
                });
            }
        }

        let record = PriceRecord::from_draft(draft);
        let chain = self.records_by_product.entry(product_id.0.clone()).or_default();
        match chain.iter().position(|candidate| candidate.id == record.id) {
            Some(index) => chain[index] = record.clone(),
            None => chain.push(record.clone()),
        }
        chain.sort_by_key(|candidate| candidate.validity.from);
        debug!(
            product_id = %product_id.0,
            record_id = %record.id,
            validity = %record.validity,
            "price record committed"
        );

        Ok(record)
    }

    /// Unconditional delete; adjacent intervals are not healed.
    pub fn remove(&mut self, product_id: &ProductId, record_id: &PriceRecordId) -> bool {
        let Some(chain) = self.records_by_product.get_mut(&product_id.0) else {
            return false;
        };
        let before = chain.len();
        chain.retain(|record| &record.id != record_id);
        let removed = chain.len() < before;
        if removed {
            debug!(product_id = %product_id.0, record_id = %record_id, "price record removed");
        }
        removed
    }

    /// The record whose inclusive validity interval contains `as_of`.
    ///
    /// The non-overlap invariant guarantees at most one match; if external
    /// state violates it, the record with the latest `valid_from` wins,
    /// deterministically.
    pub fn current_price(&self, product_id: &ProductId, as_of: NaiveDate) -> Option<&PriceRecord> {
        let mut matches =
            self.records(product_id).iter().filter(|record| record.validity.contains(as_of));

        let mut current = matches.next()?;
        let mut extra = 0usize;
        for record in matches {
            extra += 1;
            if record.validity.from > current.validity.from {
                current = record;
            }
        }
        if extra > 0 {
            warn!(
                product_id = %product_id.0,
                as_of = %as_of,
                "overlapping price records found; picking the latest valid_from"
            );
        }

        Some(current)
    }

    /// [`current_price`] with `as_of` defaulted to today's calendar date.
    ///
    /// [`current_price`]: PriceHistory::current_price
    pub fn current_price_today(&self, product_id: &ProductId) -> Option<&PriceRecord> {
        self.current_price(product_id, Utc::now().date_naive())
    }

    /// Current list price as a monetary amount in the configured base currency.
    pub fn current_list_price(&self, product_id: &ProductId, as_of: NaiveDate) -> Option<Money> {
        self.current_price(product_id, as_of)
            .map(|record| Money::new(record.list_price(), self.base_currency.clone()))
    }

    /// Defaults for the "new price" action: copied from the current record
    /// when one exists, else from the product's legacy pricing fields, else a
    /// neutral seed in the base currency. The seed opens an open-ended
    /// interval at `as_of`; committing it still runs the overlap check.
    pub fn draft_seed(&self, product: &Product, as_of: NaiveDate) -> PriceDraft {
        let inputs = if let Some(current) = self.current_price(&product.id, as_of) {
            current.inputs.clone()
        } else if let Some(legacy) = &product.legacy_pricing {
            PriceRecordInputs {
                supplier_list_price: legacy.supplier_list_price,
                supplier_currency: legacy.supplier_currency.clone(),
                exchange_rate_to_base: legacy.exchange_rate_to_base,
                discount_percent: legacy.discount_percent,
                costs: CostComponents::default(),
                margin_percent: legacy.margin_percent,
            }
        } else {
            PriceRecordInputs {
                supplier_list_price: Decimal::ZERO,
                supplier_currency: self.base_currency.clone(),
                exchange_rate_to_base: Decimal::ONE,
                discount_percent: Decimal::ZERO,
                costs: CostComponents::default(),
                margin_percent: Decimal::ZERO,
            }
        };

        PriceDraft {
            record_id: None,
            inputs,
            validity: Validity::open_ended(as_of),
            notes: String::new(),
        }
    }
}
