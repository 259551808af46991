use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::CurrencyCode;
use crate::pricing::rollup::{derive, DerivedPrices};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRecordId(pub String);

impl PriceRecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for PriceRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Additive cost on top of the discounted supplier price: either a flat amount
/// in the supplier's currency or a percentage of the discounted price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponent {
    pub amount: Decimal,
    pub is_percentage: bool,
}

impl CostComponent {
    pub fn flat(amount: Decimal) -> Self {
        Self { amount, is_percentage: false }
    }

    pub fn percentage(amount: Decimal) -> Self {
        Self { amount, is_percentage: true }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostComponents {
    pub shipping: CostComponent,
    pub import_cost: CostComponent,
    pub handling: CostComponent,
    pub storage: CostComponent,
}

/// Everything the cost roll-up needs; the derived purchase and list prices are
/// a pure function of these fields and nothing else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecordInputs {
    pub supplier_list_price: Decimal,
    pub supplier_currency: CurrencyCode,
    /// Inverse multiplier into the configured base currency.
    pub exchange_rate_to_base: Decimal,
    pub discount_percent: Decimal,
    pub costs: CostComponents,
    pub margin_percent: Decimal,
}

/// Inclusive calendar-date interval; `until = None` means open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validity {
    pub from: NaiveDate,
    pub until: Option<NaiveDate>,
}

impl Validity {
    pub fn open_ended(from: NaiveDate) -> Self {
        Self { from, until: None }
    }

    pub fn bounded(from: NaiveDate, until: NaiveDate) -> Self {
        Self { from, until: Some(until) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.until.map_or(true, |until| date <= until)
    }

    /// Inclusive intersection test, treating a missing `until` as +infinity.
    pub fn overlaps(&self, other: &Validity) -> bool {
        let starts_before_other_ends = other.until.map_or(true, |until| self.from <= until);
        let other_starts_before_end = self.until.map_or(true, |until| other.from <= until);
        starts_before_other_ends && other_starts_before_end
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.until {
            Some(until) => write!(f, "[{}, {}]", self.from, until),
            None => write!(f, "[{}, open)", self.from),
        }
    }
}

/// A price record being edited in a modal, not yet accepted by the ledger.
/// Every field edit re-derives the prices synchronously via [`recalculate`].
///
/// [`recalculate`]: PriceDraft::recalculate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDraft {
    /// Set when editing an already committed record, `None` for a new one.
    pub record_id: Option<PriceRecordId>,
    pub inputs: PriceRecordInputs,
    pub validity: Validity,
    pub notes: String,
}

impl PriceDraft {
    pub fn recalculate(&self) -> DerivedPrices {
        derive(&self.inputs)
    }
}

/// A committed price record. The cached `purchase_price` and `list_price` are
/// set exclusively by the constructor from the roll-up calculator and read
/// through getters; deserialization discards whatever derived values the
/// external store persisted and recomputes them from the inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPriceRecord")]
pub struct PriceRecord {
    pub id: PriceRecordId,
    pub inputs: PriceRecordInputs,
    pub validity: Validity,
    pub notes: String,
    purchase_price: Decimal,
    list_price: Decimal,
}

impl PriceRecord {
    pub fn commit(
        id: PriceRecordId,
        inputs: PriceRecordInputs,
        validity: Validity,
        notes: String,
    ) -> Self {
        let derived = derive(&inputs);
        Self {
            id,
            inputs,
            validity,
            notes,
            purchase_price: derived.purchase_price,
            list_price: derived.list_price,
        }
    }

    pub fn from_draft(draft: PriceDraft) -> Self {
        let id = draft.record_id.unwrap_or_else(PriceRecordId::generate);
        Self::commit(id, draft.inputs, draft.validity, draft.notes)
    }

    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    pub fn list_price(&self) -> Decimal {
        self.list_price
    }

    pub fn derived(&self) -> DerivedPrices {
        DerivedPrices { purchase_price: self.purchase_price, list_price: self.list_price }
    }

    /// Re-enter the Draft state for another editing round.
    pub fn edit(&self) -> PriceDraft {
        PriceDraft {
            record_id: Some(self.id.clone()),
            inputs: self.inputs.clone(),
            validity: self.validity,
            notes: self.notes.clone(),
        }
    }
}

/// Wire form of a committed record. Persisted derived fields are ignored on
/// load; `From` recomputes them so a stale store can never poison the cache.
#[derive(Deserialize)]
struct StoredPriceRecord {
    id: PriceRecordId,
    inputs: PriceRecordInputs,
    validity: Validity,
    #[serde(default)]
    notes: String,
}

impl From<StoredPriceRecord> for PriceRecord {
    fn from(stored: StoredPriceRecord) -> Self {
        Self::commit(stored.id, stored.inputs, stored.validity, stored.notes)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::money::CurrencyCode;

    use super::{
        CostComponent, CostComponents, PriceDraft, PriceRecord, PriceRecordId, PriceRecordInputs,
        Validity,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn inputs() -> PriceRecordInputs {
        PriceRecordInputs {
            supplier_list_price: dec!(100),
            supplier_currency: CurrencyCode::new("USD"),
            exchange_rate_to_base: dec!(1.1),
            discount_percent: dec!(10),
            costs: CostComponents {
                shipping: CostComponent::flat(dec!(5)),
                ..CostComponents::default()
            },
            margin_percent: dec!(20),
        }
    }

    #[test]
    fn validity_is_inclusive_on_both_ends() {
        let validity = Validity::bounded(date(2024, 1, 1), date(2024, 6, 30));

        assert!(validity.contains(date(2024, 1, 1)));
        assert!(validity.contains(date(2024, 6, 30)));
        assert!(!validity.contains(date(2023, 12, 31)));
        assert!(!validity.contains(date(2024, 7, 1)));
    }

    #[test]
    fn open_ended_validity_contains_every_later_date() {
        let validity = Validity::open_ended(date(2024, 7, 1));

        assert!(validity.contains(date(2031, 1, 1)));
        assert!(!validity.contains(date(2024, 6, 30)));
    }

    #[test]
    fn overlap_detects_shared_boundary_days_and_open_ends() {
        let first = Validity::bounded(date(2024, 1, 1), date(2024, 6, 30));
        let adjacent = Validity::open_ended(date(2024, 7, 1));
        let touching = Validity::bounded(date(2024, 6, 30), date(2024, 12, 31));

        assert!(!first.overlaps(&adjacent));
        assert!(!adjacent.overlaps(&first));
        assert!(first.overlaps(&touching));
        assert!(adjacent.overlaps(&Validity::open_ended(date(2020, 1, 1))));
    }

    #[test]
    fn committed_record_caches_the_rolled_up_prices() {
        let record = PriceRecord::commit(
            PriceRecordId::generate(),
            inputs(),
            Validity::open_ended(date(2024, 1, 1)),
            String::new(),
        );

        assert_eq!(record.purchase_price(), dec!(104.50));
        assert_eq!(record.list_price(), dec!(131));
    }

    #[test]
    fn draft_recalculation_matches_the_committed_record() {
        let draft = PriceDraft {
            record_id: None,
            inputs: inputs(),
            validity: Validity::open_ended(date(2024, 1, 1)),
            notes: "seed".to_owned(),
        };

        let derived = draft.recalculate();
        let record = PriceRecord::from_draft(draft);

        assert_eq!(record.derived(), derived);
        assert_eq!(record.notes, "seed");
    }

    #[test]
    fn deserialization_discards_tampered_derived_fields() {
        let record = PriceRecord::commit(
            PriceRecordId("pr-1".to_owned()),
            inputs(),
            Validity::bounded(date(2024, 1, 1), date(2024, 6, 30)),
            String::new(),
        );

        let mut value = serde_json::to_value(&record).expect("serialize");
        value["purchase_price"] = serde_json::json!("9999.99");
        value["list_price"] = serde_json::json!("1");

        let restored: PriceRecord = serde_json::from_value(value).expect("deserialize");
        assert_eq!(restored.purchase_price(), dec!(104.50));
        assert_eq!(restored.list_price(), dec!(131));
        assert_eq!(restored, record);
    }

    #[test]
    fn editing_a_record_round_trips_through_a_draft() {
        let record = PriceRecord::commit(
            PriceRecordId("pr-2".to_owned()),
            inputs(),
            Validity::open_ended(date(2024, 1, 1)),
            "initial".to_owned(),
        );

        let mut draft = record.edit();
        draft.inputs.margin_percent = dec!(50);

        let edited = PriceRecord::from_draft(draft);
        assert_eq!(edited.id, record.id);
        assert_eq!(edited.list_price(), dec!(209));
    }
}
