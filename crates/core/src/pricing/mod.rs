//! The shared formula family: cost roll-up for price records and margin
//! calculation for order and quotation lines.

pub mod margin;
pub mod rollup;
