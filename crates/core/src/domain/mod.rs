pub mod money;
pub mod order;
pub mod price_record;
pub mod product;
