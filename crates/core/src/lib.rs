pub mod category;
pub mod transaction;

pub use category::{Category, CategoryKind, Taxonomy};
pub use transaction::{Direction, EnrichedTransaction, RawTransaction, TxnMode};
