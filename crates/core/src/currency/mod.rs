//! Multi-currency handling: rate resolution and conversion.

pub mod conversion;
pub mod rates;

pub use conversion::{convert_major, convert_minor};
pub use rates::{RateLookupMethod, RateTable, ResolvedRate, StoredRate};
