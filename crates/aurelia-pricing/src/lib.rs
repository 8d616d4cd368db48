//! Aurelia pricing
//!
//! Deterministic jewelry price quotes from metal/gemstone/work rate tables.
//! Rates come from an external source behind a short TTL cache; when the
//! source is unreachable the hard-coded local table is used instead, so a
//! quote is always answerable.

pub mod cache;
pub mod calculator;
pub mod rates;
pub mod source;

pub use cache::TtlCache;
pub use calculator::{PriceBreakdown, PriceCalculator, PriceQuote, PriceRequest, QuoteError};
pub use rates::RateTable;
pub use source::{HttpRateSource, RateError, RateSource, StaticRateSource};
