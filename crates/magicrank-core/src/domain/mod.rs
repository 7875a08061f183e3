//! # Domain Models
//!
//! Canonical types flowing through a screening run.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated provider-form symbol (`POS.L`) |
//! | [`Exchange`] | Listing venue and its provider suffix |
//! | [`TickerList`] | Normalised, de-duplicated run input |
//! | [`RawFundamentals`] | Statement lines fetched for one ticker |
//! | [`ScoredRecord`] | Earnings yield, ROTC, EV/EBIT and payback for a valid ticker |
//! | [`Classification`] | Valid / missing-data / invalid verdict |
//!
//! ```rust
//! use magicrank_core::{Exchange, Ticker};
//!
//! let ticker = Ticker::from_listing("LSE:POS", Exchange::Lse).unwrap();
//! assert_eq!(ticker.as_str(), "POS.L");
//! ```

mod fundamentals;
mod score;
mod ticker;

pub use fundamentals::RawFundamentals;
pub use score::{Classification, ClassificationTag, InvalidEntry, MissingEntry, ScoredRecord};
pub use ticker::{Exchange, Ticker, TickerList};
