//! Fundamentals source implementations.

mod fixture;
mod yahoo;

pub use fixture::FixtureSource;
pub use yahoo::{parse_summary, YahooAdapter, YahooAuthManager};
