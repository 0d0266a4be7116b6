//! Data structures module
//!
//! Price bars, validated price series and the supervised dataset used for
//! training.

mod bar;
mod dataset;
mod error;
mod series;

pub use bar::PriceBar;
pub use dataset::{Dataset, Split};
pub use error::DataError;
pub use series::PriceSeries;
