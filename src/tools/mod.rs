pub mod check;
pub mod track;

pub use check::{CheckReport, PriceChecker};
pub use track::track_url;
