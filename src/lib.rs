pub mod core;
pub mod features;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::AppState;

pub use features::{alerts, notifier, stats, store};
pub use scraping::{extract_from_html, extract_product_data, price_parser, Page};
pub use tools::{check, track};
