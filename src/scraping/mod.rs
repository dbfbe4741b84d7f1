pub mod loader;
pub mod page;
pub mod price_parser;
pub mod product_extractor;

pub use loader::{HttpPageLoader, PageLoader};
pub use page::{InlineStyleResolver, Page, StyleResolver};
pub use product_extractor::{extract_from_html, extract_product_data};
