pub mod parser;

pub use parser::{parse_page, CardMarkup, PageMarkup};
