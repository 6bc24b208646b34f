pub mod month;

pub use month::{format_month, months_overlap, parse_month, truncate_to_month};
