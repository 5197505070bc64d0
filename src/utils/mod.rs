pub mod money;
pub mod time;

pub use money::{format_currency, format_currency_f64, format_currency_with};
pub use time::{elapsed_fraction, parse_duration_days, term_end, InvalidDuration};
