pub mod open_investment;
pub mod request_funds;

pub use open_investment::{InvestmentInput, OpenInvestment};
pub use request_funds::{FundsDirection, FundsInput, RequestFunds};
