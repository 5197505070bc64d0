use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::domain::transaction::ensure_non_negative;
use crate::domain::{LedgerError, UserSnapshot};
use crate::utils::money::format_currency_with;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub wallet_balance: BigDecimal,
    pub capital_balance: BigDecimal,
    pub profit_balance: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedBalances {
    pub wallet_balance: String,
    pub capital_balance: String,
    pub profit_balance: String,
}

/// Folds settled totals and live accrual into the displayed balances.
///
/// Capital is the settled principal, untouched by accrual. Profit is settled interest
/// plus live interest, and the wallet is their sum.
pub fn compute_balances(
    user: &UserSnapshot,
    active_interest_total: &BigDecimal,
) -> Result<Balances, LedgerError> {
    ensure_non_negative("user", "deposit", &user.deposit)?;
    ensure_non_negative("user", "interest", &user.interest)?;
    ensure_non_negative("user", "active interest", active_interest_total)?;

    let capital_balance = user.deposit.clone();
    let profit_balance = &user.interest + active_interest_total;
    let wallet_balance = &capital_balance + &profit_balance;

    Ok(Balances {
        wallet_balance,
        capital_balance,
        profit_balance,
    })
}

impl Balances {
    pub fn formatted(&self, symbol: &str) -> FormattedBalances {
        FormattedBalances {
            wallet_balance: format_currency_with(symbol, &self.wallet_balance),
            capital_balance: format_currency_with(symbol, &self.capital_balance),
            profit_balance: format_currency_with(symbol, &self.profit_balance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(deposit: i64, interest: i64) -> UserSnapshot {
        UserSnapshot {
            deposit: BigDecimal::from(deposit),
            interest: BigDecimal::from(interest),
        }
    }

    #[test]
    fn combines_settled_and_live_figures() {
        let balances = compute_balances(&user(500, 20), &BigDecimal::from(5)).unwrap();
        assert_eq!(balances.capital_balance, BigDecimal::from(500));
        assert_eq!(balances.profit_balance, BigDecimal::from(25));
        assert_eq!(balances.wallet_balance, BigDecimal::from(525));
    }

    #[test]
    fn is_deterministic() {
        let live: BigDecimal = "12.3456".parse().unwrap();
        assert_eq!(
            compute_balances(&user(1000, 3), &live).unwrap(),
            compute_balances(&user(1000, 3), &live).unwrap()
        );
    }

    #[test]
    fn negative_inputs_are_malformed() {
        assert!(matches!(
            compute_balances(&user(-1, 0), &BigDecimal::from(0)),
            Err(LedgerError::MalformedRecord { .. })
        ));
        assert!(compute_balances(&user(1, 0), &BigDecimal::from(-3)).is_err());
    }

    #[test]
    fn formats_balances() {
        let balances = compute_balances(&user(12500, 310), &"0.5".parse().unwrap()).unwrap();
        let formatted = balances.formatted("$");
        assert_eq!(formatted.wallet_balance, "$12,810.50");
        assert_eq!(formatted.capital_balance, "$12,500.00");
        assert_eq!(formatted.profit_balance, "$310.50");
    }
}
