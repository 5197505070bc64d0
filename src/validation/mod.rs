use bigdecimal::{BigDecimal, Zero};
use std::fmt;

use crate::domain::{PlanDraft, WalletData};
use crate::utils::time::parse_duration_days;

pub const WALLET_ADDRESS_MIN_LEN: usize = 26;
pub const WALLET_ADDRESS_MAX_LEN: usize = 128;
pub const NETWORK_MAX_LEN: usize = 20;
pub const COIN_NAME_MAX_LEN: usize = 32;
pub const PLAN_NAME_MAX_LEN: usize = 64;
pub const PLAN_FEATURE_MAX_LEN: usize = 120;
pub const REJECTION_REASON_MAX_LEN: usize = 500;
pub const EXPORT_FORMATS: &[&str] = &["csv", "json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_enum(field: &'static str, value: &str, allowed: &[&str]) -> ValidationResult {
    if allowed.iter().all(|candidate| value != *candidate) {
        return Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_positive_amount(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount <= &BigDecimal::zero() {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_non_negative(field: &'static str, amount: &BigDecimal) -> ValidationResult {
    if amount < &BigDecimal::zero() {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

/// Crypto wallet addresses: base58/bech32/hex style, no whitespace.
pub fn validate_wallet_address(address: &str) -> ValidationResult {
    validate_required("address", address)?;

    let len = address.len();
    if !(WALLET_ADDRESS_MIN_LEN..=WALLET_ADDRESS_MAX_LEN).contains(&len) {
        return Err(ValidationError::new(
            "address",
            format!(
                "must be between {} and {} characters",
                WALLET_ADDRESS_MIN_LEN, WALLET_ADDRESS_MAX_LEN
            ),
        ));
    }

    if !address.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            "address",
            "must contain only letters and digits",
        ));
    }

    Ok(())
}

/// Sanitizes and checks wallet details supplied with a deposit or withdrawal.
pub fn validate_wallet(wallet: WalletData) -> Result<WalletData, ValidationError> {
    let wallet = WalletData {
        address: sanitize_string(&wallet.address),
        network: sanitize_string(&wallet.network).to_uppercase(),
        coin_name: sanitize_string(&wallet.coin_name),
        converted_amount: wallet.converted_amount,
    };

    validate_wallet_address(&wallet.address)?;
    validate_required("network", &wallet.network)?;
    validate_max_len("network", &wallet.network, NETWORK_MAX_LEN)?;
    validate_required("coin_name", &wallet.coin_name)?;
    validate_max_len("coin_name", &wallet.coin_name, COIN_NAME_MAX_LEN)?;
    validate_non_negative("converted_amount", &wallet.converted_amount)?;

    Ok(wallet)
}

pub fn validate_plan_draft(draft: PlanDraft) -> Result<PlanDraft, ValidationError> {
    let draft = PlanDraft {
        name: sanitize_string(&draft.name),
        duration: sanitize_string(&draft.duration),
        features: draft
            .features
            .iter()
            .map(|feature| sanitize_string(feature))
            .filter(|feature| !feature.is_empty())
            .collect(),
        icon: draft.icon.map(|icon| sanitize_string(&icon)).filter(|icon| !icon.is_empty()),
        ..draft
    };

    validate_required("name", &draft.name)?;
    validate_max_len("name", &draft.name, PLAN_NAME_MAX_LEN)?;
    validate_non_negative("roi", &draft.roi)?;
    validate_non_negative("min_amount", &draft.min_amount)?;
    parse_duration_days(&draft.duration).map_err(|e| ValidationError::new("duration", e.to_string()))?;
    for feature in &draft.features {
        validate_max_len("features", feature, PLAN_FEATURE_MAX_LEN)?;
    }

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn wallet(address: &str) -> WalletData {
        WalletData {
            address: address.to_string(),
            network: " trc20 ".to_string(),
            coin_name: "USDT".to_string(),
            converted_amount: BigDecimal::from(100),
        }
    }

    fn draft() -> PlanDraft {
        PlanDraft {
            name: "  Starter   plan ".to_string(),
            roi: BigDecimal::from(8),
            min_amount: BigDecimal::from(100),
            duration: "7 days".to_string(),
            features: vec!["Daily reports".to_string(), "  ".to_string()],
            icon: Some("".to_string()),
        }
    }

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_enum_values() {
        assert!(validate_enum("format", "csv", EXPORT_FORMATS).is_ok());
        assert!(validate_enum("format", "xml", EXPORT_FORMATS).is_err());
    }

    #[test]
    fn sanitizes_string() {
        assert_eq!(sanitize_string("  hello\tworld  "), "hello world");
        assert_eq!(sanitize_string("single"), "single");
        assert_eq!(sanitize_string(" \n "), "");
        assert_eq!(sanitize_string("ab\u{0000}cd\u{0007}"), "abcd");
    }

    #[test]
    fn validates_positive_amount() {
        let positive = BigDecimal::from_str("1.23").expect("valid decimal");
        let zero = BigDecimal::from(0);
        let negative = BigDecimal::from(-1);

        assert!(validate_positive_amount("amount", &positive).is_ok());
        assert!(validate_positive_amount("amount", &zero).is_err());
        assert!(validate_positive_amount("amount", &negative).is_err());
    }

    #[test]
    fn validates_wallet_address() {
        assert!(validate_wallet_address("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf").is_ok());
        assert!(validate_wallet_address("short").is_err());
        assert!(validate_wallet_address("TXYZopYRdj2D9XRtbG411 XZZ3kM5VkAeBf").is_err());
        assert!(validate_wallet_address(&"a".repeat(129)).is_err());
    }

    #[test]
    fn normalizes_wallet() {
        let wallet = validate_wallet(wallet(" TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf ")).unwrap();
        assert_eq!(wallet.address, "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf");
        assert_eq!(wallet.network, "TRC20");
    }

    #[test]
    fn normalizes_plan_draft() {
        let draft = validate_plan_draft(draft()).unwrap();
        assert_eq!(draft.name, "Starter plan");
        assert_eq!(draft.features, vec!["Daily reports".to_string()]);
        assert_eq!(draft.icon, None);
    }

    #[test]
    fn rejects_bad_plan_drafts() {
        let mut bad = draft();
        bad.duration = "eventually".to_string();
        assert_eq!(validate_plan_draft(bad).unwrap_err().field, "duration");

        let mut bad = draft();
        bad.roi = BigDecimal::from(-2);
        assert_eq!(validate_plan_draft(bad).unwrap_err().field, "roi");
    }
}
