// Unit formatting helpers

use ethers::types::U256;
use ethers::utils::{format_ether, parse_ether};

use crate::error::{AppError, Result};

const WEI_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

/// 18-decimal amount as a decimal string with trailing zeros trimmed
/// ("50", "12.5", "0").
pub fn format_war(amount: U256) -> String {
    let s = format_ether(amount);
    match s.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int.to_string()
            } else {
                format!("{}.{}", int, frac)
            }
        }
        None => s,
    }
}

/// 18-decimal amount rendered as whole tokens, fraction dropped.
/// Experience values are stored scaled on chain but shown as plain integers.
pub fn format_whole_tokens(amount: U256) -> String {
    (amount / U256::from(WEI_PER_TOKEN)).to_string()
}

/// Parse a decimal token string ("12.5") into an 18-decimal amount.
pub fn parse_war(amount: &str) -> Result<U256> {
    parse_ether(amount)
        .map_err(|e| AppError::BadRequest(format!("Invalid amount '{}': {}", amount, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_war_trims_trailing_zeros() {
        assert_eq!(format_war(parse_war("50").unwrap()), "50");
        assert_eq!(format_war(parse_war("12.5").unwrap()), "12.5");
        assert_eq!(format_war(U256::zero()), "0");
    }

    #[test]
    fn format_whole_tokens_drops_fraction() {
        assert_eq!(format_whole_tokens(parse_war("31.9").unwrap()), "31");
        assert_eq!(format_whole_tokens(U256::zero()), "0");
    }

    #[test]
    fn parse_war_rejects_garbage() {
        assert!(parse_war("not a number").is_err());
    }
}
