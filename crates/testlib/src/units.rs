use alloy::primitives::{U256, utils::parse_ether};

/// Parses a decimal amount of a token with 18 decimals into atoms, e.g.
/// `ether("0.01")` is `10^16`.
pub fn ether(amount: &str) -> U256 {
    parse_ether(amount).unwrap_or_else(|err| panic!("invalid ether amount {amount}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_amounts() {
        assert_eq!(ether("1"), U256::from(10).pow(U256::from(18)));
        assert_eq!(ether("0.01"), U256::from(10).pow(U256::from(16)));
        assert_eq!(ether("30.3"), U256::from(303) * U256::from(10).pow(U256::from(17)));
    }
}
