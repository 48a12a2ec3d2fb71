use serde::{Deserialize, Serialize};

/// The chain's primary stablecoin.
pub const STABLECOIN_DENOM: &str = "uusd";

/// The chain's native staking token.
pub const STAKING_DENOM: &str = "uluna";

const IBC_PREFIX: &str = "ibc/";

/// Which network the wallet lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    #[default]
    Standard,
    /// The legacy network, where native assets were redenominated.
    Classic,
}

impl NetworkMode {
    pub fn is_classic(self) -> bool {
        matches!(self, NetworkMode::Classic)
    }
}

pub fn is_ibc_denom(denom: &str) -> bool {
    denom.starts_with(IBC_PREFIX)
}

/// The hash an IBC denom is registered under in the whitelist.
pub fn ibc_hash(denom: &str) -> Option<&str> {
    denom.strip_prefix(IBC_PREFIX)
}

/// Denoms shown regardless of their computed value.
pub fn is_always_shown(denom: &str) -> bool {
    denom == STAKING_DENOM || denom == STABLECOIN_DENOM
}

/// Ticker a native denom carries on the legacy network.
///
/// `uluna` is `LUNC`; other `u`-prefixed fiat denoms become their first two
/// letters plus `TC` (`uusd` -> `USTC`, `ukrw` -> `KRTC`).
pub fn classic_symbol(denom: &str) -> String {
    if denom == STAKING_DENOM {
        return "LUNC".to_string();
    }
    if is_ibc_denom(denom) {
        return "IBC".to_string();
    }

    match denom.strip_prefix('u') {
        Some(code) if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) => {
            format!("{}TC", code[..2].to_uppercase())
        }
        _ => denom.to_uppercase(),
    }
}

/// Legacy-network assets that were redenominated, identified by their `TC` suffix.
pub fn is_redenominated(denom: &str) -> bool {
    classic_symbol(denom).ends_with("TC")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_symbols() {
        assert_eq!(classic_symbol("uluna"), "LUNC");
        assert_eq!(classic_symbol("uusd"), "USTC");
        assert_eq!(classic_symbol("ukrw"), "KRTC");
        assert_eq!(classic_symbol("umnt"), "MNTC");
        assert_eq!(classic_symbol("ibc/27394FB0"), "IBC");
        assert_eq!(classic_symbol("stake"), "STAKE");
    }

    #[test]
    fn redenominated_assets_end_in_tc() {
        assert!(is_redenominated("ukrw"));
        assert!(is_redenominated("uusd"));
        assert!(!is_redenominated("uluna"));
        assert!(!is_redenominated("ibc/27394FB0"));
    }

    #[test]
    fn ibc_hash_strips_prefix() {
        assert_eq!(ibc_hash("ibc/ABC"), Some("ABC"));
        assert_eq!(ibc_hash("uluna"), None);
    }

    #[test]
    fn network_mode_serde() {
        let mode: NetworkMode = serde_json::from_str(r#""classic""#).unwrap();
        assert!(mode.is_classic());
        assert_eq!(NetworkMode::default(), NetworkMode::Standard);
    }
}
