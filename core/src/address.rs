//! Chain address syntax checks.
//!
//! Terra addresses are bech32 strings with the `terra` prefix. Accounts
//! carry 20 bytes of data, contracts 32 bytes. With the `terra` prefix that
//! is 44 and 64 characters.

pub const DEFAULT_PREFIX: &str = "terra";

const ACCOUNT_BYTES: usize = 20;
const CONTRACT_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFormat {
    prefix: String,
}

impl Default for AddressFormat {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl AddressFormat {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `text` is a well-formed address on this chain.
    ///
    /// Checks bech32 checksum, prefix and payload length. Says nothing
    /// about whether the account exists.
    #[must_use]
    pub fn is_valid(&self, text: &str) -> bool {
        match bech32::decode(text) {
            Ok((hrp, data)) => {
                hrp.to_string().eq_ignore_ascii_case(&self.prefix)
                    && (data.len() == ACCOUNT_BYTES || data.len() == CONTRACT_BYTES)
            }
            Err(_) => false,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn accepts_account_address() {
        assert!(AddressFormat::default().is_valid(SENDER));
        assert!(AddressFormat::default().is_valid(RECIPIENT));
    }

    #[test]
    fn accepts_contract_address() {
        assert!(AddressFormat::default().is_valid(CONTRACT));
    }

    #[test]
    fn rejects_bad_checksum() {
        let broken = SENDER.replace("exk7yu", "exk7yv");
        assert!(!AddressFormat::default().is_valid(&broken));
    }

    const COSMOS_ACCOUNT: &str = "cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu";
    const COSMOS_CONTRACT: &str =
        "cosmos1qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurs79d55s";

    #[test]
    fn rejects_other_prefix() {
        assert!(!AddressFormat::default().is_valid(COSMOS_ACCOUNT));
        assert!(!AddressFormat::new("cosmos").is_valid(SENDER));
    }

    #[test]
    fn other_prefix_accepts_its_own_addresses() {
        let format = AddressFormat::new("cosmos");
        assert_eq!(COSMOS_ACCOUNT.len(), 45);
        assert!(format.is_valid(COSMOS_ACCOUNT));
        assert!(format.is_valid(COSMOS_CONTRACT));
    }

    #[test]
    fn rejects_wrong_payload_length() {
        let format = AddressFormat::default();
        // 21 and 19 data bytes, both with valid checksums
        assert!(!format.is_valid("terra1qurswpc8qurswpc8qurswpc8qurswpc8qu360d2x"));
        assert!(!format.is_valid("terra1qurswpc8qurswpc8qurswpc8qurswpc84ha6r"));
    }

    #[test]
    fn rejects_denoms_and_names() {
        let format = AddressFormat::default();
        assert!(!format.is_valid("uluna"));
        assert!(!format.is_valid("alice.ust"));
        assert!(!format.is_valid(""));
    }

    #[test]
    fn prefix_is_case_insensitive() {
        let format = AddressFormat::new("TERRA");
        assert_eq!(format.prefix(), "terra");
        assert!(format.is_valid(SENDER));
    }
}
