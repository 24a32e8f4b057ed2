use std::collections::BTreeMap;

use crate::address::AddressFormat;

/// Native coin balances of the connected account, denom -> base units.
pub type NativeBalances = BTreeMap<String, u128>;

/// Pick the balance source for a token.
///
/// Contract tokens use the per-contract balance, which is `None` while it
/// is still loading. Native tokens read the balance map; a denom the
/// account does not hold counts as zero.
#[must_use]
pub fn select_balance(
    format: &AddressFormat,
    token_identifier: &str,
    native_balances: &NativeBalances,
    contract_balance: Option<u128>,
) -> Option<u128> {
    if format.is_valid(token_identifier) {
        contract_balance
    } else {
        Some(native_balances.get(token_identifier).copied().unwrap_or(0))
    }
}

/// Denom the fee should be paid in when the user has not picked one.
///
/// Prefers `uusd`, then `uluna`, then whatever else the account holds.
#[must_use]
pub fn initial_gas_denom(native_balances: &NativeBalances) -> String {
    let held = |denom: &str| native_balances.get(denom).is_some_and(|a| *a > 0);
    if held("uusd") {
        return "uusd".to_string();
    }
    if held("uluna") {
        return "uluna".to_string();
    }
    native_balances
        .iter()
        .find(|(_, amount)| **amount > 0)
        .map(|(denom, _)| denom.clone())
        .unwrap_or_else(|| "uluna".to_string())
}
