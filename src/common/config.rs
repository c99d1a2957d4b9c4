use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use log::{debug, warn};
use serde::Serialize;
use strum::IntoEnumIterator;
use url::Url;

use crate::common::constants::{Contract, Network, ACCOUNTS_VAR, PRIVATE_KEYS_VAR};
use crate::common::env_profile::{EnvProfile, EnvVars, RunMode};
use crate::common::error::ConfigError;
use crate::common::utils::parse_comma_list;

/// Resolved chain settings: endpoints, accounts with their keys, deployed contracts.
///
/// `account_keys` is positionally paired with `accounts`. It is left out of
/// both `Debug` and serialized output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub rpcs: BTreeMap<String, String>,
    pub accounts: Vec<String>,
    #[serde(skip_serializing)]
    pub account_keys: Vec<String>,
    pub contract_address: BTreeMap<String, String>,
}

impl Config {
    /// Loads `envs/` for the resolved mode and builds the config.
    pub fn load(mode: Option<&str>) -> Result<Self, ConfigError> {
        let profile = EnvProfile::with_mode(RunMode::resolve(mode));
        Ok(Self::from_vars(&profile.load()?))
    }

    pub fn load_from(dir: impl Into<PathBuf>, mode: Option<&str>) -> Result<Self, ConfigError> {
        let profile = EnvProfile::new(dir, RunMode::resolve(mode));
        Ok(Self::from_vars(&profile.load()?))
    }

    pub fn from_vars(vars: &EnvVars) -> Self {
        Self::from_lookup(|key| vars.get(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let accounts = parse_comma_list(lookup(ACCOUNTS_VAR).as_deref());
        let account_keys = parse_comma_list(lookup(PRIVATE_KEYS_VAR).as_deref());
        debug!(
            "parsed {} account(s) and {} private key(s)",
            accounts.len(),
            account_keys.len()
        );

        let rpcs = Network::iter()
            .map(|n| (n.to_string(), n.rpc_url().to_string()))
            .collect();
        let contract_address = Contract::iter()
            .map(|c| (c.to_string(), c.address().to_string()))
            .collect();

        Config {
            rpcs,
            accounts,
            account_keys,
            contract_address,
        }
    }

    pub fn rpc_url(&self, network: Network) -> Option<&str> {
        let name: &str = network.as_ref();
        self.rpcs.get(name).map(String::as_str)
    }

    pub fn contract(&self, contract: Contract) -> Option<&str> {
        let name: &str = contract.as_ref();
        self.contract_address.get(name).map(String::as_str)
    }

    /// Pairs each account with the key at the same position.
    pub fn account_pairs(&self) -> Result<Vec<(&str, &str)>, ConfigError> {
        if self.accounts.len() != self.account_keys.len() {
            return Err(ConfigError::KeyCountMismatch {
                accounts: self.accounts.len(),
                keys: self.account_keys.len(),
            });
        }
        Ok(self
            .accounts
            .iter()
            .map(String::as_str)
            .zip(self.account_keys.iter().map(String::as_str))
            .collect())
    }

    /// Non-fatal checks. Each returned entry describes one problem; key
    /// material never appears in them.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (name, rpc) in &self.rpcs {
            if let Err(e) = Url::parse(rpc) {
                warnings.push(format!("rpc '{name}' is not a valid url: {e}"));
            }
        }
        for (name, address) in &self.contract_address {
            if !is_address(address) {
                warnings.push(format!("contract '{name}' has malformed address '{address}'"));
            }
        }
        for (i, account) in self.accounts.iter().enumerate() {
            if account.is_empty() {
                warnings.push(format!("account #{i} is empty"));
            } else if !is_address(account) {
                warnings.push(format!("account #{i} '{account}' is not a 20-byte hex address"));
            }
        }
        for (i, key) in self.account_keys.iter().enumerate() {
            if key.is_empty() {
                warnings.push(format!("private key #{i} is empty"));
            }
        }
        if self.accounts.len() != self.account_keys.len() {
            warnings.push(format!(
                "{} account(s) but {} private key(s)",
                self.accounts.len(),
                self.account_keys.len()
            ));
        }

        for w in &warnings {
            warn!("{w}");
        }
        warnings
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpcs", &self.rpcs)
            .field("accounts", &self.accounts)
            .field(
                "account_keys",
                &format_args!("<{} redacted>", self.account_keys.len()),
            )
            .field("contract_address", &self.contract_address)
            .finish()
    }
}

fn is_address(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(body) => body.len() == 40 && hex::decode(body).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn splits_accounts_and_keys() {
        let config = config_with(&[("ACCOUNTS", "0xAAA,0xBBB"), ("PRIVATE_KEYS", "keyA,keyB")]);
        assert_eq!(config.accounts, vec!["0xAAA", "0xBBB"]);
        assert_eq!(config.account_keys, vec!["keyA", "keyB"]);
    }

    #[test]
    fn unset_accounts_are_empty() {
        let config = config_with(&[]);
        assert!(config.accounts.is_empty());
        assert!(config.account_keys.is_empty());
    }

    #[test]
    fn fixed_tables_ignore_environment() {
        let config = config_with(&[("ACCOUNTS", "x"), ("RPC_URL", "http://localhost")]);
        assert_eq!(config.rpcs.len(), 2);
        assert_eq!(config.rpcs["dxt"], "https://testnet-rpc.dxchain.com");
        assert_eq!(
            config.rpcs["rinkeby"],
            "https://rinkeby.infura.io/v3/a52857edcc904d6dbae349e4a5ade517"
        );
        assert_eq!(config.contract_address.len(), 1);
        assert_eq!(
            config.contract(Contract::People),
            Some("0x28da7558c7b7bD6Ff9a6F0dFE6F767809ECd2afa")
        );
        assert_eq!(config.rpc_url(Network::Dxt), Some("https://testnet-rpc.dxchain.com"));
    }

    #[test]
    fn building_twice_is_equal() {
        let pairs = [("ACCOUNTS", "0xAAA"), ("PRIVATE_KEYS", "keyA")];
        assert_eq!(config_with(&pairs), config_with(&pairs));
    }

    #[test]
    fn pairs_by_position() {
        let config = config_with(&[("ACCOUNTS", "0xAAA,0xBBB"), ("PRIVATE_KEYS", "keyA,keyB")]);
        let pairs = config.account_pairs().unwrap();
        assert_eq!(pairs, vec![("0xAAA", "keyA"), ("0xBBB", "keyB")]);
    }

    #[test]
    fn mismatched_lengths_fail_pairing_only() {
        let config = config_with(&[("ACCOUNTS", "0xAAA,0xBBB"), ("PRIVATE_KEYS", "keyA")]);
        assert_eq!(config.accounts.len(), 2);
        match config.account_pairs() {
            Err(ConfigError::KeyCountMismatch { accounts, keys }) => {
                assert_eq!((accounts, keys), (2, 1));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn debug_and_json_hide_keys() {
        let config = config_with(&[("ACCOUNTS", "0xAAA"), ("PRIVATE_KEYS", "supersecret")]);
        let debug = format!("{config:?}");
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("<1 redacted>"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("supersecret"));
        assert!(!json.contains("account_keys"));
        assert!(json.contains("0xAAA"));
    }

    #[test]
    fn validate_accepts_well_formed_config() {
        let account = "0x28da7558c7b7bD6Ff9a6F0dFE6F767809ECd2afa";
        let config = config_with(&[("ACCOUNTS", account), ("PRIVATE_KEYS", "k")]);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validate_reports_problems_without_keys() {
        let config = config_with(&[("ACCOUNTS", "0xAAA,"), ("PRIVATE_KEYS", "hidden")]);
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("account #0")));
        assert!(warnings.iter().any(|w| w == "account #1 is empty"));
        assert!(warnings.iter().any(|w| w.contains("2 account(s) but 1 private key(s)")));
        assert!(warnings.iter().all(|w| !w.contains("hidden")));
    }
}
