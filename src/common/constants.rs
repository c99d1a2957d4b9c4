use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const ACCOUNTS_VAR: &str = "ACCOUNTS";
pub const PRIVATE_KEYS_VAR: &str = "PRIVATE_KEYS";
pub const NODE_ENV_VAR: &str = "NODE_ENV";

pub const DEFAULT_ENV_DIR: &str = "envs/";
pub const DEFAULT_NODE_ENV: &str = "test";

/// Networks with a known RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Dxt,
    Rinkeby,
}

impl Network {
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::Dxt => "https://testnet-rpc.dxchain.com",
            Network::Rinkeby => "https://rinkeby.infura.io/v3/a52857edcc904d6dbae349e4a5ade517",
        }
    }
}

/// Contracts already deployed, keyed by their logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
pub enum Contract {
    People,
}

impl Contract {
    pub fn address(&self) -> &'static str {
        match self {
            Contract::People => "0x28da7558c7b7bD6Ff9a6F0dFE6F767809ECd2afa",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn network_names_are_lowercase() {
        let names: Vec<String> = Network::iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["dxt", "rinkeby"]);
        assert_eq!(Network::from_str("rinkeby").unwrap(), Network::Rinkeby);
    }

    #[test]
    fn contract_name_keeps_case() {
        let name: &str = Contract::People.as_ref();
        assert_eq!(name, "People");
        assert!(Contract::from_str("people").is_err());
    }
}
