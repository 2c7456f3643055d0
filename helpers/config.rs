//! Environment-driven configuration for scripts.

use std::{fmt, str::FromStr, time::Duration};

use alloy::primitives::Address;

use crate::error::ConfigError;

const DEFAULT_STEP_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 60;

/// Story networks the scripts know by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryChain {
    Odyssey,
    Aeneid,
    Mainnet,
    Other(u64),
}

impl StoryChain {
    pub fn id(self) -> u64 {
        match self {
            StoryChain::Odyssey => 1516,
            StoryChain::Aeneid => 1315,
            StoryChain::Mainnet => 1514,
            StoryChain::Other(id) => id,
        }
    }
}

impl FromStr for StoryChain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "odyssey" => Ok(StoryChain::Odyssey),
            "aeneid" => Ok(StoryChain::Aeneid),
            "mainnet" => Ok(StoryChain::Mainnet),
            other => other
                .parse::<u64>()
                .map(|id| match id {
                    1516 => StoryChain::Odyssey,
                    1315 => StoryChain::Aeneid,
                    1514 => StoryChain::Mainnet,
                    id => StoryChain::Other(id),
                })
                .map_err(|_| format!("unknown chain '{s}'")),
        }
    }
}

impl fmt::Display for StoryChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryChain::Odyssey => write!(f, "odyssey"),
            StoryChain::Aeneid => write!(f, "aeneid"),
            StoryChain::Mainnet => write!(f, "mainnet"),
            StoryChain::Other(id) => write!(f, "chain {id}"),
        }
    }
}

/// Deployed protocol contracts the client calls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAddresses {
    pub license_attachment_workflows: Address,
    pub derivative_workflows: Address,
    pub royalty_workflows: Address,
    pub royalty_module: Address,
    pub pil_template: Address,
}

/// Everything a script run needs.
#[derive(Clone)]
pub struct StoryConfig {
    pub private_key: String,
    pub rpc_url: String,
    pub chain: StoryChain,
    pub protocol: ProtocolAddresses,
    pub spg_nft_contract: Address,
    pub susd: Address,
    pub royalty_policy_lap: Address,
    pub wait_for_transaction: bool,
    pub step_timeout: Duration,
    pub confirmation_timeout: Duration,
}

impl fmt::Debug for StoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryConfig")
            .field("private_key", &"<redacted>")
            .field("rpc_url", &self.rpc_url)
            .field("chain", &self.chain)
            .field("protocol", &self.protocol)
            .field("spg_nft_contract", &self.spg_nft_contract)
            .field("susd", &self.susd)
            .field("royalty_policy_lap", &self.royalty_policy_lap)
            .field("wait_for_transaction", &self.wait_for_transaction)
            .field("step_timeout", &self.step_timeout)
            .field("confirmation_timeout", &self.confirmation_timeout)
            .finish()
    }
}

impl StoryConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // a missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let address = |var: &'static str| -> Result<Address, ConfigError> {
            let raw = required(var)?;
            raw.trim().parse::<Address>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
            })
        };
        let optional = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        let chain = match optional("STORY_CHAIN") {
            Some(raw) => raw.parse::<StoryChain>().map_err(|reason| ConfigError::Invalid {
                var: "STORY_CHAIN",
                reason,
            })?,
            None => StoryChain::Odyssey,
        };

        let wait_for_transaction = match optional("WAIT_FOR_TRANSACTION") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "WAIT_FOR_TRANSACTION",
                reason: format!("expected true or false, got '{raw}'"),
            })?,
            None => true,
        };

        let secs = |var: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match optional(var) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|s| *s > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| ConfigError::Invalid {
                        var,
                        reason: format!("expected a positive number of seconds, got '{raw}'"),
                    }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            private_key: required("WALLET_PRIVATE_KEY")?,
            rpc_url: required("RPC_PROVIDER_URL")?,
            chain,
            protocol: ProtocolAddresses {
                license_attachment_workflows: address("LICENSE_ATTACHMENT_WORKFLOWS_ADDRESS")?,
                derivative_workflows: address("DERIVATIVE_WORKFLOWS_ADDRESS")?,
                royalty_workflows: address("ROYALTY_WORKFLOWS_ADDRESS")?,
                royalty_module: address("ROYALTY_MODULE_ADDRESS")?,
                pil_template: address("PIL_TEMPLATE_ADDRESS")?,
            },
            spg_nft_contract: address("SPG_NFT_CONTRACT_ADDRESS")?,
            susd: address("SUSD_ADDRESS")?,
            royalty_policy_lap: address("ROYALTY_POLICY_LAP")?,
            wait_for_transaction,
            step_timeout: secs("STEP_TIMEOUT_SECS", DEFAULT_STEP_TIMEOUT_SECS)?,
            confirmation_timeout: secs(
                "CONFIRMATION_TIMEOUT_SECS",
                DEFAULT_CONFIRMATION_TIMEOUT_SECS,
            )?,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
