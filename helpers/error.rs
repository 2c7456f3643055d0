use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};

use crate::workflow::Step;

/// Errors produced while loading [`crate::config::StoryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Errors surfaced by an [`crate::client::IpAssetClient`] implementation.
///
/// Every variant originates in the protocol collaborator (node, contracts, RPC
/// transport); none of them is recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Bad endpoint, credentials or chain; raised before anything is submitted.
    #[error("client configuration error: {0}")]
    Config(String),

    /// Settings rejected before the client is built or the first step runs.
    #[error("invalid configuration")]
    InvalidConfig(#[from] ConfigError),

    /// Rejected before inclusion (insufficient funds, nonce, invalid parameters).
    #[error("transaction submission failed: {0}")]
    Submission(String),

    /// Contract-level rejection, either in simulation or as a failed receipt.
    #[error("transaction reverted{}: {reason}", in_tx(.tx_hash))]
    Reverted {
        tx_hash: Option<TxHash>,
        reason: String,
    },

    #[error("allowance of {token} for royalty module is {allowance}, payment needs {required}")]
    InsufficientAllowance {
        token: Address,
        allowance: U256,
        required: U256,
    },

    /// The transaction was sent but its receipt did not arrive in time. The
    /// mutation may or may not have landed on chain.
    #[error("timed out waiting for confirmation of {tx_hash}; on-chain state is unknown")]
    ConfirmationTimeout { tx_hash: TxHash },

    #[error("rpc transport error: {0}")]
    Transport(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn in_tx(tx_hash: &Option<TxHash>) -> String {
    tx_hash.map(|h| format!(" in {h}")).unwrap_or_default()
}

/// Failure of a workflow run, always tagged with the step that failed.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("step {step} failed")]
    Step {
        step: Step,
        #[source]
        source: ClientError,
    },

    #[error(
        "step {step} did not finish within {after:?}; the run was aborted and on-chain state must be checked before any retry"
    )]
    TimedOut { step: Step, after: Duration },

    #[error("step {step} returned no {field}; it is required by the next step")]
    MissingOutput { step: Step, field: &'static str },
}

impl WorkflowError {
    pub fn step(&self) -> Step {
        match self {
            WorkflowError::Step { step, .. }
            | WorkflowError::TimedOut { step, .. }
            | WorkflowError::MissingOutput { step, .. } => *step,
        }
    }
}
