//! Common helpers for Story protocol scripts and tests

mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod story;
pub mod terms;
pub mod workflow;

pub use client::{
    ClaimRevenueRequest, ClaimRevenueResponse, DerivativeData, IpAssetClient, PayRoyaltyRequest,
    PayRoyaltyResponse, RegisterDerivativeRequest, RegisterDerivativeResponse,
    RegisterRootRequest, RegisterRootResponse, RoyaltyClaimDetail, TxOptions,
};
pub use config::{ProtocolAddresses, StoryChain, StoryConfig};
pub use error::{ClientError, ConfigError, WorkflowError};
pub use story::StoryClient;
pub use terms::{commercial_remix_terms, padded_hash, CommercialRemixParams, IpMetadata, PilTerms};
pub use workflow::{run_workflow, Step, WorkflowParams, WorkflowReport};

/// Script setup: a connected client plus the config it was built from
pub struct ClientSetup {
    pub client: StoryClient,
    pub config: StoryConfig,
}

/// Load configuration from the environment and connect a client.
///
/// This is the first step of every script run; all failures are reported as
/// [`Step::Configure`] so nothing reaches the chain.
pub async fn setup_client() -> Result<ClientSetup, WorkflowError> {
    let config = StoryConfig::from_env().map_err(|e| WorkflowError::Step {
        step: Step::Configure,
        source: e.into(),
    })?;
    let client = workflow::configure(&config).await?;
    Ok(ClientSetup { client, config })
}
