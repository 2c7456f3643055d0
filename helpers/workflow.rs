//! Register a commercial derivative, pay into it and claim the parent's share.
//!
//! The run is a strict chain: each step needs an output of the step before it,
//! so the first failure aborts everything after it. Nothing is retried, since
//! registration steps mint a new asset on every call.

use std::{fmt, future::Future, time::Duration};

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use crate::client::{
    ClaimRevenueRequest, ClaimRevenueResponse, DerivativeData, IpAssetClient, PayRoyaltyRequest,
    PayRoyaltyResponse, RegisterDerivativeRequest, RegisterDerivativeResponse,
    RegisterRootRequest, RegisterRootResponse, RoyaltyClaimDetail, TxOptions,
};
use crate::config::StoryConfig;
use crate::error::{ClientError, ConfigError, WorkflowError};
use crate::story::StoryClient;
use crate::terms::{commercial_remix_terms, CommercialRemixParams, IpMetadata, PilTerms};

/// Steps of the workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Configure,
    RegisterRoot,
    RegisterDerivative,
    PayRoyalty,
    ClaimRevenue,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Configure => "configure",
            Step::RegisterRoot => "register-root",
            Step::RegisterDerivative => "register-derivative",
            Step::PayRoyalty => "pay-royalty",
            Step::ClaimRevenue => "claim-revenue",
        };
        f.write_str(name)
    }
}

/// Inputs of a workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowParams {
    pub spg_nft_contract: Address,
    pub terms: Vec<PilTerms>,
    pub root_metadata: IpMetadata,
    pub derivative_metadata: IpMetadata,
    /// Royalty currency, used for both payment and claim.
    pub currency_token: Address,
    pub royalty_policy: Address,
    /// Payer of the royalty; `Address::ZERO` for an external payer.
    pub payer_ip_id: Address,
    pub payment_amount: U256,
    pub claim_amount: U256,
    pub tx: TxOptions,
    pub step_timeout: Duration,
}

impl WorkflowParams {
    /// The commercial remix scenario: 50% revenue share, no minting fee,
    /// pay 2 units of the currency from outside and claim 1.
    pub fn commercial_remix(config: &StoryConfig) -> Result<Self, ClientError> {
        let terms = commercial_remix_terms(CommercialRemixParams {
            commercial_rev_share: 50,
            default_minting_fee: U256::ZERO,
            royalty_policy: config.royalty_policy_lap,
            currency: config.susd,
        })?;
        let metadata = IpMetadata::placeholder()?;

        Ok(Self {
            spg_nft_contract: config.spg_nft_contract,
            terms: vec![terms],
            root_metadata: metadata.clone(),
            derivative_metadata: metadata,
            currency_token: config.susd,
            royalty_policy: config.royalty_policy_lap,
            payer_ip_id: Address::ZERO,
            payment_amount: U256::from(2),
            claim_amount: U256::from(1),
            tx: TxOptions {
                wait_for_transaction: config.wait_for_transaction,
            },
            step_timeout: config.step_timeout,
        })
    }
}

/// Responses of every step of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub root: RegisterRootResponse,
    pub derivative: RegisterDerivativeResponse,
    pub payment: PayRoyaltyResponse,
    pub claim: ClaimRevenueResponse,
}

impl fmt::Display for WorkflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Root IPA created at transaction hash {}, IPA ID: {}, License Terms ID: {}",
            self.root.tx_hash,
            display_opt(&self.root.ip_id),
            join(&self.root.license_terms_ids),
        )?;
        writeln!(
            f,
            "Derivative IPA created and linked at transaction hash {}, IPA ID: {}",
            self.derivative.tx_hash,
            display_opt(&self.derivative.child_ip_id),
        )?;
        writeln!(f, "Paid royalty at transaction hash {}", self.payment.tx_hash)?;
        write!(
            f,
            "Claimed revenue: {} at snapshotId {}",
            join(&self.claim.amounts_claimed),
            display_opt(&self.claim.snapshot_id),
        )
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

fn join(values: &[U256]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Runs one step under the step timeout and tags any failure with the step.
async fn run_step<T, F>(step: Step, timeout: Duration, call: F) -> Result<T, WorkflowError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    info!(%step, "starting");
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(WorkflowError::Step { step, source }),
        Err(_) => Err(WorkflowError::TimedOut {
            step,
            after: timeout,
        }),
    }
}

/// Connects a [`StoryClient`] under the step timeout.
pub async fn configure(config: &StoryConfig) -> Result<StoryClient, WorkflowError> {
    run_step(
        Step::Configure,
        config.step_timeout,
        StoryClient::connect(config),
    )
    .await
}

/// Executes registration, derivative linking, payment and claim in order
/// against `client`.
///
/// Every step consumes ids decoded from the previous receipt, so a run that
/// does not wait for confirmation is rejected before anything is minted.
pub async fn run_workflow<C>(
    client: &C,
    params: &WorkflowParams,
) -> Result<WorkflowReport, WorkflowError>
where
    C: IpAssetClient + ?Sized,
{
    if !params.tx.wait_for_transaction {
        return Err(WorkflowError::Step {
            step: Step::Configure,
            source: ConfigError::Invalid {
                var: "WAIT_FOR_TRANSACTION",
                reason: "later steps need ids from confirmed receipts".to_string(),
            }
            .into(),
        });
    }
    let timeout = params.step_timeout;

    let request = RegisterRootRequest {
        spg_nft_contract: params.spg_nft_contract,
        terms: params.terms.clone(),
        metadata: params.root_metadata.clone(),
        recipient: None,
        tx: params.tx,
    };
    debug!(?request, "registering root ip");
    let root = run_step(
        Step::RegisterRoot,
        timeout,
        client.mint_and_register_ip_with_terms(request),
    )
    .await?;
    let parent_ip_id = root.ip_id.ok_or(WorkflowError::MissingOutput {
        step: Step::RegisterRoot,
        field: "ip_id",
    })?;
    if root.license_terms_ids.is_empty() {
        return Err(WorkflowError::MissingOutput {
            step: Step::RegisterRoot,
            field: "license_terms_ids",
        });
    }
    info!(
        tx_hash = %root.tx_hash,
        ip_id = %parent_ip_id,
        license_terms_ids = %join(&root.license_terms_ids),
        "root ip registered"
    );

    let request = RegisterDerivativeRequest {
        spg_nft_contract: params.spg_nft_contract,
        deriv_data: DerivativeData {
            parent_ip_ids: vec![parent_ip_id],
            license_terms_ids: root.license_terms_ids.clone(),
        },
        metadata: params.derivative_metadata.clone(),
        recipient: None,
        tx: params.tx,
    };
    debug!(?request, "registering derivative");
    let derivative = run_step(
        Step::RegisterDerivative,
        timeout,
        client.mint_and_register_derivative(request),
    )
    .await?;
    let child_ip_id = derivative.child_ip_id.ok_or(WorkflowError::MissingOutput {
        step: Step::RegisterDerivative,
        field: "child_ip_id",
    })?;
    info!(
        tx_hash = %derivative.tx_hash,
        ip_id = %child_ip_id,
        "derivative ip registered and linked"
    );

    let request = PayRoyaltyRequest {
        receiver_ip_id: child_ip_id,
        payer_ip_id: params.payer_ip_id,
        token: params.currency_token,
        amount: params.payment_amount,
        tx: params.tx,
    };
    debug!(?request, "paying royalty");
    let payment = run_step(
        Step::PayRoyalty,
        timeout,
        client.pay_royalty_on_behalf(request),
    )
    .await?;
    info!(tx_hash = %payment.tx_hash, "royalty paid");

    let request = ClaimRevenueRequest {
        ancestor_ip_id: parent_ip_id,
        claimer: parent_ip_id,
        royalty_claim_details: vec![RoyaltyClaimDetail {
            child_ip_id,
            royalty_policy: params.royalty_policy,
            currency_token: params.currency_token,
            amount: params.claim_amount,
        }],
        tx: params.tx,
    };
    debug!(?request, "claiming revenue");
    let claim = run_step(Step::ClaimRevenue, timeout, client.claim_revenue(request)).await?;
    let snapshot_id = claim.snapshot_id.ok_or(WorkflowError::MissingOutput {
        step: Step::ClaimRevenue,
        field: "snapshot_id",
    })?;
    info!(
        tx_hash = %claim.tx_hash,
        amounts_claimed = %join(&claim.amounts_claimed),
        %snapshot_id,
        "revenue claimed"
    );

    Ok(WorkflowReport {
        root,
        derivative,
        payment,
        claim,
    })
}
