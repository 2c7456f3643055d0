//! `alloy`-backed [`IpAssetClient`] talking to deployed Story contracts.

use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{
        DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider,
        ProviderBuilder, WatchTxError,
    },
    rpc::types::{Log, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::bindings::{
    IDerivativeWorkflows, IERC20, IIPAssetRegistry, IIpRoyaltyVault, IIpRoyaltyVaultV1,
    ILicenseAttachmentWorkflows, ILicensingModule, IPMetadata, IRoyaltyModule, IRoyaltyWorkflows,
    MakeDerivative, PILTerms, RoyaltyClaimDetails,
};
use crate::client::{
    ClaimRevenueRequest, ClaimRevenueResponse, IpAssetClient, PayRoyaltyRequest,
    PayRoyaltyResponse, RegisterDerivativeRequest, RegisterDerivativeResponse,
    RegisterRootRequest, RegisterRootResponse,
};
use crate::config::{ProtocolAddresses, StoryConfig};
use crate::error::{ClientError, ConfigError};

/// Client handle bound to one signer, one RPC endpoint and one chain.
#[derive(Clone)]
pub struct StoryClient {
    provider: DynProvider,
    signer: Address,
    protocol: ProtocolAddresses,
    confirmation_timeout: Duration,
}

impl StoryClient {
    /// Builds a signing provider and checks that the endpoint serves the
    /// configured chain. Nothing is submitted.
    pub async fn connect(config: &StoryConfig) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = config
            .private_key
            .trim()
            .parse()
            .map_err(|e: alloy::signers::local::LocalSignerError| ConfigError::Invalid {
                var: "WALLET_PRIVATE_KEY",
                reason: e.to_string(),
            })?;
        let signer_address = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&config.rpc_url)
            .await
            .map_err(|e| ClientError::Config(format!("cannot connect to {}: {e}", config.rpc_url)))?
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ClientError::Config(format!("cannot query chain id: {e}")))?;
        if chain_id != config.chain.id() {
            return Err(ClientError::Config(format!(
                "endpoint serves chain {chain_id}, expected {} ({})",
                config.chain.id(),
                config.chain
            )));
        }

        info!(signer = %signer_address, chain = %config.chain, "story client configured");
        Ok(Self {
            provider,
            signer: signer_address,
            protocol: config.protocol,
            confirmation_timeout: config.confirmation_timeout,
        })
    }

    /// Returns the hash right away, or waits for a successful receipt.
    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
        wait: bool,
    ) -> Result<(TxHash, Option<TransactionReceipt>), ClientError> {
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, wait, "transaction sent");
        if !wait {
            return Ok((tx_hash, None));
        }

        let receipt = pending
            .with_timeout(Some(self.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    ClientError::ConfirmationTimeout { tx_hash }
                }
                other => ClientError::Transport(other.to_string()),
            })?;
        if !receipt.status() {
            return Err(ClientError::Reverted {
                tx_hash: Some(tx_hash),
                reason: "transaction included with failed status".to_string(),
            });
        }
        Ok((tx_hash, Some(receipt)))
    }
}

/// Maps a send-time failure. Reverts show up here during gas estimation.
fn submission_error(err: alloy::contract::Error) -> ClientError {
    let message = err.to_string();
    if err.as_revert_data().is_some() || message.contains("execution reverted") {
        ClientError::Reverted {
            tx_hash: None,
            reason: message,
        }
    } else {
        ClientError::Submission(message)
    }
}

/// Decodes every log of event `E`, in log order.
fn decode_events<E: SolEvent>(logs: &[Log]) -> Vec<E> {
    logs.iter()
        .filter_map(|log| log.log_decode::<E>().ok())
        .map(|decoded| decoded.inner.data)
        .collect()
}

/// Registered IP id and token id, from the first `IPRegistered` log.
fn registered_ip(logs: &[Log]) -> (Option<Address>, Option<U256>) {
    match decode_events::<IIPAssetRegistry::IPRegistered>(logs)
        .into_iter()
        .next()
    {
        Some(event) => (Some(event.ipId), Some(event.tokenId)),
        None => (None, None),
    }
}

fn attached_license_terms(logs: &[Log]) -> Vec<U256> {
    decode_events::<ILicensingModule::LicenseTermsAttached>(logs)
        .into_iter()
        .map(|attached| attached.licenseTermsId)
        .collect()
}

/// Snapshot id and claimed amounts. Older vaults emit `SnapshotCompleted`
/// with a trailing `unclaimedTokens` field, so both layouts are accepted.
fn claimed_revenue(logs: &[Log]) -> (Option<U256>, Vec<U256>) {
    let snapshot_id = decode_events::<IIpRoyaltyVault::SnapshotCompleted>(logs)
        .into_iter()
        .map(|e| e.snapshotId)
        .chain(
            decode_events::<IIpRoyaltyVaultV1::SnapshotCompleted>(logs)
                .into_iter()
                .map(|e| e.snapshotId),
        )
        .next();
    let amounts_claimed = decode_events::<IIpRoyaltyVault::RevenueTokenClaimed>(logs)
        .into_iter()
        .map(|e| e.amount)
        .collect();
    (snapshot_id, amounts_claimed)
}

#[async_trait]
impl IpAssetClient for StoryClient {
    async fn mint_and_register_ip_with_terms(
        &self,
        request: RegisterRootRequest,
    ) -> Result<RegisterRootResponse, ClientError> {
        if request.terms.is_empty() {
            return Err(ClientError::InvalidInput(
                "at least one set of license terms is required".to_string(),
            ));
        }
        let workflows = ILicenseAttachmentWorkflows::new(
            self.protocol.license_attachment_workflows,
            &self.provider,
        );
        let terms: Vec<PILTerms> = request.terms.iter().map(PILTerms::from).collect();
        let pending = workflows
            .mintAndRegisterIpAndAttachPILTerms(
                request.spg_nft_contract,
                request.recipient.unwrap_or(self.signer),
                IPMetadata::from(&request.metadata),
                terms,
            )
            .send()
            .await
            .map_err(submission_error)?;

        let (tx_hash, receipt) = self.confirm(pending, request.tx.wait_for_transaction).await?;
        let Some(receipt) = receipt else {
            return Ok(RegisterRootResponse {
                tx_hash,
                ip_id: None,
                token_id: None,
                license_terms_ids: Vec::new(),
            });
        };

        let logs = receipt.inner.logs();
        let (ip_id, token_id) = registered_ip(logs);
        if ip_id.is_none() {
            warn!(%tx_hash, "confirmed registration has no IPRegistered log");
        }

        Ok(RegisterRootResponse {
            tx_hash,
            ip_id,
            token_id,
            license_terms_ids: attached_license_terms(logs),
        })
    }

    async fn mint_and_register_derivative(
        &self,
        request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, ClientError> {
        let deriv = &request.deriv_data;
        if deriv.parent_ip_ids.is_empty() {
            return Err(ClientError::InvalidInput(
                "a derivative needs at least one parent".to_string(),
            ));
        }
        if deriv.parent_ip_ids.len() != deriv.license_terms_ids.len() {
            return Err(ClientError::InvalidInput(format!(
                "{} parents but {} license terms ids",
                deriv.parent_ip_ids.len(),
                deriv.license_terms_ids.len()
            )));
        }

        let workflows =
            IDerivativeWorkflows::new(self.protocol.derivative_workflows, &self.provider);
        let pending = workflows
            .mintAndRegisterIpAndMakeDerivative(
                request.spg_nft_contract,
                MakeDerivative {
                    parentIpIds: deriv.parent_ip_ids.clone(),
                    licenseTemplate: self.protocol.pil_template,
                    licenseTermsIds: deriv.license_terms_ids.clone(),
                    royaltyContext: Bytes::new(),
                },
                IPMetadata::from(&request.metadata),
                request.recipient.unwrap_or(self.signer),
            )
            .send()
            .await
            .map_err(submission_error)?;

        let (tx_hash, receipt) = self.confirm(pending, request.tx.wait_for_transaction).await?;
        let (child_ip_id, token_id) = match receipt {
            Some(receipt) => registered_ip(receipt.inner.logs()),
            None => (None, None),
        };
        if child_ip_id.is_none() && request.tx.wait_for_transaction {
            warn!(%tx_hash, "confirmed derivative has no IPRegistered log");
        }

        Ok(RegisterDerivativeResponse {
            tx_hash,
            child_ip_id,
            token_id,
        })
    }

    async fn pay_royalty_on_behalf(
        &self,
        request: PayRoyaltyRequest,
    ) -> Result<PayRoyaltyResponse, ClientError> {
        let token = IERC20::new(request.token, &self.provider);
        let allowance: U256 = token
            .allowance(self.signer, self.protocol.royalty_module)
            .call()
            .await
            .map_err(|e| ClientError::Transport(format!("allowance lookup failed: {e}")))?;
        if allowance < request.amount {
            warn!(
                %allowance,
                required = %request.amount,
                "royalty module is not approved to spend the payment"
            );
            return Err(ClientError::InsufficientAllowance {
                token: request.token,
                allowance,
                required: request.amount,
            });
        }

        let royalty = IRoyaltyModule::new(self.protocol.royalty_module, &self.provider);
        let pending = royalty
            .payRoyaltyOnBehalf(
                request.receiver_ip_id,
                request.payer_ip_id,
                request.token,
                request.amount,
            )
            .send()
            .await
            .map_err(submission_error)?;

        let (tx_hash, _) = self.confirm(pending, request.tx.wait_for_transaction).await?;
        Ok(PayRoyaltyResponse { tx_hash })
    }

    async fn claim_revenue(
        &self,
        request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, ClientError> {
        let details: Vec<RoyaltyClaimDetails> = request
            .royalty_claim_details
            .iter()
            .map(|d| RoyaltyClaimDetails {
                childIpId: d.child_ip_id,
                royaltyPolicy: d.royalty_policy,
                currencyToken: d.currency_token,
                amount: d.amount,
            })
            .collect();

        let workflows = IRoyaltyWorkflows::new(self.protocol.royalty_workflows, &self.provider);
        let pending = workflows
            .transferToVaultAndSnapshotAndClaimByTokenBatch(
                request.ancestor_ip_id,
                request.claimer,
                details,
            )
            .send()
            .await
            .map_err(submission_error)?;

        let (tx_hash, receipt) = self.confirm(pending, request.tx.wait_for_transaction).await?;
        let Some(receipt) = receipt else {
            return Ok(ClaimRevenueResponse {
                tx_hash,
                snapshot_id: None,
                amounts_claimed: Vec::new(),
            });
        };

        let (snapshot_id, amounts_claimed) = claimed_revenue(receipt.inner.logs());
        if snapshot_id.is_none() {
            warn!(%tx_hash, "confirmed claim has no SnapshotCompleted log");
        }

        Ok(ClaimRevenueResponse {
            tx_hash,
            snapshot_id,
            amounts_claimed,
        })
    }
}
