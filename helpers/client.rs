//! The protocol surface the workflow depends on.
//!
//! [`IpAssetClient`] is the only seam between the workflow and the chain. The
//! production implementation is [`crate::story::StoryClient`]; tests use an
//! in-memory mock.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::ClientError;
use crate::terms::{IpMetadata, PilTerms};

/// Per-transaction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    /// Block until the transaction is included and its receipt decoded.
    pub wait_for_transaction: bool,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            wait_for_transaction: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRootRequest {
    pub spg_nft_contract: Address,
    pub terms: Vec<PilTerms>,
    pub metadata: IpMetadata,
    /// Receiver of the minted NFT; `None` means the signer.
    pub recipient: Option<Address>,
    pub tx: TxOptions,
}

/// Result of minting and registering an IP with attached terms.
///
/// Only `tx_hash` is guaranteed; the rest is decoded from the receipt and is
/// absent when the caller did not wait for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRootResponse {
    pub tx_hash: TxHash,
    pub ip_id: Option<Address>,
    pub token_id: Option<U256>,
    pub license_terms_ids: Vec<U256>,
}

/// Parent linkage for a derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivativeData {
    pub parent_ip_ids: Vec<Address>,
    pub license_terms_ids: Vec<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDerivativeRequest {
    pub spg_nft_contract: Address,
    pub deriv_data: DerivativeData,
    pub metadata: IpMetadata,
    pub recipient: Option<Address>,
    pub tx: TxOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDerivativeResponse {
    pub tx_hash: TxHash,
    pub child_ip_id: Option<Address>,
    pub token_id: Option<U256>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayRoyaltyRequest {
    pub receiver_ip_id: Address,
    /// `Address::ZERO` for a payer that is not an IP asset.
    pub payer_ip_id: Address,
    pub token: Address,
    pub amount: U256,
    pub tx: TxOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayRoyaltyResponse {
    pub tx_hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoyaltyClaimDetail {
    pub child_ip_id: Address,
    pub royalty_policy: Address,
    pub currency_token: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRevenueRequest {
    pub ancestor_ip_id: Address,
    pub claimer: Address,
    pub royalty_claim_details: Vec<RoyaltyClaimDetail>,
    pub tx: TxOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRevenueResponse {
    pub tx_hash: TxHash,
    pub snapshot_id: Option<U256>,
    pub amounts_claimed: Vec<U256>,
}

/// IP asset and royalty operations of the protocol.
///
/// All four operations mutate chain state and are not safe to retry blindly:
/// a second `mint_and_register_*` call mints a second asset.
#[async_trait]
pub trait IpAssetClient: Send + Sync {
    /// Mints an NFT from an SPG collection, registers it as an IP asset and
    /// attaches the given license terms.
    async fn mint_and_register_ip_with_terms(
        &self,
        request: RegisterRootRequest,
    ) -> Result<RegisterRootResponse, ClientError>;

    /// Mints an NFT, registers it as an IP asset and links it as a derivative
    /// of the parents under the given license terms.
    async fn mint_and_register_derivative(
        &self,
        request: RegisterDerivativeRequest,
    ) -> Result<RegisterDerivativeResponse, ClientError>;

    /// Pays `amount` of `token` into the receiver's royalty account.
    async fn pay_royalty_on_behalf(
        &self,
        request: PayRoyaltyRequest,
    ) -> Result<PayRoyaltyResponse, ClientError>;

    /// Moves royalties from children into the ancestor's vault, snapshots the
    /// vault and claims the revenue for `claimer`.
    async fn claim_revenue(
        &self,
        request: ClaimRevenueRequest,
    ) -> Result<ClaimRevenueResponse, ClientError>;
}
