//! License terms and IP metadata builders.

use alloy::primitives::{Address, Bytes, B256, U256};

use crate::error::ClientError;

/// On-chain scale of `commercialRevShare`: 100% is `100 * 10^6`.
const REV_SHARE_SCALE: u32 = 1_000_000;

/// Programmable IP License terms, field for field as the license template
/// stores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilTerms {
    pub transferable: bool,
    pub royalty_policy: Address,
    pub default_minting_fee: U256,
    pub expiration: U256,
    pub commercial_use: bool,
    pub commercial_attribution: bool,
    pub commercializer_checker: Address,
    pub commercializer_checker_data: Bytes,
    /// Scaled share, see [`scale_rev_share`].
    pub commercial_rev_share: u32,
    pub commercial_rev_ceiling: U256,
    pub derivatives_allowed: bool,
    pub derivatives_attribution: bool,
    pub derivatives_approval: bool,
    pub derivatives_reciprocal: bool,
    pub derivative_rev_ceiling: U256,
    pub currency: Address,
    pub uri: String,
}

/// Inputs for [`commercial_remix_terms`].
#[derive(Debug, Clone)]
pub struct CommercialRemixParams {
    /// Percentage in `0..=100`.
    pub commercial_rev_share: u32,
    pub default_minting_fee: U256,
    pub royalty_policy: Address,
    pub currency: Address,
}

/// Commercial remix flavour of the PIL: commercial use and derivatives are
/// allowed, attribution is required and derivatives must carry the same terms.
pub fn commercial_remix_terms(params: CommercialRemixParams) -> Result<PilTerms, ClientError> {
    Ok(PilTerms {
        transferable: true,
        royalty_policy: params.royalty_policy,
        default_minting_fee: params.default_minting_fee,
        expiration: U256::ZERO,
        commercial_use: true,
        commercial_attribution: true,
        commercializer_checker: Address::ZERO,
        commercializer_checker_data: Bytes::new(),
        commercial_rev_share: scale_rev_share(params.commercial_rev_share)?,
        commercial_rev_ceiling: U256::ZERO,
        derivatives_allowed: true,
        derivatives_attribution: true,
        derivatives_approval: false,
        derivatives_reciprocal: true,
        derivative_rev_ceiling: U256::ZERO,
        currency: params.currency,
        uri: String::new(),
    })
}

/// Converts a percentage into the license template's fixed-point share.
pub fn scale_rev_share(percent: u32) -> Result<u32, ClientError> {
    if percent > 100 {
        return Err(ClientError::InvalidInput(format!(
            "commercial revenue share must be between 0 and 100, got {percent}"
        )));
    }
    Ok(percent * REV_SHARE_SCALE)
}

/// Metadata attached to a freshly minted IP asset and its NFT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpMetadata {
    pub ip_metadata_uri: String,
    pub ip_metadata_hash: B256,
    pub nft_metadata_uri: String,
    pub nft_metadata_hash: B256,
}

impl IpMetadata {
    /// Placeholder metadata: plain URIs and labels padded into hashes.
    /// Good enough for a testnet run, not for real assets.
    pub fn placeholder() -> Result<Self, ClientError> {
        Ok(Self {
            ip_metadata_uri: "test-uri".to_string(),
            ip_metadata_hash: padded_hash("test-metadata-hash")?,
            nft_metadata_uri: "test-nft-uri".to_string(),
            nft_metadata_hash: padded_hash("test-nft-metadata-hash")?,
        })
    }
}

/// Right-pads the UTF-8 bytes of `label` with zeros into a 32-byte word.
pub fn padded_hash(label: &str) -> Result<B256, ClientError> {
    let bytes = label.as_bytes();
    if bytes.len() > B256::len_bytes() {
        return Err(ClientError::InvalidInput(format!(
            "'{label}' is {} bytes, does not fit in 32",
            bytes.len()
        )));
    }
    let mut word = B256::ZERO;
    word[..bytes.len()].copy_from_slice(bytes);
    Ok(word)
}
