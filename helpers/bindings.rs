//! Solidity bindings for the protocol contracts the workflow touches.

use alloy::sol;

use crate::terms::{IpMetadata, PilTerms};

sol! {
    struct PILTerms {
        bool transferable;
        address royaltyPolicy;
        uint256 defaultMintingFee;
        uint256 expiration;
        bool commercialUse;
        bool commercialAttribution;
        address commercializerChecker;
        bytes commercializerCheckerData;
        uint32 commercialRevShare;
        uint256 commercialRevCeiling;
        bool derivativesAllowed;
        bool derivativesAttribution;
        bool derivativesApproval;
        bool derivativesReciprocal;
        uint256 derivativeRevCeiling;
        address currency;
        string uri;
    }

    struct IPMetadata {
        string ipMetadataURI;
        bytes32 ipMetadataHash;
        string nftMetadataURI;
        bytes32 nftMetadataHash;
    }

    struct MakeDerivative {
        address[] parentIpIds;
        address licenseTemplate;
        uint256[] licenseTermsIds;
        bytes royaltyContext;
    }

    struct RoyaltyClaimDetails {
        address childIpId;
        address royaltyPolicy;
        address currencyToken;
        uint256 amount;
    }

    #[sol(rpc)]
    interface ILicenseAttachmentWorkflows {
        function mintAndRegisterIpAndAttachPILTerms(
            address spgNftContract,
            address recipient,
            IPMetadata calldata ipMetadata,
            PILTerms[] calldata terms
        ) external returns (address ipId, uint256 tokenId, uint256[] memory licenseTermsIds);
    }

    #[sol(rpc)]
    interface IDerivativeWorkflows {
        function mintAndRegisterIpAndMakeDerivative(
            address spgNftContract,
            MakeDerivative calldata derivData,
            IPMetadata calldata ipMetadata,
            address recipient
        ) external returns (address ipId, uint256 tokenId);
    }

    #[sol(rpc)]
    interface IRoyaltyModule {
        function payRoyaltyOnBehalf(
            address receiverIpId,
            address payerIpId,
            address token,
            uint256 amount
        ) external;
    }

    #[sol(rpc)]
    interface IRoyaltyWorkflows {
        function transferToVaultAndSnapshotAndClaimByTokenBatch(
            address ancestorIpId,
            address claimer,
            RoyaltyClaimDetails[] calldata royaltyClaimDetails
        ) external returns (uint256 snapshotId, uint256[] memory amountsClaimed);
    }

    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
    }

    interface IIPAssetRegistry {
        event IPRegistered(
            address ipId,
            uint256 indexed chainId,
            address indexed tokenContract,
            uint256 indexed tokenId,
            string name,
            string uri,
            uint256 registrationDate
        );
    }

    interface ILicensingModule {
        event LicenseTermsAttached(
            address indexed caller,
            address indexed ipId,
            address licenseTemplate,
            uint256 licenseTermsId
        );
    }

    interface IIpRoyaltyVault {
        event SnapshotCompleted(uint256 snapshotId, uint256 snapshotTimestamp);
        event RevenueTokenClaimed(address claimer, address token, uint256 amount);
    }

    interface IIpRoyaltyVaultV1 {
        event SnapshotCompleted(uint256 snapshotId, uint256 snapshotTimestamp, uint32 unclaimedTokens);
    }
}

impl From<&PilTerms> for PILTerms {
    fn from(terms: &PilTerms) -> Self {
        Self {
            transferable: terms.transferable,
            royaltyPolicy: terms.royalty_policy,
            defaultMintingFee: terms.default_minting_fee,
            expiration: terms.expiration,
            commercialUse: terms.commercial_use,
            commercialAttribution: terms.commercial_attribution,
            commercializerChecker: terms.commercializer_checker,
            commercializerCheckerData: terms.commercializer_checker_data.clone(),
            commercialRevShare: terms.commercial_rev_share,
            commercialRevCeiling: terms.commercial_rev_ceiling,
            derivativesAllowed: terms.derivatives_allowed,
            derivativesAttribution: terms.derivatives_attribution,
            derivativesApproval: terms.derivatives_approval,
            derivativesReciprocal: terms.derivatives_reciprocal,
            derivativeRevCeiling: terms.derivative_rev_ceiling,
            currency: terms.currency,
            uri: terms.uri.clone(),
        }
    }
}

impl From<&IpMetadata> for IPMetadata {
    fn from(metadata: &IpMetadata) -> Self {
        Self {
            ipMetadataURI: metadata.ip_metadata_uri.clone(),
            ipMetadataHash: metadata.ip_metadata_hash,
            nftMetadataURI: metadata.nft_metadata_uri.clone(),
            nftMetadataHash: metadata.nft_metadata_hash,
        }
    }
}
