//! # Transaction Types
//!
//! Stellar transaction structures, each describing itself through the marshal
//! protocol so that every codec works on them unchanged.
//!
//! ## Components
//! - **Keys**: account ids, muxed accounts, signer keys, signatures
//! - **Assets**: native and issued assets, trust line assets, asset codes
//! - **Transaction**: memo, time bounds, operations, envelope

pub mod asset;
pub mod keys;
pub mod transaction;

pub use asset::{AlphaNum12, AlphaNum4, Asset, AssetCode, AssetType, TrustLineAsset};
pub use keys::{
    AccountId, CryptoKeyType, DecoratedSignature, Ed25519SignedPayload, MuxedAccount,
    MuxedAccountMed25519, PublicKey, PublicKeyType, Signer, SignerKey, SignerKeyType,
};
pub use transaction::{
    AllowTrustOp, BumpSequenceOp, ChangeTrustOp, CreateAccountOp, ExtensionPoint, ManageDataOp,
    Memo, MemoType, Operation, OperationBody, OperationType, PaymentOp, SetOptionsOp, TimeBounds,
    Transaction, TransactionEnvelope, MAX_OPS_PER_TX, MAX_SIGNATURES,
};
