//! # Transactions
//!
//! The transaction envelope and everything it contains: memo, time bounds,
//! operations and signatures.
//!
//! ## Operations
//! A representative set of classic operations is supported. The remaining
//! operation types are declared so that their discriminants are recognised,
//! but decoding one fails with an invalid-discriminant error at `body.type`.
//!
//! ## Conveniences
//! [`TransactionEnvelope`] wraps the generic codecs for the common case:
//! base64 in and out, txrep in and out, and [`Transaction::apply_network_defaults`]
//! for filling in fee and sequence number before signing.

use crate::config::{ScanConfig, TxrepConfig};
use crate::core::marshal::{bad_arm, field, join, VarOpaque, VecM, Visitor, XdrAggregate, XdrString, XdrType, XdrValue};
use crate::core::serialization::{from_base64, to_base64};
use crate::core::walk::{self, Walk};
use crate::error::{Result, TxrepError};
use crate::txrep::{self, Annotate, HelpSet, ScanOutcome};
use crate::types::asset::{Asset, AssetCode};
use crate::types::keys::{AccountId, DecoratedSignature, MuxedAccount, PublicKey, Signer};
use tracing::debug;

/// Maximum operations in one transaction.
pub const MAX_OPS_PER_TX: u32 = 100;

/// Maximum signatures on one envelope.
pub const MAX_SIGNATURES: u32 = 20;

xdr_enum! {
    pub enum MemoType {
        None = 0 => "MEMO_NONE",
        Text = 1 => "MEMO_TEXT",
        Id = 2 => "MEMO_ID",
        Hash = 3 => "MEMO_HASH",
        Return = 4 => "MEMO_RETURN",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Memo {
    #[default]
    None,
    Text(XdrString<28>),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    pub fn kind(&self) -> MemoType {
        match self {
            Memo::None => MemoType::None,
            Memo::Text(_) => MemoType::Text,
            Memo::Id(_) => MemoType::Id,
            Memo::Hash(_) => MemoType::Hash,
            Memo::Return(_) => MemoType::Return,
        }
    }

    fn empty(kind: MemoType) -> Self {
        match kind {
            MemoType::None => Memo::None,
            MemoType::Text => Memo::Text(XdrString::default()),
            MemoType::Id => Memo::Id(0),
            MemoType::Hash => Memo::Hash([0; 32]),
            MemoType::Return => Memo::Return([0; 32]),
        }
    }
}

impl XdrAggregate for Memo {
    fn type_name(&self) -> &'static str {
        "Memo"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = Memo::empty(kind);
        }
        match self {
            Memo::None => Ok(()),
            Memo::Text(text) => field(v, name, "text", text),
            Memo::Id(id) => field(v, name, "id", id),
            Memo::Hash(hash) => field(v, name, "hash", hash),
            Memo::Return(hash) => field(v, name, "retHash", hash),
        }
    }
}

impl XdrType for Memo {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

xdr_struct! {
    pub struct TimeBounds {
        min_time: u64 => "minTime",
        /// 0 means no upper bound
        max_time: u64 => "maxTime",
    }
}

/// Reserved extension slot. Only version 0 exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExtensionPoint {
    pub v: i32,
}

impl XdrAggregate for ExtensionPoint {
    fn type_name(&self) -> &'static str {
        "ExtensionPoint"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        field(v, name, "v", &mut self.v)?;
        if self.v != 0 {
            return Err(TxrepError::discriminant(&join(name, "v"), self.v));
        }
        Ok(())
    }
}

impl XdrType for ExtensionPoint {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

xdr_enum! {
    pub enum OperationType {
        CreateAccount = 0 => "CREATE_ACCOUNT",
        Payment = 1 => "PAYMENT",
        PathPaymentStrictReceive = 2 => "PATH_PAYMENT_STRICT_RECEIVE",
        ManageSellOffer = 3 => "MANAGE_SELL_OFFER",
        CreatePassiveSellOffer = 4 => "CREATE_PASSIVE_SELL_OFFER",
        SetOptions = 5 => "SET_OPTIONS",
        ChangeTrust = 6 => "CHANGE_TRUST",
        AllowTrust = 7 => "ALLOW_TRUST",
        AccountMerge = 8 => "ACCOUNT_MERGE",
        Inflation = 9 => "INFLATION",
        ManageData = 10 => "MANAGE_DATA",
        BumpSequence = 11 => "BUMP_SEQUENCE",
    }
}

xdr_struct! {
    pub struct CreateAccountOp {
        destination: AccountId => "destination",
        starting_balance: i64 => "startingBalance",
    }
}

xdr_struct! {
    pub struct PaymentOp {
        destination: MuxedAccount => "destination",
        asset: Asset => "asset",
        amount: i64 => "amount",
    }
}

xdr_struct! {
    pub struct SetOptionsOp {
        inflation_dest: Option<AccountId> => "inflationDest",
        clear_flags: Option<u32> => "clearFlags",
        set_flags: Option<u32> => "setFlags",
        master_weight: Option<u32> => "masterWeight",
        low_threshold: Option<u32> => "lowThreshold",
        med_threshold: Option<u32> => "medThreshold",
        high_threshold: Option<u32> => "highThreshold",
        home_domain: Option<XdrString<32>> => "homeDomain",
        /// Weight 0 removes the signer
        signer: Option<Signer> => "signer",
    }
}

xdr_struct! {
    pub struct ChangeTrustOp {
        line: Asset => "line",
        /// 0 removes the trust line
        limit: i64 => "limit",
    }
}

xdr_struct! {
    pub struct AllowTrustOp {
        trustor: AccountId => "trustor",
        asset: AssetCode => "asset",
        authorize: u32 => "authorize",
    }
}

xdr_struct! {
    pub struct ManageDataOp {
        data_name: XdrString<64> => "dataName",
        /// Absent deletes the entry
        data_value: Option<VarOpaque<64>> => "dataValue",
    }
}

xdr_struct! {
    pub struct BumpSequenceOp {
        bump_to: i64 => "bumpTo",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationBody {
    CreateAccount(CreateAccountOp),
    Payment(PaymentOp),
    SetOptions(SetOptionsOp),
    ChangeTrust(ChangeTrustOp),
    AllowTrust(AllowTrustOp),
    AccountMerge(MuxedAccount),
    Inflation,
    ManageData(ManageDataOp),
    BumpSequence(BumpSequenceOp),
}

impl Default for OperationBody {
    fn default() -> Self {
        OperationBody::CreateAccount(CreateAccountOp::default())
    }
}

impl OperationBody {
    pub fn kind(&self) -> OperationType {
        match self {
            OperationBody::CreateAccount(_) => OperationType::CreateAccount,
            OperationBody::Payment(_) => OperationType::Payment,
            OperationBody::SetOptions(_) => OperationType::SetOptions,
            OperationBody::ChangeTrust(_) => OperationType::ChangeTrust,
            OperationBody::AllowTrust(_) => OperationType::AllowTrust,
            OperationBody::AccountMerge(_) => OperationType::AccountMerge,
            OperationBody::Inflation => OperationType::Inflation,
            OperationBody::ManageData(_) => OperationType::ManageData,
            OperationBody::BumpSequence(_) => OperationType::BumpSequence,
        }
    }

    fn empty(kind: OperationType) -> Option<Self> {
        Some(match kind {
            OperationType::CreateAccount => OperationBody::CreateAccount(Default::default()),
            OperationType::Payment => OperationBody::Payment(Default::default()),
            OperationType::SetOptions => OperationBody::SetOptions(Default::default()),
            OperationType::ChangeTrust => OperationBody::ChangeTrust(Default::default()),
            OperationType::AllowTrust => OperationBody::AllowTrust(Default::default()),
            OperationType::AccountMerge => OperationBody::AccountMerge(Default::default()),
            OperationType::Inflation => OperationBody::Inflation,
            OperationType::ManageData => OperationBody::ManageData(Default::default()),
            OperationType::BumpSequence => OperationBody::BumpSequence(Default::default()),
            OperationType::PathPaymentStrictReceive
            | OperationType::ManageSellOffer
            | OperationType::CreatePassiveSellOffer => return None,
        })
    }
}

impl XdrAggregate for OperationBody {
    fn type_name(&self) -> &'static str {
        "OperationBody"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = OperationBody::empty(kind).ok_or_else(|| bad_arm(name, kind))?;
        }
        match self {
            OperationBody::CreateAccount(op) => field(v, name, "createAccountOp", op),
            OperationBody::Payment(op) => field(v, name, "paymentOp", op),
            OperationBody::SetOptions(op) => field(v, name, "setOptionsOp", op),
            OperationBody::ChangeTrust(op) => field(v, name, "changeTrustOp", op),
            OperationBody::AllowTrust(op) => field(v, name, "allowTrustOp", op),
            OperationBody::AccountMerge(dest) => field(v, name, "destination", dest),
            OperationBody::Inflation => Ok(()),
            OperationBody::ManageData(op) => field(v, name, "manageDataOp", op),
            OperationBody::BumpSequence(op) => field(v, name, "bumpSequenceOp", op),
        }
    }
}

impl XdrType for OperationBody {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

xdr_struct! {
    pub struct Operation {
        /// Defaults to the transaction source when absent
        source_account: Option<MuxedAccount> => "sourceAccount",
        body: OperationBody => "body",
    }
}

impl Operation {
    pub fn new(body: OperationBody) -> Self {
        Self {
            source_account: None,
            body,
        }
    }

    pub fn create_account(destination: AccountId, starting_balance: i64) -> Self {
        Self::new(OperationBody::CreateAccount(CreateAccountOp {
            destination,
            starting_balance,
        }))
    }

    pub fn payment(destination: MuxedAccount, asset: Asset, amount: i64) -> Self {
        Self::new(OperationBody::Payment(PaymentOp {
            destination,
            asset,
            amount,
        }))
    }
}

xdr_struct! {
    pub struct Transaction {
        source_account: MuxedAccount => "sourceAccount",
        fee: u32 => "fee",
        seq_num: i64 => "seqNum",
        time_bounds: Option<TimeBounds> => "timeBounds",
        memo: Memo => "memo",
        operations: VecM<Operation, MAX_OPS_PER_TX> => "operations",
        ext: ExtensionPoint => "ext",
    }
}

impl Transaction {
    /// Raise the fee to at least `base_fee` per operation and the sequence
    /// number to at least `next_seq`. Values already higher are kept.
    pub fn apply_network_defaults(&mut self, base_fee: u32, next_seq: i64) {
        let ops = u32::try_from(self.operations.0.len()).unwrap_or(u32::MAX);
        let min_fee = ops.saturating_mul(base_fee);
        if self.fee < min_fee {
            debug!(old = self.fee, new = min_fee, "raising transaction fee");
            self.fee = min_fee;
        }
        if self.seq_num < next_seq {
            debug!(old = self.seq_num, new = next_seq, "raising sequence number");
            self.seq_num = next_seq;
        }
    }
}

xdr_struct! {
    pub struct TransactionEnvelope {
        tx: Transaction => "tx",
        signatures: VecM<DecoratedSignature, MAX_SIGNATURES> => "signatures",
    }
}

impl TransactionEnvelope {
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: VecM::default(),
        }
    }

    pub fn to_base64(&self) -> Result<String> {
        to_base64(&mut self.clone())
    }

    pub fn from_base64(input: &str) -> Result<Self> {
        from_base64(input)
    }

    pub fn to_txrep(&self) -> Result<String> {
        txrep::to_txrep(&mut self.clone())
    }

    pub fn to_txrep_annotated(&self, annotator: &dyn Annotate) -> Result<String> {
        txrep::to_txrep_annotated(&mut self.clone(), annotator)
    }

    /// Print under `config`, listing choices for the fields in `help`
    /// (usually [`ScanOutcome::help`] from an earlier scan).
    pub fn to_txrep_configured(&self, config: &TxrepConfig, help: Option<&HelpSet>) -> Result<String> {
        txrep::to_txrep_configured(&mut self.clone(), config, help)
    }

    /// Scan txrep, warning about (and dropping) unrecognised lines.
    pub fn from_txrep(text: &str) -> Result<Self> {
        Ok(txrep::from_txrep(text)?.value)
    }

    pub fn from_txrep_with(text: &str, config: &ScanConfig) -> Result<ScanOutcome<Self>> {
        txrep::from_txrep_with(text, config)
    }

    /// Every account id mentioned anywhere in the envelope, in traversal
    /// order, muxed accounts reduced to their underlying account.
    pub fn accounts(&self) -> Result<Vec<PublicKey>> {
        let mut accounts = Vec::new();
        walk::for_each(&mut self.clone(), |_, value| {
            if let Some(key) = value.downcast_ref::<PublicKey>() {
                accounts.push(key.clone());
                return Walk::Prune;
            }
            if let Some(muxed) = value.downcast_ref::<MuxedAccount>() {
                accounts.push(muxed.account_id());
                return Walk::Prune;
            }
            Walk::Descend
        })?;
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binary::{from_bytes, to_bytes};
    use crate::error::ErrorKind;

    #[test]
    fn test_default_envelope_txrep() {
        let text = TransactionEnvelope::default().to_txrep().unwrap();
        let keys: Vec<&str> = text.lines().map(|l| l.split(':').next().unwrap()).collect();
        assert_eq!(
            keys,
            [
                "tx.sourceAccount",
                "tx.fee",
                "tx.seqNum",
                "tx.timeBounds.present",
                "tx.memo.type",
                "tx.operations.len",
                "tx.ext.v",
                "signatures.len",
            ]
        );
    }

    #[test]
    fn test_memo_arm_switch() {
        let mut memo = Memo::Id(5);
        let bytes = to_bytes(&mut Memo::Text("hi".into())).unwrap();
        let mut reader = crate::core::binary::Reader::new(bytes.as_ref());
        reader.visit("", memo.as_value()).unwrap();
        assert_eq!(memo, Memo::Text("hi".into()));
    }

    #[test]
    fn test_extension_point_rejects_nonzero() {
        let err = from_bytes::<ExtensionPoint>(&[0, 0, 0, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);
        assert!(err.to_string().starts_with("v:"));
    }

    #[test]
    fn test_unsupported_operation() {
        // MANAGE_SELL_OFFER is declared but has no arm here
        let err = from_bytes::<OperationBody>(&[0, 0, 0, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);

        let err = from_bytes::<OperationBody>(&[0, 0, 0, 99]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);
    }

    #[test]
    fn test_apply_network_defaults() {
        let mut tx = Transaction::default();
        tx.operations.push(Operation::new(OperationBody::Inflation));
        tx.operations.push(Operation::new(OperationBody::Inflation));
        tx.apply_network_defaults(100, 7);
        assert_eq!(tx.fee, 200);
        assert_eq!(tx.seq_num, 7);

        tx.fee = 1000;
        tx.seq_num = 50;
        tx.apply_network_defaults(100, 7);
        assert_eq!(tx.fee, 1000);
        assert_eq!(tx.seq_num, 50);
    }

    #[test]
    fn test_accounts() {
        let a = PublicKey::Ed25519([1; 32]);
        let b = PublicKey::Ed25519([2; 32]);
        let mut tx = Transaction {
            source_account: MuxedAccount::from_account(a.clone(), Some(3)),
            ..Transaction::default()
        };
        tx.operations.push(Operation::create_account(b.clone(), 1));
        let env = TransactionEnvelope::new(tx);
        assert_eq!(env.accounts().unwrap(), vec![a, b]);
    }

    #[test]
    fn test_too_many_operations() {
        let mut env = TransactionEnvelope::default();
        for _ in 0..=MAX_OPS_PER_TX {
            env.tx.operations.push(Operation::new(OperationBody::Inflation));
        }
        assert_eq!(env.to_base64().unwrap_err().kind(), ErrorKind::BoundViolation);
        assert_eq!(env.to_txrep().unwrap_err().kind(), ErrorKind::BoundViolation);
    }
}
