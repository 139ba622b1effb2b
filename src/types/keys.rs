//! Account ids, muxed accounts, signer keys and signatures.
//!
//! All three key unions render as a single strkey in txrep rather than as
//! `type`/arm lines.

use crate::core::binary::{from_bytes, to_bytes};
use crate::core::marshal::{bad_arm, field, TextForm, VarOpaque, Visitor, XdrAggregate, XdrType, XdrValue};
use crate::encoding::strkey::{self, signature_hint, StrKey, StrKeyError, StrKeyVersion};
use crate::error::{Result, TxrepError};
use std::fmt;
use std::str::FromStr;

xdr_enum! {
    pub enum PublicKeyType {
        Ed25519 = 0 => "PUBLIC_KEY_TYPE_ED25519",
    }
}

xdr_enum! {
    pub enum CryptoKeyType {
        Ed25519 = 0 => "KEY_TYPE_ED25519",
        PreAuthTx = 1 => "KEY_TYPE_PRE_AUTH_TX",
        HashX = 2 => "KEY_TYPE_HASH_X",
        Ed25519SignedPayload = 3 => "KEY_TYPE_ED25519_SIGNED_PAYLOAD",
        MuxedEd25519 = 0x100 => "KEY_TYPE_MUXED_ED25519",
    }
}

xdr_enum! {
    pub enum SignerKeyType {
        Ed25519 = 0 => "SIGNER_KEY_TYPE_ED25519",
        PreAuthTx = 1 => "SIGNER_KEY_TYPE_PRE_AUTH_TX",
        HashX = 2 => "SIGNER_KEY_TYPE_HASH_X",
        Ed25519SignedPayload = 3 => "SIGNER_KEY_TYPE_ED25519_SIGNED_PAYLOAD",
    }
}

/// Implements `Display`/`FromStr` on top of a type's [`TextForm`].
macro_rules! text_form_traits {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.render().map_err(|_| fmt::Error)?)
            }
        }

        impl FromStr for $ty {
            type Err = TxrepError;

            fn from_str(s: &str) -> Result<Self> {
                let mut value = Self::default();
                value.parse(s)?;
                Ok(value)
            }
        }
    };
}

fn decode_token(text: &str) -> Result<StrKey> {
    Ok(strkey::decode(crate::txrep::first_token(text))?)
}

/// An ed25519 account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519([u8; 32]),
}

pub type AccountId = PublicKey;

impl Default for PublicKey {
    fn default() -> Self {
        PublicKey::Ed25519([0; 32])
    }
}

impl PublicKey {
    pub fn kind(&self) -> PublicKeyType {
        match self {
            PublicKey::Ed25519(_) => PublicKeyType::Ed25519,
        }
    }

    pub fn ed25519(&self) -> &[u8; 32] {
        match self {
            PublicKey::Ed25519(key) => key,
        }
    }

    pub fn hint(&self) -> [u8; 4] {
        signature_hint(self.ed25519(), &[])
    }
}

impl XdrAggregate for PublicKey {
    fn type_name(&self) -> &'static str {
        "PublicKey"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        match self {
            PublicKey::Ed25519(key) => field(v, name, "ed25519", key),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for PublicKey {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for PublicKey {
    fn render(&self) -> Result<String> {
        Ok(strkey::encode(StrKeyVersion::PublicKey, self.ed25519()))
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let key = decode_token(text)?;
        *self = PublicKey::Ed25519(key.key32(StrKeyVersion::PublicKey)?);
        Ok(())
    }
}

text_form_traits!(PublicKey);

xdr_struct! {
    pub struct MuxedAccountMed25519 {
        id: u64 => "id",
        ed25519: [u8; 32] => "ed25519",
    }
}

/// An account id with an optional 64-bit sub-account id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MuxedAccount {
    Ed25519([u8; 32]),
    MuxedEd25519(MuxedAccountMed25519),
}

impl Default for MuxedAccount {
    fn default() -> Self {
        MuxedAccount::Ed25519([0; 32])
    }
}

impl MuxedAccount {
    pub fn from_account(account: PublicKey, id: Option<u64>) -> Self {
        let ed25519 = *account.ed25519();
        match id {
            None => MuxedAccount::Ed25519(ed25519),
            Some(id) => MuxedAccount::MuxedEd25519(MuxedAccountMed25519 { id, ed25519 }),
        }
    }

    pub fn kind(&self) -> CryptoKeyType {
        match self {
            MuxedAccount::Ed25519(_) => CryptoKeyType::Ed25519,
            MuxedAccount::MuxedEd25519(_) => CryptoKeyType::MuxedEd25519,
        }
    }

    /// The underlying account, without any sub-account id.
    pub fn account_id(&self) -> PublicKey {
        match self {
            MuxedAccount::Ed25519(key) => PublicKey::Ed25519(*key),
            MuxedAccount::MuxedEd25519(m) => PublicKey::Ed25519(m.ed25519),
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            MuxedAccount::Ed25519(_) => None,
            MuxedAccount::MuxedEd25519(m) => Some(m.id),
        }
    }
}

impl XdrAggregate for MuxedAccount {
    fn type_name(&self) -> &'static str {
        "MuxedAccount"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = match kind {
                CryptoKeyType::Ed25519 => MuxedAccount::Ed25519([0; 32]),
                CryptoKeyType::MuxedEd25519 => MuxedAccount::MuxedEd25519(Default::default()),
                other => return Err(bad_arm(name, other)),
            };
        }
        match self {
            MuxedAccount::Ed25519(key) => field(v, name, "ed25519", key),
            MuxedAccount::MuxedEd25519(m) => field(v, name, "med25519", m),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for MuxedAccount {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for MuxedAccount {
    fn render(&self) -> Result<String> {
        Ok(match self {
            MuxedAccount::Ed25519(key) => strkey::encode(StrKeyVersion::PublicKey, key),
            MuxedAccount::MuxedEd25519(m) => {
                let mut payload = [0u8; 40];
                payload[..32].copy_from_slice(&m.ed25519);
                payload[32..].copy_from_slice(&m.id.to_be_bytes());
                strkey::encode(StrKeyVersion::Muxed, &payload)
            }
        })
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let key = decode_token(text)?;
        *self = match key.version {
            StrKeyVersion::PublicKey => MuxedAccount::Ed25519(key.key32(StrKeyVersion::PublicKey)?),
            StrKeyVersion::Muxed => {
                let (ed, id) = key.payload.split_at(32);
                let mut m = MuxedAccountMed25519::default();
                m.ed25519.copy_from_slice(ed);
                let mut id_bytes = [0u8; 8];
                id_bytes.copy_from_slice(id);
                m.id = u64::from_be_bytes(id_bytes);
                MuxedAccount::MuxedEd25519(m)
            }
            other => return Err(StrKeyError::WrongType(other).into()),
        };
        Ok(())
    }
}

text_form_traits!(MuxedAccount);

xdr_struct! {
    /// A key plus a payload it must sign alongside the transaction.
    pub struct Ed25519SignedPayload {
        ed25519: [u8; 32] => "ed25519",
        payload: VarOpaque<64> => "payload",
    }
}

/// Anything that can be added as an account signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignerKey {
    Ed25519([u8; 32]),
    PreAuthTx([u8; 32]),
    HashX([u8; 32]),
    Ed25519SignedPayload(Ed25519SignedPayload),
}

impl Default for SignerKey {
    fn default() -> Self {
        SignerKey::Ed25519([0; 32])
    }
}

impl SignerKey {
    pub fn kind(&self) -> SignerKeyType {
        match self {
            SignerKey::Ed25519(_) => SignerKeyType::Ed25519,
            SignerKey::PreAuthTx(_) => SignerKeyType::PreAuthTx,
            SignerKey::HashX(_) => SignerKeyType::HashX,
            SignerKey::Ed25519SignedPayload(_) => SignerKeyType::Ed25519SignedPayload,
        }
    }

    fn empty(kind: SignerKeyType) -> Self {
        match kind {
            SignerKeyType::Ed25519 => SignerKey::Ed25519([0; 32]),
            SignerKeyType::PreAuthTx => SignerKey::PreAuthTx([0; 32]),
            SignerKeyType::HashX => SignerKey::HashX([0; 32]),
            SignerKeyType::Ed25519SignedPayload => {
                SignerKey::Ed25519SignedPayload(Ed25519SignedPayload::default())
            }
        }
    }

    /// Signature hint for signatures made by this signer.
    pub fn hint(&self) -> [u8; 4] {
        match self {
            SignerKey::Ed25519(key) | SignerKey::PreAuthTx(key) | SignerKey::HashX(key) => {
                signature_hint(key, &[])
            }
            SignerKey::Ed25519SignedPayload(sp) => signature_hint(&sp.ed25519, &sp.payload),
        }
    }
}

impl XdrAggregate for SignerKey {
    fn type_name(&self) -> &'static str {
        "SignerKey"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = SignerKey::empty(kind);
        }
        match self {
            SignerKey::Ed25519(key) => field(v, name, "ed25519", key),
            SignerKey::PreAuthTx(key) => field(v, name, "preAuthTx", key),
            SignerKey::HashX(key) => field(v, name, "hashX", key),
            SignerKey::Ed25519SignedPayload(sp) => field(v, name, "ed25519SignedPayload", sp),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for SignerKey {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for SignerKey {
    fn render(&self) -> Result<String> {
        Ok(match self {
            SignerKey::Ed25519(key) => strkey::encode(StrKeyVersion::PublicKey, key),
            SignerKey::PreAuthTx(key) => strkey::encode(StrKeyVersion::PreAuthTx, key),
            SignerKey::HashX(key) => strkey::encode(StrKeyVersion::HashX, key),
            SignerKey::Ed25519SignedPayload(sp) => {
                let bytes = to_bytes(&mut sp.clone())?;
                strkey::encode(StrKeyVersion::SignedPayload, &bytes)
            }
        })
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let key = decode_token(text)?;
        *self = match key.version {
            StrKeyVersion::PublicKey => SignerKey::Ed25519(key.key32(key.version)?),
            StrKeyVersion::PreAuthTx => SignerKey::PreAuthTx(key.key32(key.version)?),
            StrKeyVersion::HashX => SignerKey::HashX(key.key32(key.version)?),
            // the payload is itself binary XDR and must decode cleanly
            StrKeyVersion::SignedPayload => SignerKey::Ed25519SignedPayload(from_bytes(&key.payload)?),
            other => return Err(StrKeyError::WrongType(other).into()),
        };
        Ok(())
    }
}

text_form_traits!(SignerKey);

xdr_struct! {
    pub struct DecoratedSignature {
        hint: [u8; 4] => "hint",
        signature: VarOpaque<64> => "signature",
    }
}

xdr_struct! {
    pub struct Signer {
        key: SignerKey => "key",
        weight: u32 => "weight",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::txrep::{from_txrep, to_txrep};

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
    const MUXED: &str =
        "MA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJUAAAAAAAAAAAACJUQ";

    #[test]
    fn test_public_key_text() {
        let key: PublicKey = ACCOUNT.parse().unwrap();
        assert_eq!(key.to_string(), ACCOUNT);
        assert_eq!(&key.hint(), &key.ed25519()[28..]);
    }

    #[test]
    fn test_public_key_rejects_other_versions() {
        let err = MUXED.parse::<PublicKey>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEncoding);
    }

    #[test]
    fn test_muxed_text() {
        let plain: MuxedAccount = ACCOUNT.parse().unwrap();
        assert_eq!(plain.id(), None);
        let muxed: MuxedAccount = MUXED.parse().unwrap();
        assert_eq!(muxed.id(), Some(0));
        assert_eq!(muxed.account_id(), plain.account_id());
        assert_eq!(muxed.to_string(), MUXED);
    }

    #[test]
    fn test_muxed_binary_arm() {
        let mut muxed = MuxedAccount::from_account(ACCOUNT.parse().unwrap(), Some(5));
        let bytes = to_bytes(&mut muxed).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 1, 0]);
        assert_eq!(&bytes[4..12], &5u64.to_be_bytes());
        assert_eq!(from_bytes::<MuxedAccount>(&bytes).unwrap(), muxed);
    }

    #[test]
    fn test_muxed_rejects_undeclared_arm() {
        // KEY_TYPE_HASH_X is a CryptoKeyType but not a MuxedAccount arm
        let mut bytes = vec![0, 0, 0, 2];
        bytes.extend_from_slice(&[0; 32]);
        let err = from_bytes::<MuxedAccount>(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscriminant);
        assert!(err.to_string().starts_with("type:"));
    }

    #[test]
    fn test_signer_key_variants() {
        for key in [
            SignerKey::Ed25519([1; 32]),
            SignerKey::PreAuthTx([2; 32]),
            SignerKey::HashX([3; 32]),
            SignerKey::Ed25519SignedPayload(Ed25519SignedPayload {
                ed25519: [4; 32],
                payload: vec![9; 20].into(),
            }),
        ] {
            let text = key.to_string();
            assert_eq!(text.parse::<SignerKey>().unwrap(), key, "{text}");
        }
    }

    #[test]
    fn test_signed_payload_prefix_and_hint() {
        let key = SignerKey::Ed25519SignedPayload(Ed25519SignedPayload {
            ed25519: [0; 32],
            payload: vec![1, 2, 3, 4, 5].into(),
        });
        assert!(key.to_string().starts_with('P'));
        assert_eq!(key.hint(), [2, 3, 4, 5]);
    }

    #[test]
    fn test_signed_payload_bound() {
        let key = SignerKey::Ed25519SignedPayload(Ed25519SignedPayload {
            ed25519: [0; 32],
            payload: vec![0; 65].into(),
        });
        assert_eq!(key.render().unwrap_err().kind(), ErrorKind::BoundViolation);
    }

    #[test]
    fn test_keys_print_as_single_line() {
        let mut signer = Signer {
            key: SignerKey::HashX([7; 32]),
            weight: 1,
        };
        let text = to_txrep(&mut signer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("key: X"));
        assert_eq!(lines[1], "weight: 1");

        let back = from_txrep::<Signer>(&text).unwrap();
        assert_eq!(back.value, signer);
        assert!(back.unknown_keys.is_empty());
    }

    #[test]
    fn test_bad_strkey_in_txrep_names_field() {
        let err = from_txrep::<Signer>("key: GBAD\nweight: 1\n").unwrap_err();
        assert!(matches!(err, TxrepError::StrKey { ref field, .. } if field == "key"));
    }
}
