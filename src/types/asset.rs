//! Assets, trust line assets and bare asset codes.
//!
//! Text forms:
//! - `native`
//! - `CODE:ISSUER`, e.g. `USD:GA7QYNF7...`; the code uses the escaped asset code
//!   text, and the split is on the last `:` since escaped codes never contain one
//! - `HEXPOOLID:lp` for liquidity pool shares, trust line assets only

use crate::core::marshal::{bad_arm, field, TextForm, Visitor, XdrAggregate, XdrType, XdrValue};
use crate::encoding::asset_code::{parse_asset_code, render_asset_code};
use crate::error::{constants, Result, TxrepError};
use crate::txrep::first_token;
use crate::types::keys::{AccountId, PublicKey};
use std::fmt;
use std::str::FromStr;

xdr_enum! {
    pub enum AssetType {
        Native = 0 => "ASSET_TYPE_NATIVE",
        CreditAlphanum4 = 1 => "ASSET_TYPE_CREDIT_ALPHANUM4",
        CreditAlphanum12 = 2 => "ASSET_TYPE_CREDIT_ALPHANUM12",
        PoolShare = 3 => "ASSET_TYPE_POOL_SHARE",
    }
}

xdr_struct! {
    pub struct AlphaNum4 {
        asset_code: [u8; 4] => "assetCode",
        issuer: AccountId => "issuer",
    }
}

xdr_struct! {
    pub struct AlphaNum12 {
        asset_code: [u8; 12] => "assetCode",
        issuer: AccountId => "issuer",
    }
}

/// Result of parsing asset text, before it is narrowed to a concrete union.
enum AssetText {
    Native,
    Credit(Vec<u8>, PublicKey),
    Pool([u8; 32]),
}

fn parse_asset_text(text: &str) -> Result<AssetText> {
    let token = first_token(text);
    if token == "native" {
        return Ok(AssetText::Native);
    }
    let (code, issuer) = token
        .rsplit_once(':')
        .ok_or_else(|| TxrepError::malformed("", constants::ERR_ASSET_FORMAT))?;
    if issuer == "lp" {
        let mut id = [0u8; 32];
        hex::decode_to_slice(code, &mut id)
            .map_err(|_| TxrepError::malformed("", constants::ERR_BAD_HEX))?;
        return Ok(AssetText::Pool(id));
    }
    let issuer: PublicKey = issuer.parse()?;
    Ok(AssetText::Credit(parse_asset_code(code)?, issuer))
}

fn credit_text(code: &[u8], issuer: &PublicKey) -> Result<String> {
    Ok(format!("{}:{}", render_asset_code(code), issuer.render()?))
}

fn alphanum4(code: &[u8], issuer: PublicKey) -> AlphaNum4 {
    let mut asset_code = [0u8; 4];
    asset_code.copy_from_slice(code);
    AlphaNum4 { asset_code, issuer }
}

fn alphanum12(code: &[u8], issuer: PublicKey) -> AlphaNum12 {
    let mut asset_code = [0u8; 12];
    asset_code.copy_from_slice(code);
    AlphaNum12 { asset_code, issuer }
}

/// Native lumens or an issued credit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Asset {
    #[default]
    Native,
    CreditAlphanum4(AlphaNum4),
    CreditAlphanum12(AlphaNum12),
}

impl Asset {
    /// Issued asset; the code width follows from its length.
    pub fn credit(code: &str, issuer: PublicKey) -> Result<Self> {
        let code = parse_asset_code(code)?;
        Ok(if code.len() == 4 {
            Asset::CreditAlphanum4(alphanum4(&code, issuer))
        } else {
            Asset::CreditAlphanum12(alphanum12(&code, issuer))
        })
    }

    pub fn kind(&self) -> AssetType {
        match self {
            Asset::Native => AssetType::Native,
            Asset::CreditAlphanum4(_) => AssetType::CreditAlphanum4,
            Asset::CreditAlphanum12(_) => AssetType::CreditAlphanum12,
        }
    }

    pub fn issuer(&self) -> Option<&PublicKey> {
        match self {
            Asset::Native => None,
            Asset::CreditAlphanum4(a) => Some(&a.issuer),
            Asset::CreditAlphanum12(a) => Some(&a.issuer),
        }
    }
}

impl XdrAggregate for Asset {
    fn type_name(&self) -> &'static str {
        "Asset"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = match kind {
                AssetType::Native => Asset::Native,
                AssetType::CreditAlphanum4 => Asset::CreditAlphanum4(AlphaNum4::default()),
                AssetType::CreditAlphanum12 => Asset::CreditAlphanum12(AlphaNum12::default()),
                other => return Err(bad_arm(name, other)),
            };
        }
        match self {
            Asset::Native => Ok(()),
            Asset::CreditAlphanum4(a) => field(v, name, "alphaNum4", a),
            Asset::CreditAlphanum12(a) => field(v, name, "alphaNum12", a),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for Asset {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for Asset {
    fn render(&self) -> Result<String> {
        match self {
            Asset::Native => Ok("native".to_string()),
            Asset::CreditAlphanum4(a) => credit_text(&a.asset_code, &a.issuer),
            Asset::CreditAlphanum12(a) => credit_text(&a.asset_code, &a.issuer),
        }
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        *self = match parse_asset_text(text)? {
            AssetText::Native => Asset::Native,
            AssetText::Credit(code, issuer) if code.len() == 4 => {
                Asset::CreditAlphanum4(alphanum4(&code, issuer))
            }
            AssetText::Credit(code, issuer) => Asset::CreditAlphanum12(alphanum12(&code, issuer)),
            AssetText::Pool(_) => {
                return Err(TxrepError::malformed("", constants::ERR_UNEXPECTED_POOL))
            }
        };
        Ok(())
    }
}

/// The asset of a trust line: like [`Asset`], plus liquidity pool shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TrustLineAsset {
    #[default]
    Native,
    CreditAlphanum4(AlphaNum4),
    CreditAlphanum12(AlphaNum12),
    PoolShare([u8; 32]),
}

impl TrustLineAsset {
    pub fn kind(&self) -> AssetType {
        match self {
            TrustLineAsset::Native => AssetType::Native,
            TrustLineAsset::CreditAlphanum4(_) => AssetType::CreditAlphanum4,
            TrustLineAsset::CreditAlphanum12(_) => AssetType::CreditAlphanum12,
            TrustLineAsset::PoolShare(_) => AssetType::PoolShare,
        }
    }
}

impl From<Asset> for TrustLineAsset {
    fn from(asset: Asset) -> Self {
        match asset {
            Asset::Native => TrustLineAsset::Native,
            Asset::CreditAlphanum4(a) => TrustLineAsset::CreditAlphanum4(a),
            Asset::CreditAlphanum12(a) => TrustLineAsset::CreditAlphanum12(a),
        }
    }
}

impl XdrAggregate for TrustLineAsset {
    fn type_name(&self) -> &'static str {
        "TrustLineAsset"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = match kind {
                AssetType::Native => TrustLineAsset::Native,
                AssetType::CreditAlphanum4 => TrustLineAsset::CreditAlphanum4(AlphaNum4::default()),
                AssetType::CreditAlphanum12 => {
                    TrustLineAsset::CreditAlphanum12(AlphaNum12::default())
                }
                AssetType::PoolShare => TrustLineAsset::PoolShare([0; 32]),
            };
        }
        match self {
            TrustLineAsset::Native => Ok(()),
            TrustLineAsset::CreditAlphanum4(a) => field(v, name, "alphaNum4", a),
            TrustLineAsset::CreditAlphanum12(a) => field(v, name, "alphaNum12", a),
            TrustLineAsset::PoolShare(id) => field(v, name, "liquidityPoolID", id),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for TrustLineAsset {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for TrustLineAsset {
    fn render(&self) -> Result<String> {
        match self {
            TrustLineAsset::Native => Ok("native".to_string()),
            TrustLineAsset::CreditAlphanum4(a) => credit_text(&a.asset_code, &a.issuer),
            TrustLineAsset::CreditAlphanum12(a) => credit_text(&a.asset_code, &a.issuer),
            TrustLineAsset::PoolShare(id) => Ok(format!("{}:lp", hex::encode(id))),
        }
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        *self = match parse_asset_text(text)? {
            AssetText::Native => TrustLineAsset::Native,
            AssetText::Credit(code, issuer) if code.len() == 4 => {
                TrustLineAsset::CreditAlphanum4(alphanum4(&code, issuer))
            }
            AssetText::Credit(code, issuer) => {
                TrustLineAsset::CreditAlphanum12(alphanum12(&code, issuer))
            }
            AssetText::Pool(id) => TrustLineAsset::PoolShare(id),
        };
        Ok(())
    }
}

/// Just the code part of an asset, as used by allow-trust.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetCode {
    CreditAlphanum4([u8; 4]),
    CreditAlphanum12([u8; 12]),
}

impl Default for AssetCode {
    fn default() -> Self {
        AssetCode::CreditAlphanum4([0; 4])
    }
}

impl AssetCode {
    pub fn kind(&self) -> AssetType {
        match self {
            AssetCode::CreditAlphanum4(_) => AssetType::CreditAlphanum4,
            AssetCode::CreditAlphanum12(_) => AssetType::CreditAlphanum12,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AssetCode::CreditAlphanum4(code) => code,
            AssetCode::CreditAlphanum12(code) => code,
        }
    }
}

impl XdrAggregate for AssetCode {
    fn type_name(&self) -> &'static str {
        "AssetCode"
    }

    fn marshal(&mut self, v: &mut dyn Visitor, name: &str) -> Result<()> {
        let mut kind = self.kind();
        field(v, name, "type", &mut kind)?;
        if kind != self.kind() {
            *self = match kind {
                AssetType::CreditAlphanum4 => AssetCode::CreditAlphanum4([0; 4]),
                AssetType::CreditAlphanum12 => AssetCode::CreditAlphanum12([0; 12]),
                other => return Err(bad_arm(name, other)),
            };
        }
        match self {
            AssetCode::CreditAlphanum4(code) => field(v, name, "assetCode4", code),
            AssetCode::CreditAlphanum12(code) => field(v, name, "assetCode12", code),
        }
    }

    fn text_form(&mut self) -> Option<&mut dyn TextForm> {
        Some(self)
    }
}

impl XdrType for AssetCode {
    fn as_value(&mut self) -> XdrValue<'_> {
        XdrValue::Aggregate(self)
    }
}

impl TextForm for AssetCode {
    fn render(&self) -> Result<String> {
        Ok(render_asset_code(self.as_bytes()))
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let code = parse_asset_code(first_token(text))?;
        *self = if code.len() == 4 {
            let mut short = [0u8; 4];
            short.copy_from_slice(&code);
            AssetCode::CreditAlphanum4(short)
        } else {
            let mut long = [0u8; 12];
            long.copy_from_slice(&code);
            AssetCode::CreditAlphanum12(long)
        };
        Ok(())
    }
}

macro_rules! asset_text_traits {
    ($($ty:ty),*) => {
        $(
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
        )*
    };
}

asset_text_traits!(Asset, TrustLineAsset, AssetCode);
