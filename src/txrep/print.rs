//! Txrep printer.

use crate::config::TxrepConfig;
use crate::core::marshal::{AsAny, Scalar, Visitor, XdrType, XdrValue};
use crate::error::{Result, TxrepError};
use crate::txrep::{render_scalar, HelpSet};
use crate::types::{MuxedAccount, PublicKey};
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::debug;

/// Supplies a short note for values worth explaining to a reader, e.g. which
/// known account a key belongs to. The note is appended to the last line the
/// value printed, in parentheses.
pub trait Annotate {
    fn note(&self, value: &dyn Any) -> Option<String>;
}

/// Visitor rendering every value as `path: value` lines.
#[derive(Default)]
pub struct Printer<'a> {
    out: String,
    annotator: Option<&'a dyn Annotate>,
    help: Option<&'a HelpSet>,
}

impl<'a> Printer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotator(annotator: &'a dyn Annotate) -> Self {
        Self {
            annotator: Some(annotator),
            ..Self::default()
        }
    }

    /// List the declared symbols after every enum field named in `help`.
    pub fn with_help(mut self, help: &'a HelpSet) -> Self {
        self.help = Some(help);
        self
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, name: &str, value: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{name}: {value}");
    }

    fn append_note(&mut self, note: &str) {
        if self.out.ends_with('\n') {
            self.out.pop();
            let _ = writeln!(self.out, " ({note})");
        }
    }
}

impl Visitor for Printer<'_> {
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()> {
        match value {
            XdrValue::Scalar(s) => {
                if let Scalar::VarOpaque { bytes, max } | Scalar::String { bytes, max } = &s {
                    if bytes.len() > *max as usize {
                        return Err(TxrepError::bound(name, bytes.len(), *max as usize));
                    }
                }
                self.line(name, render_scalar(&s));
                if let Scalar::Enum(e) = &s {
                    if self.help.is_some_and(|h| h.contains(name)) {
                        self.append_note(&e.symbols().join(", "));
                    }
                }
                Ok(())
            }
            XdrValue::Array(a) => {
                if a.fixed_len().is_none() {
                    if a.len() > a.max_len() {
                        return Err(TxrepError::bound(name, a.len(), a.max_len()));
                    }
                    self.line(&format!("{name}.len"), a.len());
                }
                a.marshal_elements(self, name)
            }
            XdrValue::Optional(o) => {
                self.line(&format!("{name}.present"), o.is_present());
                o.marshal_inner(self, name)
            }
            XdrValue::Aggregate(a) => {
                let note = self.annotator.and_then(|n| n.note((*a).as_any()));
                let rendered = match a.text_form() {
                    Some(text) => Some(text.render().map_err(|e| e.at(name))?),
                    None => None,
                };
                match rendered {
                    Some(text) => self.line(name, text),
                    None => a.marshal(self, name)?,
                }
                if let Some(note) = note {
                    self.append_note(&note);
                }
                Ok(())
            }
        }
    }
}

/// Render `value` as txrep.
pub fn to_txrep<T: XdrType + ?Sized>(value: &mut T) -> Result<String> {
    let mut printer = Printer::new();
    printer.visit("", value.as_value())?;
    Ok(printer.finish())
}

/// Render `value` as txrep, annotating lines through `annotator`.
pub fn to_txrep_annotated<T: XdrType + ?Sized>(
    value: &mut T,
    annotator: &dyn Annotate,
) -> Result<String> {
    debug!("printing annotated txrep");
    let mut printer = Printer::with_annotator(annotator);
    printer.visit("", value.as_value())?;
    Ok(printer.finish())
}

/// Render `value` the way `config` asks: account labels from `[accounts]`
/// when `print.annotate_accounts` is set, choices for the fields in `help`.
pub fn to_txrep_configured<T: XdrType + ?Sized>(
    value: &mut T,
    config: &TxrepConfig,
    help: Option<&HelpSet>,
) -> Result<String> {
    let book = if config.print.annotate_accounts {
        Some(AccountBook::from_config(config)?)
    } else {
        None
    };
    let mut printer = match &book {
        Some(book) => Printer::with_annotator(book),
        None => Printer::new(),
    };
    if let Some(help) = help {
        printer = printer.with_help(help);
    }
    debug!(
        annotate = book.is_some(),
        help = help.map_or(0, HelpSet::len),
        "printing configured txrep"
    );
    printer.visit("", value.as_value())?;
    Ok(printer.finish())
}

/// Labels for known accounts, keyed by account id. Muxed accounts are labelled
/// by their underlying account.
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    labels: HashMap<PublicKey, String>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[accounts]` table of a configuration. Muxed keys label
    /// their underlying account.
    pub fn from_config(config: &TxrepConfig) -> Result<Self> {
        let mut book = Self::new();
        for (account, label) in &config.accounts {
            let key: MuxedAccount = account
                .parse()
                .map_err(|e: TxrepError| TxrepError::ConfigError(format!("accounts.{account}: {e}")))?;
            book.insert(key.account_id(), label.clone());
        }
        Ok(book)
    }

    pub fn insert(&mut self, key: PublicKey, label: impl Into<String>) {
        self.labels.insert(key, label.into());
    }

    pub fn label(&self, key: &PublicKey) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Annotate for AccountBook {
    fn note(&self, value: &dyn Any) -> Option<String> {
        if let Some(key) = value.downcast_ref::<PublicKey>() {
            return self.label(key).map(str::to_string);
        }
        if let Some(muxed) = value.downcast_ref::<MuxedAccount>() {
            return self.label(&muxed.account_id()).map(str::to_string);
        }
        None
    }
}
