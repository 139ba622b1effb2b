//! Txrep scanner.
//!
//! Input is first split into a key/value map, then the target value is
//! traversed and each field takes its own key out of the map. Whatever keys
//! remain afterwards were not recognised by any field.
//!
//! - lines without a `:` are ignored
//! - a repeated key overrides the earlier line
//! - a missing or blank `.present` key means absent
//! - any other missing key is an error
//! - an enum value ending in `?` asks for help: the field is recorded in
//!   [`ScanOutcome::help`] and the rest of the token, if any, is the value

use crate::config::{ScanConfig, UnknownKeyPolicy};
use crate::core::marshal::{Scalar, Visitor, XdrType, XdrValue};
use crate::error::{constants, Result, TxrepError};
use crate::txrep::{first_token, parse_scalar};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Fields whose enum value was written with a trailing `?`.
pub type HelpSet = BTreeSet<String>;

/// Parsed `key: value` lines.
#[derive(Debug, Clone, Default)]
pub struct KeyValueMap {
    entries: HashMap<String, String>,
}

impl KeyValueMap {
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for (number, line) in text.lines().enumerate() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if entries
                .insert(key.to_string(), value.trim().to_string())
                .is_some()
            {
                debug!(key, line = number + 1, "txrep key repeated, later line wins");
            }
        }
        Self { entries }
    }

    /// Remove and return the value for `key`.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Keys nobody took, sorted.
    pub fn remaining_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Visitor filling values from a [`KeyValueMap`].
pub struct Scanner {
    kvs: KeyValueMap,
    help: HelpSet,
}

impl Scanner {
    pub fn new(kvs: KeyValueMap) -> Self {
        Self {
            kvs,
            help: HelpSet::new(),
        }
    }

    pub fn into_remaining(self) -> KeyValueMap {
        self.kvs
    }

    /// Leftover keys and the fields that asked for help.
    pub fn into_parts(self) -> (KeyValueMap, HelpSet) {
        (self.kvs, self.help)
    }

    fn require(&mut self, key: &str) -> Result<String> {
        self.kvs.take(key).ok_or_else(|| TxrepError::missing(key))
    }
}

impl Visitor for Scanner {
    fn visit(&mut self, name: &str, value: XdrValue<'_>) -> Result<()> {
        match value {
            XdrValue::Scalar(Scalar::Enum(e)) => {
                let text = self.require(name)?;
                let Some(token) = first_token(&text).strip_suffix('?') else {
                    return parse_scalar(Scalar::Enum(e), &text).map_err(|err| err.at(name));
                };
                self.help.insert(name.to_string());
                // a bare `?` keeps the current value
                if token.is_empty() {
                    return Ok(());
                }
                parse_scalar(Scalar::Enum(e), token).map_err(|err| err.at(name))
            }
            XdrValue::Scalar(s) => {
                let text = self.require(name)?;
                parse_scalar(s, &text).map_err(|e| e.at(name))
            }
            XdrValue::Array(a) => {
                if a.fixed_len().is_none() {
                    let key = format!("{name}.len");
                    let text = self.require(&key)?;
                    let len: usize = first_token(&text)
                        .parse()
                        .map_err(|_| TxrepError::malformed(&key, constants::ERR_BAD_INTEGER))?;
                    if len > a.max_len() {
                        return Err(TxrepError::bound(&key, len, a.max_len()));
                    }
                    a.resize(len);
                }
                a.marshal_elements(self, name)
            }
            XdrValue::Optional(o) => {
                let key = format!("{name}.present");
                let present = match self.kvs.take(&key).as_deref().map(first_token) {
                    None | Some("") | Some("false") => false,
                    Some("true") => true,
                    Some(_) => return Err(TxrepError::malformed(&key, constants::ERR_BAD_PRESENT)),
                };
                o.set_present(present);
                o.marshal_inner(self, name)
            }
            XdrValue::Aggregate(a) => {
                if let Some(form) = a.text_form() {
                    let text = self.require(name)?;
                    return form.parse(&text).map_err(|e| e.at(name));
                }
                a.marshal(self, name)
            }
        }
    }
}

/// A scanned value and the input keys it did not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome<T> {
    pub value: T,
    pub unknown_keys: Vec<String>,
    /// Enum fields written as `value?`; pass to [`Printer::with_help`] to list
    /// their choices.
    ///
    /// [`Printer::with_help`]: crate::txrep::Printer::with_help
    pub help: HelpSet,
}

/// Scan txrep text under the default configuration: unrecognised keys are
/// logged and reported, not rejected.
pub fn from_txrep<T: XdrType + Default>(text: &str) -> Result<ScanOutcome<T>> {
    from_txrep_with(text, &ScanConfig::default())
}

pub fn from_txrep_with<T: XdrType + Default>(
    text: &str,
    config: &ScanConfig,
) -> Result<ScanOutcome<T>> {
    if text.len() > config.max_input_bytes {
        return Err(TxrepError::bound("", text.len(), config.max_input_bytes));
    }

    let kvs = KeyValueMap::parse(text);
    debug!(keys = kvs.len(), "scanning txrep");
    let mut scanner = Scanner::new(kvs);
    let mut value = T::default();
    scanner.visit("", value.as_value())?;

    let (remaining, help) = scanner.into_parts();
    let unknown_keys = remaining.remaining_keys();
    if !unknown_keys.is_empty() {
        match config.unknown_keys {
            UnknownKeyPolicy::Reject => return Err(TxrepError::UnrecognizedFields(unknown_keys)),
            UnknownKeyPolicy::Warn => {
                for key in &unknown_keys {
                    warn!(key = %key, "unrecognized txrep field ignored");
                }
            }
        }
    }
    Ok(ScanOutcome {
        value,
        unknown_keys,
        help,
    })
}
