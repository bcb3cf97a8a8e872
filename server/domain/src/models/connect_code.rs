use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use thiserror::Error;

static CONNECT_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+#[0-9]+$").expect("connect code pattern is valid"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{input:?} is not a connect code of the form NAME#DISCRIMINATOR")]
pub struct InvalidConnectCode {
    pub input: String,
}

/// A player's connect code, e.g. `C4D#69`.
///
/// Values can only be obtained through [`ConnectCode::parse`], so every
/// `ConnectCode` in the system matches `^[A-Z0-9]+#[0-9]+$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectCode(String);

impl ConnectCode {
    pub fn parse(input: &str) -> Result<Self, InvalidConnectCode> {
        if CONNECT_CODE_PATTERN.is_match(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(InvalidConnectCode {
                input: input.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConnectCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConnectCode {
    type Error = InvalidConnectCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ConnectCode> for String {
    fn from(code: ConnectCode) -> Self {
        code.0
    }
}
