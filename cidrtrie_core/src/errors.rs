//! Error type for trie operations

use crate::prefix::Prefix;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Exact-match target holds no value (or has no node at all).
    NotPresent(Prefix),
    /// `insert_if_absent` hit a key that already holds a value.
    AlreadyPresent(Prefix),
    /// Rejected while building a canonical key.
    InvalidKey(String),
}

impl Error {
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::NotPresent(_) => "Not present",
            Error::AlreadyPresent(_) => "Already present",
            Error::InvalidKey(_) => "Invalid key",
        }
    }

    /// The prefix the failed operation targeted, when there is one.
    pub fn prefix(&self) -> Option<&Prefix> {
        match self {
            Error::NotPresent(p) | Error::AlreadyPresent(p) => Some(p),
            Error::InvalidKey(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotPresent(p) | Error::AlreadyPresent(p) => {
                write!(f, "{}: {}", self.as_str(), p)
            }
            Error::InvalidKey(msg) => write!(f, "{}: {}", self.as_str(), msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::InvalidKey(s)
    }
}
