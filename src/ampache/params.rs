//! Request parameter access.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::library::Page;

/// Query-string (and form) parameters of one request.
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of `key`, with an empty string treated as absent.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn action(&self) -> Option<&str> {
        self.get("action")
    }

    /// Session token (or handshake token) from `auth`.
    pub fn auth(&self) -> Option<&str> {
        self.non_empty("auth")
    }

    pub fn filter(&self) -> Option<&str> {
        self.non_empty("filter")
    }

    /// `exact` is set unless absent, empty or `"0"`.
    pub fn exact(&self) -> bool {
        self.non_empty("exact").is_some_and(|v| v != "0")
    }

    /// `limit`/`offset`; zero, negative or non-numeric values mean unbounded.
    pub fn page(&self) -> Page {
        Page {
            limit: self.positive("limit"),
            offset: self.positive("offset"),
        }
    }

    fn positive(&self, key: &str) -> Option<u32> {
        self.get(key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
    }

    /// `filter` read as an entity id.
    pub fn id_filter(&self) -> Result<i64> {
        let raw = self.filter().unwrap_or_default();
        raw.trim()
            .parse()
            .map_err(|_| Error::not_found(format!("Invalid id filter '{raw}'")))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
