//! Page request and user record types

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default page size when the caller gives none
pub const DEFAULT_LIMIT: u64 = 10;

/// Default offset when the caller gives none
pub const DEFAULT_SKIP: u64 = 0;

/// A `(limit, skip)` pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u64,
    pub skip: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: DEFAULT_SKIP,
        }
    }
}

impl PageRequest {
    pub fn new(limit: u64, skip: u64) -> Self {
        Self { limit, skip }
    }

    /// Build a request from a raw query string such as `limit=5&skip=10`
    ///
    /// Keys and values are percent-decoded. Missing or non-numeric values fall
    /// back to the defaults. Only the first occurrence of each key counts.
    pub fn from_query(query: Option<&str>) -> Self {
        debug!(?query, "PageRequest::from_query: called");
        let mut limit = None;
        let mut skip = None;

        for pair in query.unwrap_or_default().split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let Some(key) = decode(key) else {
                continue;
            };
            match key.as_ref() {
                "limit" if limit.is_none() => limit = Some(parse_or(value, DEFAULT_LIMIT)),
                "skip" if skip.is_none() => skip = Some(parse_or(value, DEFAULT_SKIP)),
                _ => {}
            }
        }

        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            skip: skip.unwrap_or(DEFAULT_SKIP),
        }
    }
}

fn decode(raw: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(raw).decode_utf8().ok()
}

fn parse_or(value: &str, default: u64) -> u64 {
    decode(value).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// One page of users, as returned by the upstream listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl UserPage {
    /// True when no page follows this one
    pub fn is_last(&self) -> bool {
        self.skip.saturating_add(self.limit) >= self.total
    }
}

/// The subset of a user record the explorer displays
///
/// Fields not listed here are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub image: String,
    pub company: Option<Company>,
    pub address: Option<Address>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive match on full name, email or username
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.full_name().to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.username.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub name: String,
    pub title: String,
    pub department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub city: String,
    pub state: String,
    pub country: String,
}
