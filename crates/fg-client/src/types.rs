//! Common types for the gateway client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection holding the computing infrastructures
pub const INFRASTRUCTURE_COLLECTION: &str = "infrastructure";

/// Sub-path of a resource receiving uploaded files
pub const INPUT_PATH: &str = "input";

/// A portal tenant (company/instance)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TenantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A portal user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Response of `POST {collection}`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CreatedResource {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// An infrastructure entry of the infrastructure collection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    /// Infrastructure id
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether users may submit to it
    pub enabled: bool,
}

/// Body of `GET infrastructure`
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct InfrastructureList {
    #[serde(rename = "infrastructure")]
    pub items: Vec<Infrastructure>,
}

/// The gateway serialises ids either as JSON strings or as bare numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
