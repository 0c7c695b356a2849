// ── Identity & access domain types ──
//
// Organizations, users, policies, certificates, authorities and secrets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Extra;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub roles: Vec<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub comment: String,
    pub roles: Vec<String>,
    pub administrator: String,
    pub permissions: Vec<String>,
    pub disabled: bool,
    pub active_until: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One policy rule (`location`, `whitelist_networks`, `operating_system`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRule {
    #[serde(rename = "type")]
    pub kind: String,
    pub disable: bool,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub disabled: bool,
    pub roles: Vec<String>,
    pub rules: BTreeMap<String, PolicyRule>,
    pub admin_secondary: Option<String>,
    pub user_secondary: Option<String>,
    pub admin_device_secondary: bool,
    pub user_device_secondary: bool,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    pub certificate: String,
    pub acme_domains: Vec<String>,
    pub acme_type: String,
    pub acme_auth: String,
    pub acme_secret: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Authority {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub network_roles: Vec<String>,
    pub key: String,
    pub principals: Vec<String>,
    pub certificate: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    pub value: String,
    pub region: String,
    pub public_key: String,
    pub data: String,

    #[serde(flatten)]
    pub extra: Extra,
}
