// ── System domain types ──
//
// Audit log entries plus the two singleton documents (global settings and
// the license subscription).

use serde::{Deserialize, Serialize};

use super::Extra;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub id: String,
    pub level: String,
    pub timestamp: Option<String>,
    pub message: String,
    pub stack: String,
    pub fields: serde_json::Map<String, serde_json::Value>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auth_providers: Vec<serde_json::Value>,
    pub auth_secondary_providers: Vec<serde_json::Value>,
    pub auth_admin_expire: u32,
    pub auth_admin_max_duration: u32,
    pub auth_proxy_expire: u32,
    pub auth_proxy_max_duration: u32,
    pub auth_user_expire: u32,
    pub auth_user_max_duration: u32,
    pub auth_fast_login: bool,
    pub auth_force_fast_user_login: bool,
    pub auth_force_fast_service_login: bool,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub active: bool,
    pub status: Option<String>,
    pub plan: Option<String>,
    pub quantity: u32,
    pub amount: u64,
    pub credit: u64,
    pub period_end: Option<String>,
    pub trial_end: Option<String>,
    pub cancel_at_period_end: bool,
    pub balance: i64,
    pub url_key: String,

    #[serde(flatten)]
    pub extra: Extra,
}
