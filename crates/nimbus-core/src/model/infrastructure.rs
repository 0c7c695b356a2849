// ── Physical infrastructure domain types ──
//
// Datacenters contain zones, zones contain nodes and pools. Shapes and
// plans describe what instances may be launched onto them; storages are
// the object-store backends holding images and backups.

use serde::{Deserialize, Serialize};

use super::Extra;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Datacenter {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub network_mode: String,
    pub match_organizations: bool,
    pub organizations: Vec<String>,
    pub public_storages: Vec<String>,
    pub private_storage: Option<String>,
    pub private_storage_class: String,
    pub backup_storage: Option<String>,
    pub backup_storage_class: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub datacenter: String,
    pub name: String,
    pub comment: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub id: String,
    pub zone: Option<String>,
    pub name: String,
    pub comment: String,
    pub types: Vec<String>,
    pub port: u16,
    pub protocol: String,
    pub certificates: Vec<String>,
    pub admin_domain: String,
    pub user_domain: String,
    pub forwarded_for_header: String,
    pub timestamp: Option<String>,
    pub cpu_units: u32,
    pub memory_units: f64,
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Host setup sent with `POST /node/{id}/init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInit {
    pub provider: String,
    pub zone: Option<String>,
    pub firewall: bool,
    pub internal_interface: String,
    pub external_interface: String,
    pub host_network: String,
    pub block_gateway: String,
    pub block_netmask: String,
    pub block_subnets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub delete_protection: bool,
    pub zone: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vg_name: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shape {
    pub id: String,
    pub name: String,
    pub comment: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub delete_protection: bool,
    pub datacenter: String,
    pub roles: Vec<String>,
    pub flexible: bool,
    pub disk_type: String,
    pub disk_pool: Option<String>,
    pub memory: u32,
    pub processors: u32,
    pub node_count: u32,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub id: String,
    pub name: String,
    pub comment: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub insecure: bool,

    #[serde(flatten)]
    pub extra: Extra,
}
