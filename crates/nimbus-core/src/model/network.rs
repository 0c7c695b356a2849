// ── Networking domain types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Extra;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpcRoute {
    pub destination: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vpc {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub vpc_id: u32,
    pub network: String,
    pub network6: String,
    pub organization: Option<String>,
    pub datacenter: Option<String>,
    pub routes: Vec<VpcRoute>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainRecord {
    pub id: String,
    pub sub_domain: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub secret: Option<String>,
    pub root_domain: String,
    pub last_update: Option<String>,
    pub records: Vec<DomainRecord>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A single ingress rule. `port` is empty for `all`/`icmp` protocols.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    pub source_ips: Vec<String>,
    pub protocol: String,
    pub port: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firewall {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    pub network_roles: Vec<String>,
    pub ingress: Vec<FirewallRule>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// An address block that instances draw public/host addresses from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub id: String,
    pub name: String,
    pub comment: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subnets: Vec<String>,
    pub subnets6: Vec<String>,
    pub excludes: Vec<String>,
    pub netmask: String,
    pub gateway: String,
    pub gateway6: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerDomain {
    pub domain: String,
    pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerBackend {
    pub protocol: String,
    pub hostname: String,
    pub port: u16,
}

/// Health counters reported by one node serving the balancer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerState {
    pub timestamp: Option<String>,
    pub requests: u64,
    pub retries: u64,
    pub websockets: u64,
    pub online: Vec<String>,
    pub unknown_high: Vec<String>,
    pub unknown_mid: Vec<String>,
    pub unknown_low: Vec<String>,
    pub offline: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balancer {
    pub id: String,
    pub name: String,
    pub comment: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub state: bool,
    pub organization: Option<String>,
    pub datacenter: Option<String>,
    pub certificates: Vec<String>,
    pub client_authority: Option<String>,
    pub websockets: bool,
    pub domains: Vec<BalancerDomain>,
    pub backends: Vec<BalancerBackend>,
    pub states: BTreeMap<String, BalancerState>,
    pub check_path: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn balancer_states_keyed_by_node() {
        let balancer: Balancer = serde_json::from_value(json!({
            "id": "b1",
            "name": "edge",
            "type": "http",
            "domains": [{"domain": "example.com", "host": "www"}],
            "backends": [{"protocol": "http", "hostname": "10.0.0.2", "port": 8080}],
            "states": {
                "n1": {"requests": 12, "online": ["10.0.0.2:8080"]}
            },
            "check_path": "/health"
        }))
        .unwrap();

        assert_eq!(balancer.kind, "http");
        assert_eq!(balancer.backends[0].port, 8080);
        assert_eq!(balancer.states["n1"].requests, 12);
        assert_eq!(balancer.states["n1"].online.len(), 1);
    }

    #[test]
    fn firewall_rules_parse() {
        let fw: Firewall = serde_json::from_value(json!({
            "id": "f1",
            "name": "web",
            "network_roles": ["web"],
            "ingress": [
                {"source_ips": ["0.0.0.0/0"], "protocol": "tcp", "port": "443"},
                {"source_ips": ["10.0.0.0/8"], "protocol": "icmp"}
            ]
        }))
        .unwrap();
        assert_eq!(fw.ingress.len(), 2);
        assert!(fw.ingress[1].port.is_empty());
    }
}
