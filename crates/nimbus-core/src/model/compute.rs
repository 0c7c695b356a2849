// ── Compute domain types ──
//
// Images, disks, instances and the pod/service unit groupings that
// deploy them.

use serde::{Deserialize, Serialize};

use super::Extra;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub id: String,
    pub disk: Option<String>,
    pub name: String,
    pub comment: String,
    pub deployment: Option<String>,
    pub organization: Option<String>,
    pub signed: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub system_type: String,
    pub firmware: String,
    pub storage: String,
    pub key: String,
    pub last_modified: Option<String>,
    pub storage_class: String,
    pub etag: String,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub state: String,
    pub node: Option<String>,
    pub organization: Option<String>,
    pub instance: Option<String>,
    pub source_instance: Option<String>,
    pub delete_protection: bool,
    pub image: Option<String>,
    pub restore_image: Option<String>,
    pub backing: bool,
    pub backing_image: Option<String>,
    pub index: String,
    pub size: u32,
    pub backup: bool,
    pub last_backup: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub id: String,
    pub organization: Option<String>,
    pub zone: Option<String>,
    pub vpc: Option<String>,
    pub subnet: Option<String>,
    pub node: Option<String>,
    pub shape: Option<String>,
    pub image: Option<String>,
    pub image_backing: bool,
    pub domain: Option<String>,
    pub name: String,
    pub comment: String,
    pub state: String,
    pub action: String,
    pub delete_protection: bool,
    pub init_disk_size: u32,
    pub memory: u32,
    pub processors: u32,
    pub network_roles: Vec<String>,
    pub public_ips: Vec<String>,
    pub private_ips: Vec<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A deployable unit definition inside a pod or service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodUnit {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub spec: String,
    pub spec_index: u32,
    pub last_spec: Option<String>,
    pub deploy_spec: Option<String>,
    pub delete: bool,
    pub new: bool,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pod {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    pub delete_protection: bool,
    pub units: Vec<PodUnit>,
    pub drafts: Vec<PodUnit>,

    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub organization: Option<String>,
    pub delete_protection: bool,
    pub units: Vec<PodUnit>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Live view of one unit: its committed specs and running deployments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitDetail {
    pub id: String,
    pub kind: String,
    pub pod: Option<String>,
    pub service: Option<String>,
    pub commits: Vec<Spec>,
    pub deployments: Vec<Deployment>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// One committed revision of a unit spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spec {
    pub id: String,
    pub pod: Option<String>,
    pub unit: String,
    pub index: u32,
    pub timestamp: Option<String>,
    pub name: String,
    pub kind: String,
    pub count: u32,
    pub hash: String,
    pub data: String,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A page of spec history. `unit`, `page` and `page_count` are filled in
/// from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecPage {
    pub unit: String,
    pub specs: Vec<Spec>,
    pub count: u64,
    pub page: u64,
    pub page_count: u64,
}

/// An instance launched from a unit spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    pub id: String,
    pub pod: Option<String>,
    pub service: Option<String>,
    pub unit: String,
    pub timestamp: Option<String>,
    pub tags: Vec<String>,
    pub spec: String,
    pub kind: String,
    pub state: String,
    pub action: String,
    pub status: String,
    pub node: Option<String>,
    pub instance: Option<String>,
    pub zone_name: String,
    pub node_name: String,
    pub instance_name: String,
    pub instance_status: String,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Deployment {
    /// Id of the pod or service this deployment belongs to.
    pub fn host(&self) -> Option<&str> {
        self.pod.as_deref().or(self.service.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_round_trip() {
        let raw = json!({
            "id": "i1",
            "name": "web-1",
            "state": "running",
            "uptime": "3 days",
            "info": {"disks": ["d1"]}
        });
        let instance: Instance = serde_json::from_value(raw).unwrap();
        assert_eq!(instance.state, "running");
        assert_eq!(instance.extra.get("uptime").unwrap(), "3 days");

        let back = serde_json::to_value(&instance).unwrap();
        assert_eq!(back["info"]["disks"][0], "d1");
        assert_eq!(back["name"], "web-1");
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let disk: Disk = serde_json::from_value(json!({"id": "d1", "node": null})).unwrap();
        assert!(disk.node.is_none());
        assert_eq!(disk.size, 0);
    }

    #[test]
    fn deployment_host_prefers_pod() {
        let pod: Deployment =
            serde_json::from_value(json!({"id": "d1", "pod": "p1", "unit": "u1"})).unwrap();
        assert_eq!(pod.host(), Some("p1"));

        let service: Deployment =
            serde_json::from_value(json!({"id": "d2", "service": "s1"})).unwrap();
        assert_eq!(service.host(), Some("s1"));
        assert_eq!(Deployment::default().host(), None);
    }
}
