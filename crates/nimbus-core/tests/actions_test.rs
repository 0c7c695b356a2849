#![allow(clippy::unwrap_used)]
// Integration tests for the action layer against a wiremock console.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{
    body_json, body_string, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_api::ApiClient;
use nimbus_core::model::{Deployment, Firewall, Node, NodeInit, Pod, Subscription, Zone};
use nimbus_core::{
    AlertLevel, ChangeEvent, Console, ConsoleConfig, CoreError, Filter, ResourceKind, Scope,
    SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Console) {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap();

    let mut config = ConsoleConfig::new(url.clone());
    config.events_enabled = false;
    config.organization = Some("org-1".into());
    let console = Console::with_client(config, ApiClient::with_client(reqwest::Client::new(), url));

    Mock::given(method("GET"))
        .and(path("/csrf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok"})))
        .mount(&server)
        .await;
    console.init().await.unwrap();

    (server, console)
}

fn firewalls(ids: &[&str], count: u64) -> serde_json::Value {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "name": format!("fw-{id}")}))
        .collect();
    json!({"firewalls": items, "count": count})
}

fn store_ids(console: &Console) -> Vec<String> {
    console
        .store::<Firewall>()
        .items()
        .iter()
        .map(|f| f.id.clone())
        .collect()
}

// ── Sync ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_populates_store() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(header("Organization", "org-1"))
        .and(query_param("page", "0"))
        .and(query_param("page_count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(firewalls(&["a", "b"], 2)))
        .expect(1)
        .mount(&server)
        .await;

    console.actions::<Firewall>().sync().await.unwrap();

    let store = console.store::<Firewall>();
    assert_eq!(store_ids(&console), vec!["a", "b"]);
    assert_eq!(store.count(), 2);
    assert_eq!(store.pages(), 1);
    assert_eq!(store.resource("a").unwrap().name, "fw-a");
    assert!(store.resource("c").is_none());
    assert!(!console.loader().is_loading());
}

#[tokio::test]
async fn test_filter_and_traverse_drive_query() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param_is_missing("name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(firewalls(&["a"], 95)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("name", "web"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(firewalls(&["w1"], 41)))
        .expect(1)
        .mount(&server)
        .await;

    let actions = console.actions::<Firewall>();
    actions.sync().await.unwrap();
    actions.traverse(3).await.unwrap();
    assert_eq!(console.store::<Firewall>().page(), 3);

    actions.filter(Some(Filter::by_name("web"))).await.unwrap();

    let store = console.store::<Firewall>();
    assert_eq!(store.page(), 0);
    assert_eq!(store.pages(), 3);
    assert_eq!(store_ids(&console), vec!["w1"]);
}

#[tokio::test]
async fn test_superseded_sync_is_discarded() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("name", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(firewalls(&["old"], 1))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("name", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(firewalls(&["new"], 1)))
        .mount(&server)
        .await;

    let actions = Arc::clone(console.actions::<Firewall>());
    console
        .dispatcher()
        .dispatch(nimbus_core::Message::Firewall(nimbus_core::Action::Filter {
            filter: Some(Filter::by_name("slow")),
        }));

    let first = {
        let actions = Arc::clone(&actions);
        tokio::spawn(async move { actions.sync().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    actions.filter(Some(Filter::by_name("fast"))).await.unwrap();
    assert_eq!(store_ids(&console), vec!["new"]);

    // The slow response arrives last and must not overwrite.
    first.await.unwrap().unwrap();
    assert_eq!(store_ids(&console), vec!["new"]);
}

#[tokio::test]
async fn test_superseded_failure_raises_no_alert() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("name", "slow"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/firewall"))
        .and(query_param("name", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(firewalls(&["x"], 1)))
        .mount(&server)
        .await;

    let actions = Arc::clone(console.actions::<Firewall>());
    let first = {
        let actions = Arc::clone(&actions);
        tokio::spawn(async move { actions.filter(Some(Filter::by_name("slow"))).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    actions.filter(Some(Filter::by_name("fast"))).await.unwrap();

    assert!(first.await.unwrap().is_ok());
    assert!(alerts.try_recv().is_err());
}

// ── Failure policy ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_expires_session_and_resolves() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/zone"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    console.actions::<Zone>().sync().await.unwrap();

    assert_eq!(console.session().state(), SessionState::Expired);
    assert!(console.store::<Zone>().is_empty());
    assert!(alerts.try_recv().is_err());
}

#[tokio::test]
async fn test_server_error_alerts_and_rejects() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = console.actions::<Firewall>().sync().await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let alert = alerts.try_recv().unwrap();
    assert_eq!(alert.level, AlertLevel::Error);
    assert_eq!(alert.message, "Failed to load firewalls");
    assert_eq!(console.session().state(), SessionState::Active);
}

#[tokio::test]
async fn test_commit_error_includes_server_message() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("PUT"))
        .and(path("/firewall/f1"))
        .and(header("Csrf-Token", "tok"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "ingress_port_invalid",
            "error_msg": "Ingress port is invalid"
        })))
        .mount(&server)
        .await;

    let fw = Firewall {
        id: "f1".into(),
        name: "web".into(),
        ..Firewall::default()
    };
    let err = console.actions::<Firewall>().commit(&fw).await.unwrap_err();

    assert!(matches!(err, CoreError::Rejected { status: 400, .. }));
    assert_eq!(
        alerts.try_recv().unwrap().message,
        "Failed to save firewall: Ingress port is invalid"
    );
}

#[tokio::test]
async fn test_error_msg_without_error_key_reaches_alert() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/firewall"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error_msg": "Organization is required"
        })))
        .mount(&server)
        .await;

    assert!(console.actions::<Firewall>().sync().await.is_err());
    assert_eq!(
        alerts.try_recv().unwrap().message,
        "Failed to load firewalls: Organization is required"
    );
}

#[tokio::test]
async fn test_unauthorized_mutations_resolve_quietly() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("PUT"))
        .and(path("/firewall/f1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/firewall"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let actions = console.actions::<Firewall>();
    let fw = Firewall {
        id: "f1".into(),
        ..Firewall::default()
    };
    actions.commit(&fw).await.unwrap();
    assert_eq!(console.session().state(), SessionState::Expired);

    actions
        .remove_multi(&["f1".into(), "f2".into()])
        .await
        .unwrap();

    assert_eq!(console.session().state(), SessionState::Expired);
    assert!(alerts.try_recv().is_err());
}

#[tokio::test]
async fn test_get_missing_record_is_not_found() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/node/n9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = console.actions::<Node>().get("n9").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound {
            kind: ResourceKind::Node,
            ..
        }
    ));
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_mutations_hit_expected_endpoints() {
    let (server, console) = setup().await;

    Mock::given(method("POST"))
        .and(path("/firewall"))
        .and(body_json(json!({
            "id": "", "name": "db", "comment": "", "organization": null,
            "network_roles": ["db"], "ingress": []
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/firewall/f1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/firewall"))
        .and(query_param_is_missing("force"))
        .and(body_json(json!(["f1", "f2"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let actions = console.actions::<Firewall>();
    let fw = Firewall {
        name: "db".into(),
        network_roles: vec!["db".into()],
        ..Firewall::default()
    };
    actions.create(&fw).await.unwrap();
    actions.remove("f1").await.unwrap();
    actions
        .remove_multi(&["f1".into(), "f2".into()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bulk_instance_and_node_operations() {
    let (server, console) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/instance"))
        .and(query_param("force", "true"))
        .and(body_json(json!(["i1"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/instance"))
        .and(body_json(json!({"ids": ["i1", "i2"], "action": "stop"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/node/n1/restart"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let instances = console.actions::<nimbus_core::model::Instance>();
    instances.force_remove_multi(&["i1".into()]).await.unwrap();
    instances
        .update_multi(&["i1".into(), "i2".into()], "stop")
        .await
        .unwrap();
    console
        .actions::<Node>()
        .operation("n1", "restart")
        .await
        .unwrap();
}

// ── Scoped listings ─────────────────────────────────────────────────

#[tokio::test]
async fn test_scoped_sync() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/node"))
        .and(query_param("names", "true"))
        .and(query_param("zone", "z1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "n1", "name": "node-1"},
            {"id": "n2", "name": "node-2"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let actions = console.actions::<Node>();
    let scope = Scope::new("zone", "z1");
    actions.sync_scoped(scope.clone()).await.unwrap();

    let store = console.store::<Node>();
    assert_eq!(store.scoped(&scope).unwrap().len(), 2);
    assert!(store.is_empty(), "paged listing untouched");

    // Empty scope clears without a request.
    let empty = Scope::new("zone", "");
    actions.sync_scoped(empty.clone()).await.unwrap();
    assert_eq!(store.scoped(&empty).unwrap().len(), 0);
}

// ── Server-pushed changes ───────────────────────────────────────────

#[tokio::test]
async fn test_change_event_triggers_resync() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/zone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [{"id": "z1", "name": "east", "datacenter": "d1"}],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    console.listen().unwrap();
    let mut changes = console.store::<Zone>().subscribe();

    // Unrelated kinds are ignored.
    console.events().emit(ChangeEvent::new(ResourceKind::Pool));
    console.events().emit(ChangeEvent::new(ResourceKind::Zone));

    tokio::time::timeout(Duration::from_secs(5), changes.changed())
        .await
        .unwrap();
    assert_eq!(console.store::<Zone>().resource("z1").unwrap().name, "east");

    console.shutdown().await;
}

#[tokio::test]
async fn test_failed_resync_keeps_listening() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/zone"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [{"id": "z2", "name": "west"}],
            "count": 1
        })))
        .mount(&server)
        .await;

    console.listen().unwrap();
    let mut changes = console.store::<Zone>().subscribe();

    console.events().emit(ChangeEvent::new(ResourceKind::Zone));
    let alert = tokio::time::timeout(Duration::from_secs(5), alerts.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alert.message, "Failed to load zones");

    console.events().emit(ChangeEvent::new(ResourceKind::Zone));
    tokio::time::timeout(Duration::from_secs(5), changes.changed())
        .await
        .unwrap();
    assert_eq!(console.store::<Zone>().resource("z2").unwrap().name, "west");

    console.shutdown().await;
}

// ── Units and deployments ───────────────────────────────────────────

fn deployment(id: &str) -> Deployment {
    Deployment {
        id: id.into(),
        pod: Some("p1".into()),
        unit: "u1".into(),
        ..Deployment::default()
    }
}

#[tokio::test]
async fn test_pod_unit_sync_ignores_missing_unit() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "kind": "instance",
            "pod": "p1",
            "deployments": [{"id": "d1", "pod": "p1", "unit": "u1", "state": "deployed"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let units = console.pod_units();
    units.actions.sync_unit("p1", "u1").await.unwrap();
    let unit = units.store.get().unwrap();
    assert_eq!(unit.deployments[0].state, "deployed");

    units.actions.sync_unit("p1", "gone").await.unwrap();
    assert_eq!(units.store.get().unwrap().id, "u1");
    assert!(alerts.try_recv().is_err());
    assert!(console.service_units().store.get().is_none());
}

#[tokio::test]
async fn test_service_unit_missing_raises_alert() {
    let (server, console) = setup().await;
    let mut alerts = console.alerts().subscribe();

    Mock::given(method("GET"))
        .and(path("/service/s1/unit/u9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = console
        .service_units()
        .actions
        .sync_unit("s1", "u9")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(alerts.try_recv().unwrap().message, "Failed to load service unit");
}

#[tokio::test]
async fn test_host_change_resyncs_inspected_unit() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pods": [], "count": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u1", "pod": "p1"})))
        .expect(2)
        .mount(&server)
        .await;

    let units = console.pod_units();
    units.actions.sync_unit("p1", "u1").await.unwrap();

    console.listen().unwrap();
    let mut changes = units.store.subscribe();
    console.events().emit(ChangeEvent::new(ResourceKind::Pod));

    tokio::time::timeout(Duration::from_secs(5), changes.changed())
        .await
        .unwrap();
    console.shutdown().await;
}

#[tokio::test]
async fn test_deployment_requests() {
    let (server, console) = setup().await;

    Mock::given(method("POST"))
        .and(path("/pod/p1/unit/u1/deployment"))
        .and(body_json(json!({"count": 2, "spec": "sp1"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/pod/p1/unit/u1/deployment"))
        .and(query_param("action", "restart"))
        .and(query_param("commit", "sp2"))
        .and(body_json(json!(["d1", "d2"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/service/s1/unit/u1/deployment"))
        .and(query_param("state", "stop"))
        .and(query_param_is_missing("commit"))
        .and(body_json(json!(["d3"])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/pod/p1/unit/u1/deployment/d1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let pods = &console.pod_units().actions;
    pods.deploy("p1", "u1", "sp1", 2).await.unwrap();
    pods.update_deployments("p1", "u1", &["d1".into(), "d2".into()], "restart", Some("sp2"))
        .await
        .unwrap();
    console
        .service_units()
        .actions
        .update_deployments("s1", "u1", &["d3".into()], "stop", None)
        .await
        .unwrap();
    pods.commit_deployment(&deployment("d1")).await.unwrap();
}

#[tokio::test]
async fn test_deployment_without_host_is_rejected_locally() {
    let (_server, console) = setup().await;

    let orphan = Deployment {
        id: "d1".into(),
        ..Deployment::default()
    };
    let err = console
        .pod_units()
        .actions
        .commit_deployment(&orphan)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_deployment_log_and_cancel() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1/deployment/d1/log"))
        .and(query_param("resource", "instance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["booted"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1/deployment/d2/log"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["late"]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let actions = Arc::clone(&console.pod_units().actions);
    let output = actions.log(&deployment("d1"), "instance").await.unwrap();
    assert_eq!(output, Some(json!(["booted"])));

    let pending = {
        let actions = Arc::clone(&actions);
        tokio::spawn(async move { actions.log(&deployment("d2"), "instance").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    actions.cancel_logs();

    assert_eq!(pending.await.unwrap().unwrap(), None);
}

#[tokio::test]
async fn test_pod_spec_history() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1/spec"))
        .and(query_param("page", "2"))
        .and(query_param("page_count", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "specs": [{"id": "sp1", "index": 201, "hash": "abc"}],
            "count": 250
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pod/p1/unit/u1/spec/sp1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sp1",
            "data": "---\nname: web"
        })))
        .mount(&server)
        .await;

    let actions = &console.pod_units().actions;
    let page = actions.specs("p1", "u1", 2).await.unwrap().unwrap();
    assert_eq!(page.unit, "u1");
    assert_eq!(page.page, 2);
    assert_eq!(page.page_count, 100);
    assert_eq!(page.count, 250);
    assert_eq!(page.specs[0].index, 201);

    let spec = actions.spec("p1", "u1", "sp1").await.unwrap().unwrap();
    assert_eq!(spec.data, "---\nname: web");
}

#[tokio::test]
async fn test_pod_deploy_and_drafts() {
    let (server, console) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/pod/p1/deploy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/pod/p1/drafts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pods": [{"id": "p1", "name": "web"}],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pod = Pod {
        id: "p1".into(),
        name: "web".into(),
        ..Pod::default()
    };
    let actions = console.actions::<Pod>();
    actions.commit_deploy(&pod, false).await.unwrap();
    actions.commit_drafts(&pod, true).await.unwrap();

    assert_eq!(console.store::<Pod>().resource("p1").unwrap().name, "web");
}

#[tokio::test]
async fn test_node_init() {
    let (server, console) = setup().await;

    Mock::given(method("POST"))
        .and(path("/node/n1/init"))
        .and(body_json(json!({
            "provider": "other",
            "zone": "z1",
            "firewall": true,
            "internal_interface": "eth1",
            "external_interface": "eth0",
            "host_network": "198.18.84.0/22",
            "block_gateway": "",
            "block_netmask": "",
            "block_subnets": []
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let setup = NodeInit {
        provider: "other".into(),
        zone: Some("z1".into()),
        firewall: true,
        internal_interface: "eth1".into(),
        external_interface: "eth0".into(),
        host_network: "198.18.84.0/22".into(),
        ..NodeInit::default()
    };
    console.actions::<Node>().init("n1", &setup).await.unwrap();
}

// ── Documents ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_subscription_activate_and_failed_update() {
    let (server, console) = setup().await;

    Mock::given(method("POST"))
        .and(path("/subscription"))
        .and(body_json(json!({"license": "LIC-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "plan": "enterprise",
            "quantity": 4
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscription/update"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let slot = console.subscription();
    slot.actions.activate("LIC-1").await.unwrap();
    let sub = slot.store.get().unwrap();
    assert!(sub.active);
    assert_eq!(sub.plan.as_deref(), Some("enterprise"));

    assert!(slot.actions.sync_update().await.is_err());
    assert_eq!(*slot.store.get().unwrap(), Subscription::default());
}

#[tokio::test]
async fn test_settings_sync_and_commit() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_admin_expire": 1440,
            "acme_provider": "letsencrypt"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let slot = console.settings();
    slot.actions.sync().await.unwrap();
    let mut settings = slot.store.get_mut().unwrap();
    assert_eq!(settings.auth_admin_expire, 1440);
    assert_eq!(settings.extra["acme_provider"], "letsencrypt");

    settings.auth_admin_expire = 60;
    slot.actions.commit(&settings).await.unwrap();
    assert_eq!(slot.store.get().unwrap().auth_admin_expire, 60);
}
