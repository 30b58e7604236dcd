use crate::tests::support::fake_vim::{task_error, task_success, trunk_spec};
use crate::tests::support::vi_server::{ViServer, mo};
use crate::{DEFAULT_UPLINKS, DrsBehavior, OperationError, VlanId, VsphereError};
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

/// Datacenter "event" with cluster "POP" holding host esx1 and an
/// initialized switch "DVS-POP" that only has its uplink port group.
async fn mount_event(vi: &ViServer) {
    vi.service_content("VirtualCenter").await;
    vi.datacenter("datacenter-3", "event", 3).await;

    let cluster = mo("ClusterComputeResource", "domain-c7");
    let host = mo("HostSystem", "host-10");
    vi.children(&mo("Folder", "group-h3"), std::slice::from_ref(&cluster))
        .await;
    vi.property(&cluster, "name", json!("POP")).await;
    vi.property(&cluster, "host", json!([host])).await;
    vi.property(&cluster, "summary", json!({"numEffectiveHosts": 1}))
        .await;
    vi.property(&cluster, "resourcePool", json!(mo("ResourcePool", "resgroup-8")))
        .await;
    vi.property(&cluster, "environmentBrowser", json!(null)).await;
    vi.property(&host, "name", json!("esx1.event.dreamhack.se")).await;

    let switch = mo("VmwareDistributedVirtualSwitch", "dvs-21");
    let uplinks = mo("DistributedVirtualPortgroup", "dvportgroup-30");
    vi.children(&mo("Folder", "group-n3"), &[switch.clone(), uplinks.clone()])
        .await;
    vi.property(
        &switch,
        "summary",
        json!({"_typeName": "DVSSummary", "name": "DVS-POP", "uuid": "50 2a 7d 21", "numPorts": 8}),
    )
    .await;
    vi.property(&switch, "portgroup", json!([uplinks])).await;
    vi.property(
        &switch,
        "config",
        json!({"_typeName": "VMwareDVSConfigInfo", "name": "DVS-POP", "configVersion": "7"}),
    )
    .await;
    vi.property(
        &uplinks,
        "config",
        json!({
            "_typeName": "DVPortgroupConfigInfo",
            "key": "dvportgroup-30",
            "name": "DVS-POP-DVUplinks-21",
            "defaultPortConfig": {"_typeName": "VMwareDVSPortSetting", "vlan": trunk_spec()}
        }),
    )
    .await;
}

#[tokio::test]
async fn test_existing_datacenter_is_reused() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    Mock::given(method("POST"))
        .and(path("/sdk/vim25/8.0.1.0/Folder/group-d1/CreateDatacenter"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&vi.server)
        .await;

    let client = vi.client().await;
    let datacenter = client.get_or_create_datacenter("event").await.unwrap();
    assert_eq!(datacenter, mo("Datacenter", "datacenter-3"));
}

#[tokio::test]
async fn test_missing_datacenter_is_created() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    vi.method(
        &mo("Folder", "group-d1"),
        "CreateDatacenter",
        json!({"name": "lab"}),
        json!(mo("Datacenter", "datacenter-9")),
    )
    .await;

    let client = vi.client().await;
    let datacenter = client.get_or_create_datacenter("lab").await.unwrap();
    assert_eq!(datacenter, mo("Datacenter", "datacenter-9"));
}

#[tokio::test]
async fn test_missing_cluster_is_created_with_drs() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    vi.method(
        &mo("Folder", "group-h3"),
        "CreateClusterEx",
        json!({
            "name": "Servers",
            "spec": {
                "_typeName": "ClusterConfigSpecEx",
                "drsConfig": {"enabled": true, "defaultVmBehavior": "partiallyAutomated"}
            }
        }),
        json!(mo("ClusterComputeResource", "domain-c12")),
    )
    .await;

    let client = vi.client().await;
    let cluster = client
        .get_or_create_cluster(None, "Servers", DrsBehavior::PartiallyAutomated)
        .await
        .unwrap();
    assert_eq!(cluster, mo("ClusterComputeResource", "domain-c12"));

    let existing = client
        .get_or_create_cluster(Some("event"), "POP", DrsBehavior::default())
        .await
        .unwrap();
    assert_eq!(existing, mo("ClusterComputeResource", "domain-c7"));
}

#[tokio::test]
async fn test_cluster_fault_is_create_cluster_error() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    Mock::given(method("POST"))
        .and(path("/sdk/vim25/8.0.1.0/Folder/group-h3/CreateClusterEx"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "_typeName": "InvalidName",
            "name": "bad/name"
        })))
        .mount(&vi.server)
        .await;

    let client = vi.client().await;
    let err = client
        .get_or_create_cluster(None, "bad/name", DrsBehavior::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VsphereError::Operation(OperationError::CreateCluster(ref message)) if message == "InvalidName"
    ));
}

#[tokio::test]
async fn test_create_distributed_switch() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi
        .task(
            "task-201",
            &[task_success(Some(&mo("VmwareDistributedVirtualSwitch", "dvs-40")))],
        )
        .await;
    vi.method(
        &mo("Folder", "group-n3"),
        "CreateDVS_Task",
        json!({
            "spec": {
                "configSpec": {
                    "name": "DVS-LAN",
                    "uplinkPortPolicy": {"uplinkPortName": ["Uplink1", "Uplink2"]}
                }
            }
        }),
        json!(task),
    )
    .await;

    let client = vi.client().await;
    let switch = client
        .create_distributed_switch(None, "DVS-LAN", DEFAULT_UPLINKS)
        .await
        .unwrap();
    assert_eq!(switch, mo("VmwareDistributedVirtualSwitch", "dvs-40"));
}

#[tokio::test]
async fn test_create_port_groups_skips_untagged() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi.task("task-202", &[task_success(None)]).await;
    vi.method(
        &mo("VmwareDistributedVirtualSwitch", "dvs-21"),
        "AddDVPortgroup_Task",
        json!({
            "spec": [
                {
                    "name": "100: Servers",
                    "type": "earlyBinding",
                    "defaultPortConfig": {"vlan": {"vlanId": 100, "inherited": false}}
                },
                {
                    "name": "921: Deploy",
                    "defaultPortConfig": {"vlan": {"vlanId": 921}}
                }
            ]
        }),
        json!(task),
    )
    .await;

    let port_groups = BTreeMap::from([
        ("100: Servers".to_string(), Some(VlanId::new(100).unwrap())),
        ("921: Deploy".to_string(), Some(VlanId::new(921).unwrap())),
        ("Management".to_string(), None),
    ]);
    let client = vi.client().await;
    client
        .create_port_groups(None, "DVS-POP", &port_groups)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_port_groups_on_unknown_switch() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;

    let port_groups = BTreeMap::from([("100: Servers".to_string(), Some(VlanId::new(100).unwrap()))]);
    let client = vi.client().await;
    let err = client
        .create_port_groups(None, "DVS-LAN", &port_groups)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VsphereError::Operation(OperationError::CreateDvSwitch(ref message))
            if message == "Switch DVS-LAN not found"
    ));
}

#[tokio::test]
async fn test_add_host_uplink_to_switch() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi.task("task-203", &[task_success(None)]).await;
    vi.method(
        &mo("VmwareDistributedVirtualSwitch", "dvs-21"),
        "ReconfigureDvs_Task",
        json!({
            "spec": {
                "configVersion": "7",
                "host": [{
                    "operation": "add",
                    "host": {"type": "HostSystem", "value": "host-10"},
                    "backing": {"pnicSpec": [{"pnicDevice": "vmnic1"}]}
                }]
            }
        }),
        json!(task),
    )
    .await;

    let client = vi.client().await;
    client
        .add_host_uplink_to_switch(None, "esx1.event.dreamhack.se", "DVS-POP", "vmnic1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_uplink_task_failure() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi
        .task("task-204", &[task_error("The resource 'vmnic1' is in use.")])
        .await;
    vi.method(
        &mo("VmwareDistributedVirtualSwitch", "dvs-21"),
        "ReconfigureDvs_Task",
        json!({}),
        json!(task),
    )
    .await;

    let client = vi.client().await;
    let err = client
        .add_host_uplink_to_switch(None, "esx1.event.dreamhack.se", "DVS-POP", "vmnic1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        VsphereError::Operation(OperationError::CreateDvSwitch(ref message))
            if message == "The resource 'vmnic1' is in use."
    ));
}
