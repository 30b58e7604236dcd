use crate::tests::support::fake_vim::{task_error, task_state, task_success, trunk_spec, vlan_spec};
use crate::tests::support::vi_server::{ViServer, mo, object_path};
use crate::{CreateVmParams, LookupError, OperationError, VlanId, VsphereError};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

const GIB: i64 = 1024 * 1024 * 1024;

/// Datacenter "event" with cluster "POP" (one host), two datastores and a
/// distributed switch carrying VLAN 100.
async fn mount_event(vi: &ViServer) {
    vi.service_content("VirtualCenter").await;
    vi.datacenter("datacenter-3", "event", 3).await;

    let cluster = mo("ClusterComputeResource", "domain-c7");
    vi.children(&mo("Folder", "group-h3"), std::slice::from_ref(&cluster))
        .await;
    vi.property(
        &cluster,
        "summary",
        json!({"_typeName": "ClusterComputeResourceSummary", "numHosts": 1, "numEffectiveHosts": 1}),
    )
    .await;
    vi.property(&cluster, "name", json!("POP")).await;
    vi.property(&cluster, "host", json!([mo("HostSystem", "host-10")]))
        .await;
    vi.property(&cluster, "resourcePool", json!(mo("ResourcePool", "resgroup-8")))
        .await;
    vi.property(
        &cluster,
        "environmentBrowser",
        json!(mo("EnvironmentBrowser", "envbrowser-7")),
    )
    .await;
    vi.answer(
        &mo("EnvironmentBrowser", "envbrowser-7"),
        "QueryConfigTarget",
        json!({
            "_typeName": "ConfigTarget",
            "datastore": [
                datastore_info("datastore-11", "ds1", 100 * GIB),
                datastore_info("datastore-12", "ds2", 10 * GIB)
            ]
        }),
    )
    .await;

    let switch = mo("VmwareDistributedVirtualSwitch", "dvs-21");
    let uplinks = mo("DistributedVirtualPortgroup", "dvportgroup-30");
    let servers = mo("DistributedVirtualPortgroup", "dvportgroup-42");
    vi.children(
        &mo("Folder", "group-n3"),
        &[switch.clone(), uplinks.clone(), servers.clone()],
    )
    .await;
    vi.property(
        &switch,
        "summary",
        json!({"_typeName": "DVSSummary", "name": "DVS-POP", "uuid": "50 2a 7d 21", "numPorts": 128}),
    )
    .await;
    vi.property(&switch, "portgroup", json!([uplinks, servers])).await;
    vi.property(&uplinks, "config", portgroup("dvportgroup-30", "DVS-POP-DVUplinks-21", trunk_spec()))
        .await;
    vi.property(&servers, "config", portgroup("dvportgroup-42", "100: Servers", vlan_spec(100)))
        .await;
}

fn datastore_info(id: &str, name: &str, free: i64) -> serde_json::Value {
    json!({
        "_typeName": "VirtualMachineDatastoreInfo",
        "name": name,
        "datastore": {
            "_typeName": "DatastoreSummary",
            "datastore": mo("Datastore", id),
            "name": name,
            "freeSpace": free,
            "capacity": free * 4,
            "accessible": true
        }
    })
}

fn portgroup(key: &str, name: &str, vlan: serde_json::Value) -> serde_json::Value {
    json!({
        "_typeName": "DVPortgroupConfigInfo",
        "key": key,
        "name": name,
        "defaultPortConfig": {"_typeName": "VMwareDVSPortSetting", "vlan": vlan}
    })
}

#[tokio::test]
async fn test_create_vm_on_distributed_switch() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi
        .task(
            "task-101",
            &[task_state("queued"), task_state("running"), task_success(Some(&mo("VirtualMachine", "vm-55")))],
        )
        .await;
    vi.method(
        &mo("Folder", "group-v3"),
        "CreateVM_Task",
        json!({
            "config": {
                "name": "web01",
                "numCPUs": 2,
                "memoryMB": 2048,
                "guestId": "debian10_64Guest",
                "files": {"vmPathName": "[ds1]"}
            },
            "pool": {"type": "ResourcePool", "value": "resgroup-8"}
        }),
        json!(task),
    )
    .await;

    let client = vi.client().await;
    let params = CreateVmParams::new("web01", VlanId::new(100).unwrap())
        .num_cpus(2)
        .memory(2 * GIB as u64);
    let vm = client.create_vm(&params).await.unwrap();

    assert_eq!(vm, mo("VirtualMachine", "vm-55"));
}

#[tokio::test]
async fn test_create_vm_task_failure() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let task = vi
        .task("task-102", &[task_error("Insufficient disk space on datastore 'ds1'.")])
        .await;
    vi.method(&mo("Folder", "group-v3"), "CreateVM_Task", json!({}), json!(task))
        .await;

    let client = vi.client().await;
    let err = client
        .create_vm(&CreateVmParams::new("web01", VlanId::new(100).unwrap()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VsphereError::Operation(OperationError::CreateVm(ref message))
            if message.contains("Insufficient disk space")
    ));
}

#[tokio::test]
async fn test_create_vm_unknown_vlan_submits_nothing() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    Mock::given(method("POST"))
        .and(path(object_path(&mo("Folder", "group-v3"), "CreateVM_Task")))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&vi.server)
        .await;

    let client = vi.client().await;
    let err = client
        .create_vm(&CreateVmParams::new("web01", VlanId::new(200).unwrap()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VsphereError::Lookup(LookupError::SwitchPortNotFound(_))
    ));
}

#[tokio::test]
async fn test_reconfigure_vm_network() {
    let vi = ViServer::start().await;
    mount_event(&vi).await;
    let vm = mo("VirtualMachine", "vm-55");
    vi.property(
        &vm,
        "config",
        json!({
            "_typeName": "VirtualMachineConfigInfo",
            "name": "web01",
            "hardware": {
                "_typeName": "VirtualHardware",
                "numCPU": 2,
                "device": [
                    {"_typeName": "VirtualIDEController", "key": 200},
                    {
                        "_typeName": "VirtualVmxnet3",
                        "key": 4000,
                        "addressType": "assigned",
                        "macAddress": "00:50:56:aa:bb:cc",
                        "backing": {"_typeName": "VirtualEthernetCardNetworkBackingInfo", "deviceName": "VM Network"}
                    }
                ]
            }
        }),
    )
    .await;
    let task = vi.task("task-103", &[task_success(None)]).await;
    vi.method(
        &vm,
        "ReconfigVM_Task",
        json!({
            "spec": {
                "deviceChange": [{
                    "operation": "edit",
                    "device": {
                        "_typeName": "VirtualVmxnet3",
                        "key": 4000,
                        "macAddress": "00:50:56:aa:bb:cc",
                        "backing": {
                            "_typeName": "VirtualEthernetCardDistributedVirtualPortBackingInfo",
                            "port": {"switchUuid": "50 2a 7d 21", "portgroupKey": "dvportgroup-42"}
                        }
                    }
                }]
            }
        }),
        json!(task),
    )
    .await;

    let client = vi.client().await;
    client
        .reconfigure_vm_network(&vm, VlanId::new(100).unwrap(), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_power_on_and_wait() {
    let vi = ViServer::start().await;
    let vm = mo("VirtualMachine", "vm-55");
    let task = vi
        .task("task-104", &[task_state("running"), task_success(None)])
        .await;
    vi.method(&vm, "PowerOnVM_Task", json!({}), json!(task)).await;

    let client = vi.client().await;
    let handle = client.power_on(&vm).await.unwrap();
    assert_eq!(handle.id(), "task-104");

    let outcome = client.wait_for_task(&handle).await.unwrap();
    assert_eq!(outcome, crate::TaskOutcome::Success(None));
}

#[tokio::test]
async fn test_find_vm_by_name_in_nested_folder() {
    let vi = ViServer::start().await;
    vi.service_content("VirtualCenter").await;
    vi.datacenter("datacenter-3", "event", 3).await;
    let servers = mo("Folder", "group-v50");
    vi.children(
        &mo("Folder", "group-v3"),
        &[mo("VirtualMachine", "vm-54"), servers.clone()],
    )
    .await;
    vi.children(&servers, &[mo("VirtualMachine", "vm-55")]).await;
    vi.property(&mo("VirtualMachine", "vm-54"), "name", json!("db01"))
        .await;
    vi.property(&mo("VirtualMachine", "vm-55"), "name", json!("web01"))
        .await;

    let client = vi.client().await;
    assert_eq!(
        client.find_vm_by_name("web01", None).await.unwrap(),
        Some(mo("VirtualMachine", "vm-55"))
    );
    assert_eq!(client.find_vm_by_name("mail01", None).await.unwrap(), None);
}
