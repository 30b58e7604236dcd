use crate::tests::support::fake_vim::{TEST_CERTIFICATE, task_success};
use crate::tests::support::vi_server::{ViServer, mo};
use crate::{
    ApplianceSettings, LookupError, SslThumbprint, VcsaInstallParams, VlanId, VsphereError,
};
use serde_json::{Value, json};

const GIB: i64 = 1024 * 1024 * 1024;

fn host_config(dns: Value) -> Value {
    json!({
        "_typeName": "HostConfigInfo",
        "certificate": TEST_CERTIFICATE.as_bytes(),
        "network": {
            "_typeName": "HostNetworkInfo",
            "portgroup": [
                {"_typeName": "HostPortGroup", "spec": {"name": "VM Network", "vlanId": 0, "vswitchName": "vSwitch0"}},
                {"_typeName": "HostPortGroup", "spec": {"name": "921: Deploy", "vlanId": 921, "vswitchName": "vSwitch0"}}
            ],
            "vnic": [{"device": "vmk0", "spec": {"ip": {"dhcp": false, "ipAddress": "172.16.0.79"}}}],
            "dnsConfig": dns
        }
    })
}

/// A standalone host endpoint with one local datastore.
async fn mount_standalone(vi: &ViServer, dns: Value) {
    vi.service_content("HostAgent").await;
    vi.datacenter("ha-datacenter", "ha-datacenter", 1).await;

    let compute = mo("ComputeResource", "ha-compute-res");
    let host = mo("HostSystem", "ha-host");
    vi.children(&mo("Folder", "group-h1"), std::slice::from_ref(&compute))
        .await;
    vi.property(&compute, "host", json!([host])).await;
    vi.property(&compute, "name", json!("esx1")).await;
    vi.property(&compute, "summary", json!({"numHosts": 1, "numEffectiveHosts": 1}))
        .await;
    vi.property(&compute, "resourcePool", json!(mo("ResourcePool", "ha-root-pool")))
        .await;
    vi.property(&compute, "environmentBrowser", json!(mo("EnvironmentBrowser", "ha-env-browser")))
        .await;
    vi.property(&host, "config", host_config(dns)).await;
    vi.answer(
        &mo("EnvironmentBrowser", "ha-env-browser"),
        "QueryConfigTarget",
        json!({
            "_typeName": "ConfigTarget",
            "datastore": [{
                "_typeName": "VirtualMachineDatastoreInfo",
                "name": "datastore1",
                "datastore": {
                    "_typeName": "DatastoreSummary",
                    "datastore": mo("Datastore", "datastore1"),
                    "name": "datastore1",
                    "freeSpace": 300 * GIB,
                    "capacity": 500 * GIB,
                    "accessible": true
                }
            }]
        }),
    )
    .await;
}

fn dns() -> Value {
    json!({"_typeName": "HostDnsConfig", "hostName": "esx1", "domainName": "event.dreamhack.se"})
}

#[tokio::test]
async fn test_host_identity() {
    let vi = ViServer::start().await;
    mount_standalone(&vi, dns()).await;

    let client = vi.client().await;
    let identity = client.host_identity().await.unwrap();

    assert_eq!(identity.fqdn, "esx1.event.dreamhack.se");
    assert_eq!(identity.management_ip, "172.16.0.79");
    assert_eq!(
        identity.thumbprint,
        SslThumbprint::from_pem(TEST_CERTIFICATE.as_bytes()).unwrap()
    );
}

#[tokio::test]
async fn test_host_without_dns() {
    let vi = ViServer::start().await;
    mount_standalone(&vi, Value::Null).await;

    let client = vi.client().await;
    let err = client.host_identity().await.unwrap_err();
    assert!(matches!(
        err,
        VsphereError::Lookup(LookupError::HostIdentityIncomplete { missing: "DNS configuration", .. })
    ));
}

#[tokio::test]
async fn test_enroll_host_into_cluster() {
    let esxi = ViServer::start().await;
    mount_standalone(&esxi, dns()).await;
    let enrollment = esxi.client().await.host_enrollment().await.unwrap();

    let vcenter = ViServer::start().await;
    let cluster = mo("ClusterComputeResource", "domain-c7");
    let task = vcenter
        .task("task-301", &[task_success(Some(&mo("HostSystem", "host-50")))])
        .await;
    vcenter
        .method(
            &cluster,
            "AddHost_Task",
            json!({
                "spec": {
                    "hostName": "esx1.event.dreamhack.se",
                    "userName": "administrator@vsphere.local",
                    "password": "secret",
                    "force": true
                },
                "asConnected": true
            }),
            json!(task),
        )
        .await;

    let host = vcenter
        .client()
        .await
        .add_host_to_cluster(&cluster, &enrollment)
        .await
        .unwrap();
    assert_eq!(host, mo("HostSystem", "host-50"));
}

fn appliance() -> ApplianceSettings {
    ApplianceSettings {
        name: "vcenter".to_string(),
        ip: "172.16.0.10".to_string(),
        prefix: "24".to_string(),
        gateway: "172.16.0.1".to_string(),
        password: "VMware1!".to_string(),
        sso_domain: "vsphere.local".to_string(),
    }
}

#[tokio::test]
async fn test_vcsa_install_config() {
    let vi = ViServer::start().await;
    mount_standalone(&vi, dns()).await;

    let params = VcsaInstallParams {
        appliance: appliance(),
        vlan: VlanId::new(921).unwrap(),
        datastore: None,
        datacenter: None,
    };
    let config = vi.client().await.vcsa_install_config(&params).await.unwrap();
    let rendered: Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

    let esxi = &rendered["new.vcsa"]["esxi"];
    assert_eq!(esxi["hostname"], "172.16.0.79");
    assert_eq!(esxi["username"], "administrator@vsphere.local");
    assert_eq!(esxi["deployment.network"], "921: Deploy");
    assert_eq!(esxi["datastore"], "datastore1");
}

#[tokio::test]
async fn test_vcsa_install_config_unknown_vlan() {
    let vi = ViServer::start().await;
    mount_standalone(&vi, dns()).await;

    let params = VcsaInstallParams {
        appliance: appliance(),
        vlan: VlanId::new(999).unwrap(),
        datastore: None,
        datacenter: None,
    };
    let err = vi.client().await.vcsa_install_config(&params).await.unwrap_err();
    assert!(matches!(err, VsphereError::Lookup(LookupError::UnknownVlan(999))));
}
