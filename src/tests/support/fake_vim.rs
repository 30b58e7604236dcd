//! In-memory inventory implementing [`VimApi`] for service tests.

use crate::core::{
    domain::{
        error::{VsphereError, VsphereResult},
        model::{AboutInfo, ManagedObjectReference, ServiceContent},
    },
    infrastructure::vim_api::VimApi,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Key = (ManagedObjectReference, String);

/// A recorded method call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub object: ManagedObjectReference,
    pub method: String,
    pub body: Value,
}

pub struct FakeVim {
    content: ServiceContent,
    /// Successive reads pop values until one is left.
    properties: Mutex<HashMap<Key, VecDeque<Value>>>,
    methods: Mutex<HashMap<Key, Result<Value, (u16, String)>>>,
    invocations: Mutex<Vec<Invocation>>,
    reads: Mutex<usize>,
}

pub fn moref(kind: &str, value: &str) -> ManagedObjectReference {
    ManagedObjectReference::new(kind, value)
}

pub fn root_folder() -> ManagedObjectReference {
    moref("Folder", "group-d1")
}

impl FakeVim {
    fn new(api_type: &str) -> Self {
        Self {
            content: ServiceContent {
                root_folder: root_folder(),
                about: AboutInfo {
                    full_name: format!("Fake {api_type}"),
                    api_type: api_type.to_string(),
                    api_version: "8.0.1.0".to_string(),
                },
            },
            properties: Mutex::new(HashMap::new()),
            methods: Mutex::new(HashMap::new()),
            invocations: Mutex::new(Vec::new()),
            reads: Mutex::new(0),
        }
    }

    /// A central manager endpoint.
    pub fn vcenter() -> Self {
        Self::new("VirtualCenter")
    }

    /// A standalone host endpoint.
    pub fn esxi() -> Self {
        Self::new("HostAgent")
    }

    pub fn set(&self, object: &ManagedObjectReference, property: &str, value: Value) {
        self.set_sequence(object, property, vec![value]);
    }

    pub fn set_sequence(&self, object: &ManagedObjectReference, property: &str, values: Vec<Value>) {
        self.properties
            .lock()
            .unwrap()
            .insert((object.clone(), property.to_string()), values.into());
    }

    pub fn push_child(&self, folder: &ManagedObjectReference, child: &ManagedObjectReference) {
        let mut properties = self.properties.lock().unwrap();
        let entry = properties
            .entry((folder.clone(), "childEntity".to_string()))
            .or_insert_with(|| VecDeque::from(vec![json!([])]));
        if let Some(Value::Array(children)) = entry.back_mut() {
            children.push(json!(child));
        }
    }

    pub fn on_invoke(&self, object: &ManagedObjectReference, method: &str, result: Value) {
        self.methods
            .lock()
            .unwrap()
            .insert((object.clone(), method.to_string()), Ok(result));
    }

    pub fn fail_invoke(&self, object: &ManagedObjectReference, method: &str, message: &str) {
        self.methods.lock().unwrap().insert(
            (object.clone(), method.to_string()),
            Err((500, message.to_string())),
        );
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocations_of(&self, method: &str) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    /// Number of remote calls of any kind.
    pub fn remote_calls(&self) -> usize {
        *self.reads.lock().unwrap() + self.invocations.lock().unwrap().len()
    }

    /// A datacenter named `name` under the root folder. Folder ids derive
    /// from `id` (`group-h-{id}`, `group-v-{id}`, `group-n-{id}`).
    pub fn add_datacenter(&self, id: &str, name: &str) -> ManagedObjectReference {
        let datacenter = moref("Datacenter", id);
        self.push_child(&root_folder(), &datacenter);
        self.set(&datacenter, "name", json!(name));
        for (property, prefix) in [
            ("hostFolder", "group-h"),
            ("vmFolder", "group-v"),
            ("networkFolder", "group-n"),
        ] {
            let folder = moref("Folder", &format!("{prefix}-{id}"));
            self.set(&datacenter, property, json!(folder));
            self.set(&folder, "childEntity", json!([]));
        }
        datacenter
    }

    pub fn folder_of(datacenter: &ManagedObjectReference, property: &str) -> ManagedObjectReference {
        let prefix = match property {
            "hostFolder" => "group-h",
            "vmFolder" => "group-v",
            _ => "group-n",
        };
        moref("Folder", &format!("{prefix}-{}", datacenter.value))
    }

    /// A cluster in the datacenter's host folder. Hosts are registered with
    /// a standard switch carrying no port groups; use [`Self::add_host`]
    /// afterwards to give them networks.
    pub fn add_cluster(
        &self,
        datacenter: &ManagedObjectReference,
        id: &str,
        name: &str,
        hosts: &[&str],
        effective_hosts: i32,
    ) -> ManagedObjectReference {
        let cluster = moref("ClusterComputeResource", id);
        self.push_child(&Self::folder_of(datacenter, "hostFolder"), &cluster);
        self.set(&cluster, "name", json!(name));
        let host_refs: Vec<ManagedObjectReference> =
            hosts.iter().map(|h| moref("HostSystem", h)).collect();
        self.set(&cluster, "host", json!(host_refs));
        self.set(&cluster, "resourcePool", json!(moref("ResourcePool", &format!("resgroup-{id}"))));
        self.set(&cluster, "environmentBrowser", json!(moref("EnvironmentBrowser", &format!("envbrowser-{id}"))));
        self.set(
            &cluster,
            "summary",
            json!({
                "_typeName": "ClusterComputeResourceSummary",
                "numHosts": hosts.len(),
                "numEffectiveHosts": effective_hosts
            }),
        );
        cluster
    }

    pub fn environment_browser(cluster: &ManagedObjectReference) -> ManagedObjectReference {
        moref("EnvironmentBrowser", &format!("envbrowser-{}", cluster.value))
    }

    /// Datastores offered by the cluster: `(name, free bytes, accessible)`.
    pub fn set_datastores(&self, cluster: &ManagedObjectReference, datastores: &[(&str, i64, bool)]) {
        let datastore: Vec<Value> = datastores
            .iter()
            .enumerate()
            .map(|(i, (name, free, accessible))| {
                json!({
                    "_typeName": "VirtualMachineDatastoreInfo",
                    "name": name,
                    "datastore": {
                        "_typeName": "DatastoreSummary",
                        "datastore": moref("Datastore", &format!("datastore-{}", i + 1)),
                        "name": name,
                        "freeSpace": free,
                        "capacity": free * 2,
                        "accessible": accessible
                    }
                })
            })
            .collect();
        self.on_invoke(
            &Self::environment_browser(cluster),
            "QueryConfigTarget",
            json!({"_typeName": "ConfigTarget", "datastore": datastore, "network": []}),
        );
    }

    /// Host properties: name, network config with standard port groups
    /// `(name, vlan)`, DNS identity and a certificate.
    pub fn add_host(&self, id: &str, name: &str, portgroups: &[(&str, i32)]) -> ManagedObjectReference {
        let host = moref("HostSystem", id);
        self.set(&host, "name", json!(name));
        let portgroup: Vec<Value> = portgroups
            .iter()
            .map(|(pg, vlan)| {
                json!({
                    "_typeName": "HostPortGroup",
                    "key": format!("key-vim.host.PortGroup-{pg}"),
                    "spec": {"name": pg, "vlanId": vlan, "vswitchName": "vSwitch0"}
                })
            })
            .collect();
        self.set(
            &host,
            "config",
            json!({
                "_typeName": "HostConfigInfo",
                "certificate": TEST_CERTIFICATE.as_bytes(),
                "network": {
                    "portgroup": portgroup,
                    "vnic": [{"device": "vmk0", "spec": {"ip": {"dhcp": false, "ipAddress": "172.16.0.79"}}}],
                    "dnsConfig": {"hostName": name, "domainName": "event.dreamhack.se"}
                }
            }),
        );
        host
    }

    /// A distributed switch in the datacenter's network folder with member
    /// port groups `(key, name, vlan spec)`.
    pub fn add_switch(
        &self,
        datacenter: &ManagedObjectReference,
        id: &str,
        name: &str,
        num_ports: i32,
        portgroups: &[(&str, &str, Value)],
    ) -> ManagedObjectReference {
        let switch = moref("VmwareDistributedVirtualSwitch", id);
        let network_folder = Self::folder_of(datacenter, "networkFolder");
        self.push_child(&network_folder, &switch);
        self.set(&switch, "uuid", json!(format!("uuid-{id}")));
        self.set(
            &switch,
            "summary",
            json!({"_typeName": "DVSSummary", "name": name, "uuid": format!("uuid-{id}"), "numPorts": num_ports}),
        );
        self.set(
            &switch,
            "config",
            json!({"_typeName": "VMwareDVSConfigInfo", "name": name, "configVersion": "3"}),
        );
        let mut members = Vec::new();
        for (key, pg_name, vlan) in portgroups {
            let portgroup = moref("DistributedVirtualPortgroup", key);
            self.push_child(&network_folder, &portgroup);
            self.set(
                &portgroup,
                "config",
                json!({
                    "_typeName": "DVPortgroupConfigInfo",
                    "key": key,
                    "name": pg_name,
                    "defaultPortConfig": {"_typeName": "VMwareDVSPortSetting", "vlan": vlan}
                }),
            );
            members.push(portgroup);
        }
        self.set(&switch, "portgroup", json!(members));
        switch
    }

    /// A task whose `info` walks through `states`; the last one sticks.
    pub fn add_task(&self, id: &str, states: Vec<Value>) -> ManagedObjectReference {
        let task = moref("Task", id);
        self.set_sequence(&task, "info", states);
        task
    }
}

/// `VmwareDistributedVirtualSwitchVlanIdSpec` for a plain VLAN id.
pub fn vlan_spec(vlan: u16) -> Value {
    json!({"_typeName": "VmwareDistributedVirtualSwitchVlanIdSpec", "inherited": false, "vlanId": vlan})
}

/// A trunk range spec.
pub fn trunk_spec() -> Value {
    json!({
        "_typeName": "VmwareDistributedVirtualSwitchTrunkVlanSpec",
        "inherited": false,
        "vlanId": [{"_typeName": "NumericRange", "start": 0, "end": 4094}]
    })
}

pub fn task_success(result: Option<&ManagedObjectReference>) -> Value {
    match result {
        Some(reference) => json!({"_typeName": "TaskInfo", "state": "success", "result": reference}),
        None => json!({"_typeName": "TaskInfo", "state": "success"}),
    }
}

pub fn task_error(message: &str) -> Value {
    json!({
        "_typeName": "TaskInfo",
        "state": "error",
        "error": {"_typeName": "LocalizedMethodFault", "fault": {"_typeName": "SystemError"}, "localizedMessage": message}
    })
}

pub fn task_state(state: &str) -> Value {
    json!({"_typeName": "TaskInfo", "state": state})
}

pub const TEST_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIUVGVzdA==\n-----END CERTIFICATE-----\n";

#[async_trait]
impl VimApi for FakeVim {
    async fn service_content(&self) -> VsphereResult<ServiceContent> {
        *self.reads.lock().unwrap() += 1;
        Ok(self.content.clone())
    }

    async fn retrieve_property(
        &self,
        object: &ManagedObjectReference,
        property: &str,
    ) -> VsphereResult<Value> {
        *self.reads.lock().unwrap() += 1;
        let mut properties = self.properties.lock().unwrap();
        let Some(values) = properties.get_mut(&(object.clone(), property.to_string())) else {
            return Ok(Value::Null);
        };
        if values.len() > 1 {
            Ok(values.pop_front().unwrap_or(Value::Null))
        } else {
            Ok(values.front().cloned().unwrap_or(Value::Null))
        }
    }

    async fn invoke(
        &self,
        object: &ManagedObjectReference,
        method: &str,
        body: Value,
    ) -> VsphereResult<Value> {
        self.invocations.lock().unwrap().push(Invocation {
            object: object.clone(),
            method: method.to_string(),
            body,
        });
        match self
            .methods
            .lock()
            .unwrap()
            .get(&(object.clone(), method.to_string()))
        {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err((status, message))) => Err(VsphereError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Err(VsphereError::Api {
                status: 500,
                message: format!("MethodNotFound: {method} on {object}"),
            }),
        }
    }
}
