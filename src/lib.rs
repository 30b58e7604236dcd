mod auth;
mod core;
mod provision;


pub use crate::core::domain::error::{
    LookupError, OperationError, ProfileError, ValidationError, VsphereError, VsphereResult,
};
pub use crate::core::domain::model::{
    ClientConfig, DEFAULT_API_RELEASE, HardwareVersions, HostEnrollment, ManagedObjectReference,
    RateLimitConfig, TaskHandle, TaskOutcome, VsphereConnection,
    cluster::DrsBehavior,
    device::DiskProvisioning,
    vcsa_install::{ApplianceSettings, VcsaInstallConfig},
};
pub use crate::core::domain::value_object::{SslThumbprint, VlanId, VsphereSessionId};
pub use crate::core::domain::{model, value_object};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    vim_api::{VimApi, call, property},
};
pub use crate::provision::application::request::{
    create_vm_request::CreateVmParams, vcsa_install_request::VcsaInstallParams,
};
pub use crate::provision::application::service::{
    datastore_selector::{DatastoreSelector, SelectedDatastore},
    host_identity_service::{HostIdentity, HostIdentityService},
    network_backing_resolver::NetworkBackingResolver,
    task_orchestrator::TaskOrchestrator,
    topology_service::{InventoryOrder, TopologyService},
    vcsa_install_service::VcsaInstallService,
    vm_lifecycle_service::{DEFAULT_UPLINKS, VmLifecycleService},
    vm_spec_builder::VmSpecBuilder,
};

use crate::{
    auth::application::service::{login_service::LoginService, logout_service::LogoutService},
    core::domain::value_object::{
        DEFAULT_PORT, VsphereHost, VspherePassword, VspherePort, VsphereUrl, VsphereUsername,
        validate_host, validate_password, validate_port, validate_username,
    },
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A client for provisioning VMs, hosts and distributed switches on a
/// vCenter Server or a standalone ESXi host.
///
/// One client holds one session. Every operation runs its lookups and its
/// remote task in order; independent operations may run concurrently on
/// separate clients.
///
/// # Examples
///
/// ```no_run
/// use vsphere_provision::{CreateVmParams, VlanId, VsphereClient, VsphereResult};
///
/// #[tokio::main]
/// async fn main() -> VsphereResult<()> {
///     let client = VsphereClient::builder()
///         .host("vcenter.example.com")
///         .credentials("administrator@vsphere.local", "password")
///         .build()
///         .await?;
///
///     client.login().await?;
///     let vm = client
///         .create_vm(&CreateVmParams::new("web01", VlanId::new(100)?))
///         .await?;
///     client.power_on(&vm).await?;
///     client.logout().await
/// }
/// ```
pub struct VsphereClient {
    api_client: Arc<ApiClient>,
    config: ClientConfig,
    topology: TopologyService,
    lifecycle: VmLifecycleService,
}

impl std::fmt::Debug for VsphereClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VsphereClient")
            .field("url", &self.api_client.connection().url())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for VsphereClient configuration
#[derive(Debug)]
pub struct VsphereClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    secure: bool,
    accept_invalid_certs: bool,
    config: ClientConfig,
}

impl Default for VsphereClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            secure: true,
            accept_invalid_certs: false,
            config: ClientConfig::default(),
        }
    }
}

fn required(field: &str, value: Option<String>) -> VsphereResult<String> {
    value.ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: format!("{} is required", capitalize(field)),
        }
        .into()
    })
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl VsphereClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Defaults to 443.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Use HTTPS. On by default.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Accept self-signed certificates, as freshly installed hosts present.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates every parameter and builds an unauthenticated client.
    pub async fn build(self) -> VsphereResult<VsphereClient> {
        self.config.validate()?;

        let host = required("host", self.host)?;
        validate_host(&host)?;
        let host = VsphereHost::new_unchecked(host);

        let port = self.port.unwrap_or(DEFAULT_PORT);
        validate_port(port)?;
        let port = VspherePort::new_unchecked(port);

        let username = required("username", self.username)?;
        validate_username(&username)?;
        let password = required("password", self.password)?;
        validate_password(&password)?;

        let url = VsphereUrl::from_parts(&host, &port, self.secure, &self.config.api_release)?;
        let connection = VsphereConnection::new(
            host,
            port,
            VsphereUsername::new_unchecked(username),
            VspherePassword::new_unchecked(password),
            self.secure,
            self.accept_invalid_certs,
            url,
        );
        let api_client = Arc::new(ApiClient::new(connection, &self.config)?);
        Ok(VsphereClient::from_api_client(api_client, self.config))
    }
}

impl VsphereClient {
    /// Creates a new builder for VsphereClient configuration
    pub fn builder() -> VsphereClientBuilder {
        VsphereClientBuilder::default()
    }

    fn from_api_client(api_client: Arc<ApiClient>, config: ClientConfig) -> Self {
        let api: Arc<dyn VimApi> = api_client.clone();
        let topology = TopologyService::new(api);
        Self {
            lifecycle: VmLifecycleService::new(topology.clone(), &config),
            topology,
            api_client,
            config,
        }
    }

    /// Sorts every inventory listing with `order` before "first" is taken.
    #[must_use]
    pub fn with_inventory_order<F>(mut self, order: F) -> Self
    where
        F: Fn(&ManagedObjectReference, &ManagedObjectReference) -> Ordering + Send + Sync + 'static,
    {
        self.topology = self.topology.with_order(order);
        self.lifecycle = VmLifecycleService::new(self.topology.clone(), &self.config);
        self
    }

    /// Opens a session. Every other call requires one.
    ///
    /// # Errors
    ///
    /// - `VsphereError::Authentication` for rejected credentials
    /// - `VsphereError::Connection` when the endpoint is unreachable or does
    ///   not speak VI/JSON
    pub async fn login(&self) -> VsphereResult<()> {
        let session = LoginService::new()
            .execute(self.api_client.connection())
            .await?;
        self.api_client.set_session(session).await;
        Ok(())
    }

    /// Closes the session. A client that is not logged in does nothing.
    pub async fn logout(&self) -> VsphereResult<()> {
        LogoutService.execute(&self.api_client).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.api_client.is_authenticated().await
    }

    /// Returns the current session token if authenticated
    pub async fn session_id(&self) -> Option<VsphereSessionId> {
        self.api_client.session().await
    }

    pub fn connection(&self) -> &VsphereConnection {
        self.api_client.connection()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Read-only inventory queries.
    pub fn topology(&self) -> &TopologyService {
        &self.topology
    }

    /// Creates a VM and returns it. The VM is left powered off.
    pub async fn create_vm(&self, params: &CreateVmParams) -> VsphereResult<ManagedObjectReference> {
        self.lifecycle.create_vm(params).await
    }

    /// Moves the VM's first NIC to the network carrying `vlan`, looked up in
    /// `datacenter` or the first datacenter.
    pub async fn reconfigure_vm_network(
        &self,
        vm: &ManagedObjectReference,
        vlan: VlanId,
        datacenter: Option<&str>,
    ) -> VsphereResult<()> {
        self.lifecycle
            .reconfigure_vm_network(vm, vlan, datacenter)
            .await
    }

    /// Starts the VM and returns the power-on task without waiting for it.
    pub async fn power_on(&self, vm: &ManagedObjectReference) -> VsphereResult<TaskHandle> {
        self.lifecycle.power_on(vm).await
    }

    /// Waits for a task returned by an earlier call.
    pub async fn wait_for_task(&self, task: &TaskHandle) -> VsphereResult<TaskOutcome> {
        self.lifecycle.tasks().wait(task).await
    }

    pub async fn find_vm_by_name(
        &self,
        name: &str,
        datacenter: Option<&str>,
    ) -> VsphereResult<Option<ManagedObjectReference>> {
        self.lifecycle.find_vm_by_name(name, datacenter).await
    }

    /// FQDN, management address and certificate thumbprint of the host this
    /// client is connected to.
    pub async fn host_identity(&self) -> VsphereResult<HostIdentity> {
        HostIdentityService::new(self.topology.clone())
            .identify()
            .await
    }

    /// Enrollment data for the host this client is connected to, using this
    /// client's credentials. Pass it to
    /// [`VsphereClient::add_host_to_cluster`] on a vCenter client.
    pub async fn host_enrollment(&self) -> VsphereResult<HostEnrollment> {
        let connection = self.api_client.connection();
        let enrollment = self.host_identity().await?.enrollment(
            connection.username().as_str(),
            connection.password().as_str(),
        )?;
        Ok(enrollment)
    }

    pub async fn add_host_to_cluster(
        &self,
        cluster: &ManagedObjectReference,
        enrollment: &HostEnrollment,
    ) -> VsphereResult<ManagedObjectReference> {
        self.lifecycle.add_host_to_cluster(cluster, enrollment).await
    }

    pub async fn get_or_create_datacenter(&self, name: &str) -> VsphereResult<ManagedObjectReference> {
        self.lifecycle.get_or_create_datacenter(name).await
    }

    pub async fn get_or_create_cluster(
        &self,
        datacenter: Option<&str>,
        name: &str,
        drs: DrsBehavior,
    ) -> VsphereResult<ManagedObjectReference> {
        self.lifecycle
            .get_or_create_cluster(datacenter, name, drs)
            .await
    }

    /// Creates a distributed switch with `uplinks` uplink ports (usually
    /// [`DEFAULT_UPLINKS`]).
    pub async fn create_distributed_switch(
        &self,
        datacenter: Option<&str>,
        name: &str,
        uplinks: u32,
    ) -> VsphereResult<ManagedObjectReference> {
        self.lifecycle
            .create_distributed_switch(datacenter, name, uplinks)
            .await
    }

    pub async fn create_port_groups(
        &self,
        datacenter: Option<&str>,
        switch_name: &str,
        port_groups: &BTreeMap<String, Option<VlanId>>,
    ) -> VsphereResult<()> {
        self.lifecycle
            .create_port_groups(datacenter, switch_name, port_groups)
            .await
    }

    pub async fn add_host_uplink_to_switch(
        &self,
        datacenter: Option<&str>,
        host_name: &str,
        switch_name: &str,
        pnic: &str,
    ) -> VsphereResult<()> {
        self.lifecycle
            .add_host_uplink_to_switch(datacenter, host_name, switch_name, pnic)
            .await
    }

    /// Renders the appliance deployment template for the standalone host
    /// this client is connected to, with this client's credentials.
    pub async fn vcsa_install_config(
        &self,
        params: &VcsaInstallParams,
    ) -> VsphereResult<VcsaInstallConfig> {
        let connection = self.api_client.connection();
        VcsaInstallService::new(self.topology.clone())
            .install_config(
                params,
                connection.username().as_str(),
                connection.password().as_str(),
            )
            .await
    }
}
