//! Creates a VM on the first active cluster and powers it on.
//!
//! Reads `VSPHERE_HOST`, `VSPHERE_USERNAME` and `VSPHERE_PASSWORD` from the
//! environment or a `.env` file. Run with `RUST_LOG=vsphere_provision=debug`
//! to follow every API call.

use std::env;
use tracing_subscriber::EnvFilter;
use vsphere_provision::{CreateVmParams, DiskProvisioning, TaskOutcome, VlanId, VsphereClient, VsphereResult};

#[tokio::main]
async fn main() -> VsphereResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let host = env::var("VSPHERE_HOST").unwrap_or_else(|_| "vcenter.event.dreamhack.se".to_string());
    let username = env::var("VSPHERE_USERNAME").unwrap_or_default();
    let password = env::var("VSPHERE_PASSWORD").unwrap_or_default();

    let client = VsphereClient::builder()
        .host(host)
        .credentials(username, password)
        .accept_invalid_certs(true)
        .build()
        .await?;

    client.login().await?;
    println!("Authenticated: {}", client.is_authenticated().await);

    let params = CreateVmParams::new("demo-vm01", VlanId::new(100)?)
        .num_cpus(2)
        .memory(4 * 1024 * 1024 * 1024)
        .disk_size(32 * 1024 * 1024 * 1024)
        .disk_provisioning(DiskProvisioning::Thin)
        .os("ubuntu");
    let vm = client.create_vm(&params).await?;
    println!("Created {vm}");

    let task = client.power_on(&vm).await?;
    match client.wait_for_task(&task).await? {
        TaskOutcome::Success(_) => println!("Powered on {vm}"),
        TaskOutcome::Error(message) => println!("Power on failed: {message}"),
    }

    client.logout().await?;
    Ok(())
}
