pub mod datastore_selector;
pub mod host_identity_service;
pub mod network_backing_resolver;
pub mod task_orchestrator;
pub mod topology_service;
pub mod vcsa_install_service;
pub mod vm_lifecycle_service;
pub mod vm_spec_builder;
