pub mod create_vm_request;
pub mod vcsa_install_request;
