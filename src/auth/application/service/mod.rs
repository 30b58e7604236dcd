pub mod login_service;
pub mod logout_service;
