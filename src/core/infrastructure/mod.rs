pub mod api_client;
pub mod vim_api;
