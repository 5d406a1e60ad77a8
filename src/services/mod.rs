pub mod api_server;
pub mod authenticator;
pub mod responses;
