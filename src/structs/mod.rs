pub mod qr_request;
pub mod render_config;
pub mod session;
