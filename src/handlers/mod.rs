pub mod export_handlers;
pub mod health_handlers;
pub mod history_handlers;
pub mod session_handlers;
