pub mod history_item;
pub mod qr_code;
pub mod scheme;
