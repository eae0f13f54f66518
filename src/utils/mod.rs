pub mod color;
pub mod jwt;
