pub mod export;
pub mod history;
pub mod logo;
pub mod payload;
pub mod renderer;
pub mod session;
