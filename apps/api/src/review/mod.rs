pub mod handlers;
pub mod pdf;
pub mod reviewer;
