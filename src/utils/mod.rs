pub mod layout;
pub mod log;
