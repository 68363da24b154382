pub mod log_once;

pub use crate::warn_once;
