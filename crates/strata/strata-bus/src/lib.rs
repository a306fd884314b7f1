mod log;

pub use crate::log::{SharedLog, Wake};
