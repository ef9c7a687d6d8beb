//! Shared pieces of the shellkit command-line tools.

pub mod legacy;
pub mod logging;
pub mod worker;
