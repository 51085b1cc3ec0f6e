//! Logging setup.
//!
//! The library itself only talks to the `log` facade; the binary picks the
//! `env_logger` backend through [`init_logging`].

mod init;

pub use init::{init_logging, LoggingConfig, ENV_LOG};
