//! Command implementations that stand apart from the CLI layer.

pub mod init;
