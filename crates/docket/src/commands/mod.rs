//! CLI subcommands.

pub mod build;
pub mod dev;
pub mod init;
pub mod request;
pub mod serve;
pub mod snippet;
