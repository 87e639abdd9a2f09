pub mod analyze;
pub mod config;
pub mod docs;
pub mod init;
pub mod workflows;
