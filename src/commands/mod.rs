pub mod capture;
pub mod config;
pub mod init;

pub use capture::*;
pub use config::*;
pub use init::*;
