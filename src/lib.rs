pub mod activate;
pub mod config;
pub mod conflict;
pub mod error;
pub mod logger;
pub mod probe;
pub mod process;
pub mod prompt;
pub mod render;
pub mod setup;
pub mod site;
pub mod system;
pub mod tls;
