pub mod config;
mod http_layers;
mod recordings;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use recordings::{content_type_for, FileInfo};
pub use server::{make_app, run_server};
