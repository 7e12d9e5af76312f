//! behlog access control service
//!
//! The binary lives in `main.rs`; the modules are public so integration
//! tests can build the router against their own state.

pub mod api;
pub mod app_state;
pub mod http;
pub mod init_telemetry;
pub mod settings;
pub mod stop_flag;

pub use app_state::AppState;
