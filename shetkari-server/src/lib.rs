pub mod http;

pub use http::{app_state, router, serve, AppState};
