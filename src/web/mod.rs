//! HTTP front-end.
//!
//! - `POST /translate` accepts `{text, target_lang}` where `text` is a string
//!   or a list of strings
//! - `GET /languages` / `POST /languages` list and extend the offered targets
//! - `GET /health` reports liveness

mod server;

pub use server::{build_router, serve, AppState};
