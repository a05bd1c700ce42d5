// [apps/coordinator/src/lib.rs]
//! Crate root for the evidence-custody and adjudication coordinator.
//! `main.rs` and `src/bin/demo.rs` both build on top of [`state::AppState`]
//! and [`routes::build_router`]; the HTTP-mapping modules under
//! [`handlers`] contain no business logic of their own (spec.md §4.13) —
//! every rule lives in the `whistlechain-*` domain crates this binary
//! wires together.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::routes::build_router;
    pub use crate::state::{AppState, SystemMode};
}
