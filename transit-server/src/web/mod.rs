//! Web layer: HTTP routing, DTOs and application state.

mod dto;
mod routes;
mod state;

pub use routes::{AppError, create_router};
pub use state::AppState;
