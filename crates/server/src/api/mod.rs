pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pdfs;
pub mod routes;
pub mod uploads;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
