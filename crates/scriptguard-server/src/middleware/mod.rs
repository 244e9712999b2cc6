//! Request middleware: bearer auth, CORS, access logging.

pub mod auth;
pub mod cors;
pub mod logging;

pub use auth::AuthMiddleware;
pub use cors::CorsMiddleware;
pub use logging::LoggingMiddleware;
