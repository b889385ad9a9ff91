pub mod graphql_handler;
pub mod health_handler;
pub mod metrics_handler;
pub mod sdl_handler;
