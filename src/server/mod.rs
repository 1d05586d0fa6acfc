pub mod content_server;
pub mod template;

pub use content_server::{ContentServer, ServeMode};
