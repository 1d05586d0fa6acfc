pub mod output_writer;
pub mod page_scripts;
pub mod render_session;

pub use output_writer::OutputWriter;
pub use render_session::{await_readiness, poll_until_ready, RenderSession, RenderSettings, Renderer};
