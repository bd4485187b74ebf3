pub mod client;
pub mod local;
pub mod render;
pub mod session;

pub use client::{GraphPayload, GraphRequest, SavesClient};
pub use local::build_payload;
pub use render::{render_graph, render_payload, render_session};
pub use session::{FilesTicket, GraphStatus, GraphTicket, ViewerSession};
