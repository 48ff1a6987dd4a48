pub mod controller;
pub mod session;

pub use controller::{Completion, DashboardView, PipelineController, PipelineState};
pub use session::{MemorySessionStore, Redirect, SessionStore};
