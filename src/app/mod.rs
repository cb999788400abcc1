pub mod context;
pub mod dispatch;
pub mod run;
pub mod summary;

pub use context::RunContext;
pub use run::{RunOutcome, execute};
pub use summary::render_summary;
