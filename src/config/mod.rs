//! Job documents and the defaults registry

pub mod defaults;
pub mod job;
pub mod loader;


pub use defaults::Defaults;
pub use job::{Job, Step, StepErrorPolicy};
pub use loader::load_job;
