pub mod config;
pub mod draft;
pub mod profile;
pub mod task;

pub use config::*;
pub use draft::*;
pub use profile::*;
pub use task::*;
