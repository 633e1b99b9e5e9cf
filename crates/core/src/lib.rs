pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod finding;
pub mod funnel;
pub mod period;
pub mod snapshot;

pub use config::Config;
pub use context::*;
pub use diagnostic::*;
pub use error::*;
pub use finding::*;
pub use funnel::*;
pub use period::*;
pub use snapshot::*;
