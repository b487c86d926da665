//! Resolution of included config documents into environment variables.

mod error;
mod export;
mod file;
mod policy;
mod resolver;
mod source;
mod store;
mod tracker;

pub use error::{ParseError, ResolutionError};
pub use export::{export_lines, write_exports};
pub use policy::{Diagnostics, ErrorPolicy, Outcome};
pub use resolver::{Resolver, ResolverBuilder};
pub use source::{ConfigDocument, ConfigParser, FormatParser};
pub use store::VariableStore;
pub use tracker::{InclusionTracker, Origin};
