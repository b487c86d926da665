pub mod config;
pub mod context;
mod error;

pub use config::{
    export_lines, write_exports, ConfigDocument, ConfigParser, Diagnostics, ErrorPolicy, FormatParser,
    InclusionTracker, Origin, Outcome, ParseError, ResolutionError, Resolver, ResolverBuilder,
    VariableStore,
};
pub use context::ResolveContext;
pub use error::Error;
