pub mod config;
pub mod domain;
pub mod errors;

pub use domain::{
    tools, AnalysisScope, BaseParams, Domain, DomainConfig, QueryContext, ResultBundle,
    ToolInvocation, ToolResult,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
