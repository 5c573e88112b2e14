pub mod bundle;
pub mod context;
pub mod invocation;
pub mod registry;

pub use bundle::{AnalysisScope, ResultBundle};
pub use context::{BaseParams, QueryContext};
pub use invocation::{ToolInvocation, ToolResult};
pub use registry::{tools, Domain, DomainConfig};
