//! Query runtime - intent classification and tool orchestration
//!
//! This crate turns an executive's free-text question into a rendered answer:
//! - Scores the query against each analytic domain's keywords
//! - Picks the tools a domain needs for that query
//! - Calls them through a pluggable [`gateway::ToolGateway`]
//! - Renders either a single figure or a short narrative
//!
//! # Architecture
//!
//! The pipeline is linear and sequential per query:
//! 1. **Classification** (`classifier`) - query text → `ClassificationResult`
//! 2. **Planning** (`handler`) - domain + query → ordered tool steps
//! 3. **Dispatch** (`dispatcher`) - one gateway call per step → `ToolResult`
//! 4. **Rendering** (`render`) - `ResultBundle` → answer text
//!
//! # Key Types
//!
//! - `Orchestrator` - Entry point used by the server and CLI (see `runtime`)
//! - `ToolGateway` - Transport trait implemented by `execlens-gateway`
//! - `ScopeView` - Per-scope extraction and wording
//!
//! # Failure Principle
//!
//! Nothing below `Orchestrator::answer` returns an error to the caller. Tool
//! failures become `ToolResult::Failure`, extraction problems become fixed
//! fallback sentences, and panics become the generic apology.

pub mod classifier;
pub mod dispatcher;
pub mod gateway;
pub mod handler;
pub mod render;
pub mod runtime;

pub use classifier::{ClassificationResult, IntentClassifier, IntentScore};
pub use dispatcher::Dispatcher;
pub use gateway::{GatewayError, GatewayResponse, ToolGateway};
pub use handler::DomainHandler;
pub use render::{RenderMode, ResponseRenderer};
pub use runtime::{Answer, Orchestrator, QueryResponse, RenderedResponse};
