use std::sync::Arc;

use execlens_core::config::AnalysisDefaults;
use execlens_core::errors::{ApplicationError, InterfaceError};
use execlens_core::{AnalysisScope, QueryContext, ResultBundle};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::classifier::{ClassificationResult, IntentClassifier};
use crate::dispatcher::Dispatcher;
use crate::gateway::ToolGateway;
use crate::handler::DomainHandler;
use crate::render::{RenderMode, ResponseRenderer};

/// Structured outcome of one query, before rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub bundle: ResultBundle,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

/// A processed query together with its rendered text.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedResponse {
    #[serde(flatten)]
    pub response: QueryResponse,
    #[serde(rename = "answer")]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl Answer {
    fn rendered(correlation_id: String, scope: AnalysisScope, text: String) -> Self {
        Self { correlation_id, intent: Some(scope.to_string()), text, error_code: None }
    }

    fn failed(error: &InterfaceError) -> Self {
        Self {
            correlation_id: error.correlation_id().to_string(),
            intent: None,
            text: error.user_message().to_string(),
            error_code: Some(error.error_code().to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Classify, dispatch and render. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct Orchestrator {
    classifier: IntentClassifier,
    handler: DomainHandler,
    renderer: ResponseRenderer,
    defaults: Arc<AnalysisDefaults>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn ToolGateway>, defaults: AnalysisDefaults) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            handler: DomainHandler::new(Dispatcher::new(gateway)),
            renderer: ResponseRenderer::new(),
            defaults: Arc::new(defaults),
        }
    }

    pub fn gateway_name(&self) -> &'static str {
        self.handler.dispatcher().gateway_name()
    }

    pub async fn process(&self, query: &str, context: &QueryContext) -> QueryResponse {
        let (scope, classification) = if context.overview {
            (AnalysisScope::Comprehensive, None)
        } else {
            let classification = self.classifier.classify(query);
            (AnalysisScope::Single(classification.primary_domain), Some(classification))
        };

        let base_params = context.resolve(&self.defaults);
        let bundle = self.handler.handle(scope, query, &base_params).await;

        info!(
            event_name = "agent.query.processed",
            scope = %scope,
            region = %base_params.region,
            time_range = %base_params.time_range,
            tool_count = bundle.len(),
            failure_count = bundle.failure_count(),
            "query processed"
        );

        QueryResponse {
            summary: self.renderer.summary(scope).to_string(),
            bundle,
            classification,
        }
    }

    pub fn render(&self, response: &QueryResponse, mode: RenderMode) -> String {
        self.renderer.render(&response.bundle, &response.bundle.query, mode)
    }

    /// Full pipeline behind a fault boundary: a panic anywhere below becomes
    /// an `InterfaceError::Internal` carrying `correlation_id`.
    pub async fn run(
        &self,
        query: &str,
        context: &QueryContext,
        mode: RenderMode,
        correlation_id: &str,
    ) -> Result<RenderedResponse, InterfaceError> {
        let worker = self.clone();
        let owned_query = query.to_string();
        let owned_context = context.clone();

        let outcome = tokio::spawn(async move {
            let response = worker.process(&owned_query, &owned_context).await;
            let text = worker.render(&response, mode);
            RenderedResponse { response, text }
        })
        .await;

        match outcome {
            Ok(rendered) => {
                info!(
                    event_name = "agent.answer.rendered",
                    correlation_id = %correlation_id,
                    scope = %rendered.response.bundle.scope,
                    "answer rendered"
                );
                Ok(rendered)
            }
            Err(join_error) => {
                let interface = ApplicationError::Unexpected(join_error.to_string())
                    .into_interface(correlation_id);
                error!(
                    event_name = "agent.answer.failed",
                    correlation_id = %correlation_id,
                    error_code = interface.error_code(),
                    error = %interface,
                    "query pipeline aborted"
                );
                Err(interface)
            }
        }
    }

    /// [`Orchestrator::run`] with a fresh correlation id, flattened to text.
    pub async fn answer(&self, query: &str, context: &QueryContext, mode: RenderMode) -> Answer {
        let correlation_id = Uuid::new_v4().to_string();
        match self.run(query, context, mode, &correlation_id).await {
            Ok(rendered) => Answer::rendered(correlation_id, rendered.response.bundle.scope, rendered.text),
            Err(error) => Answer::failed(&error),
        }
    }
}
