use execlens_agent::{RenderMode, RenderedResponse};
use execlens_core::config::{is_time_range, ConfigOverrides};
use execlens_core::QueryContext;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{current_thread_runtime, load_orchestrator, CommandResult, EXIT_PIPELINE, EXIT_USAGE};

const COMMAND: &str = "ask";

#[derive(Clone, Debug, Default)]
pub struct AskArgs {
    pub query: String,
    pub region: Option<String>,
    pub time_range: Option<String>,
    pub overview: bool,
    pub narrative: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AskOutput<'a> {
    command: &'static str,
    status: &'static str,
    correlation_id: &'a str,
    #[serde(flatten)]
    rendered: &'a RenderedResponse,
}

pub fn run(args: AskArgs) -> CommandResult {
    if args.query.trim().is_empty() {
        return CommandResult::failure(COMMAND, "usage", "query must not be empty", EXIT_USAGE);
    }
    if let Some(time_range) = args.time_range.as_deref() {
        if !is_time_range(time_range) {
            return CommandResult::failure(
                COMMAND,
                "usage",
                format!("--time-range `{time_range}` must look like 30d, 6w, 12m or 1y"),
                EXIT_USAGE,
            );
        }
    }

    let (_, orchestrator) = match load_orchestrator(COMMAND, ConfigOverrides::default()) {
        Ok(loaded) => loaded,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let context = QueryContext {
        region: args.region.clone(),
        time_range: args.time_range.clone(),
        overview: args.overview,
    };
    let mode = if args.narrative { RenderMode::Narrative } else { RenderMode::Auto };
    let correlation_id = Uuid::new_v4().to_string();

    let rendered = runtime.block_on(orchestrator.run(&args.query, &context, mode, &correlation_id));
    info!(
        event_name = "cli.ask.completed",
        correlation_id = %correlation_id,
        ok = rendered.is_ok(),
        "ask command finished"
    );
    match rendered {
        Ok(rendered) if args.json => CommandResult::json(
            COMMAND,
            0,
            &AskOutput { command: COMMAND, status: "ok", correlation_id: &correlation_id, rendered: &rendered },
        ),
        Ok(rendered) => CommandResult { exit_code: 0, output: rendered.text },
        Err(error) => CommandResult::failure(
            COMMAND,
            error.error_code(),
            format!("{} (correlation id {})", error.user_message(), error.correlation_id()),
            EXIT_PIPELINE,
        ),
    }
}
