//! `tt suggest` and `tt accept`: AI suggestions and turning them into items.

use super::{Context, VariantArg, join_words, render_item, write_item_block};
use crate::output::{CliError, pretty_kv, pretty_markup, pretty_rule, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use teachtask_core::model::{Item, Variant};
use teachtask_core::suggest::{
    FAILURE_MESSAGE, SuggestionEngine, SuggestionRequest, SuggestionResponse,
};

#[derive(Args, Debug)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Ask something specific instead of the default suggestion prompt.
    #[arg(long)]
    pub prompt: Option<String>,

    /// Add the suggestion to the list straight away.
    #[arg(long)]
    pub accept: bool,
}

#[derive(Args, Debug)]
pub struct AcceptArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Suggestion text to add; the title, priority and estimate are parsed from it.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SuggestReport<'a> {
    #[serde(flatten)]
    response: &'a SuggestionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<Item>,
}

pub fn run_suggest(args: &SuggestArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let lists = ctx.lists()?;
    let current = lists.open_lists().map_err(|err| ctx.fail(&err))?;

    let engine = SuggestionEngine::from_configs(&ctx.config.providers);
    tracing::debug!(providers = ?engine.provider_names(), %variant, "requesting suggestion");
    let request = SuggestionRequest {
        tasks: current.tasks,
        todos: current.todos,
        context: variant,
        custom_prompt: args.prompt.clone(),
    };
    let response = engine.generate(&request);

    let Some(text) = response.suggestion.as_deref().filter(|_| response.success) else {
        let failure = failure_error(&response);
        render_error(ctx.output, &failure)?;
        anyhow::bail!("{}", failure.message);
    };

    let item = if args.accept {
        Some(
            lists
                .accept_suggestion(variant, text)
                .map_err(|err| ctx.fail(&err))?,
        )
    } else {
        None
    };

    let report = SuggestReport {
        response: &response,
        item,
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            writeln!(w, "{}", r.response.suggestion.as_deref().unwrap_or_default())?;
            if let Some(item) = &r.item {
                writeln!(w, "accepted\t{}", item.id)?;
            }
            Ok(())
        },
        |r, w| write_suggestion(w, variant, r),
    )
}

pub fn run_accept(args: &AcceptArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let item = ctx
        .lists()?
        .accept_suggestion(variant, &join_words(&args.text))
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}

/// Coded error for an unsuccessful response.
fn failure_error(response: &SuggestionResponse) -> CliError {
    let message = response.error.as_deref().unwrap_or(FAILURE_MESSAGE);
    CliError::coded(message, response.failure_code())
}

fn write_suggestion(w: &mut dyn Write, variant: Variant, report: &SuggestReport<'_>) -> io::Result<()> {
    let response = report.response;
    writeln!(w, "Suggestion")?;
    pretty_rule(w)?;
    writeln!(w, "{}", pretty_markup(response.suggestion.as_deref().unwrap_or_default()))?;
    pretty_rule(w)?;
    if let Some(parsed) = response.parsed() {
        pretty_kv(w, "Title", &parsed.title)?;
        pretty_kv(w, "Priority", parsed.priority.label().unwrap_or("medium"))?;
        if let Some(minutes) = parsed.estimated_time {
            pretty_kv(w, "Estimate", format!("{minutes} min"))?;
        }
    }
    if let Some(model) = &response.model {
        pretty_kv(w, "Model", model)?;
    }
    match &report.item {
        Some(item) => {
            writeln!(w)?;
            writeln!(w, "✓ Added to {variant}s")?;
            write_item_block(w, variant, item)
        }
        None => writeln!(w, "\nRun `tt accept` with this text, or re-run with --accept, to keep it."),
    }
}
