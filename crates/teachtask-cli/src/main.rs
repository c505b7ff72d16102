#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::{Context, Globals};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tt: task and teaching-goal lists for teachers",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (skips env and config resolution).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Path to the list database.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn globals(&self) -> Globals {
        Globals {
            user: self.user.clone(),
            db: self.db.clone(),
            json: self.json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lists",
        about = "Add a task or teaching goal",
        long_about = "Append a new pending item to the end of a list.",
        after_help = "EXAMPLES:\n    # Add a high-priority task\n    tt add Grade unit 3 quizzes\n\n    # Add a low-priority task with bold markup\n    tt add -p low \"Email **parents** about the trip\"\n\n    # Add a teaching goal\n    tt add -t todo Raise reading scores"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Lists",
        about = "List tasks or teaching goals",
        long_about = "List one collection in position order, optionally filtered by status.",
        after_help = "EXAMPLES:\n    # List all tasks\n    tt list\n\n    # List pending teaching goals\n    tt list -t todo --status pending\n\n    # Emit machine-readable output\n    tt list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Lists",
        about = "Replace an item's text",
        after_help = "EXAMPLES:\n    # Reword a task\n    tt edit 1760000000000 Grade unit 4 quizzes"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Lists",
        about = "Change a task's priority",
        long_about = "Change a task's priority. Teaching goals take their priority from position; use `tt reorder` for them.",
        after_help = "EXAMPLES:\n    # Lower a task\n    tt priority 1760000000000 low"
    )]
    Priority(cmd::priority::PriorityArgs),

    #[command(
        next_help_heading = "Lists",
        about = "Remove an item",
        long_about = "Remove an item and close the gap in positions.",
        after_help = "EXAMPLES:\n    # Delete a task\n    tt delete 1760000000000\n\n    # Delete a teaching goal\n    tt delete -t todo 1760000000000"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Lists",
        about = "Rearrange a list",
        long_about = "Apply a new order given every ID, or move one ID with --to. Teaching goal priorities follow the new positions.",
        after_help = "EXAMPLES:\n    # Give the full order\n    tt reorder -t todo 1760000000002 1760000000000 1760000000001\n\n    # Move one item to the top\n    tt reorder -t todo --to 1 1760000000002"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(
        next_help_heading = "Status",
        about = "Flip an item between pending and done",
        after_help = "EXAMPLES:\n    # Toggle a task\n    tt toggle 1760000000000"
    )]
    Toggle(cmd::status::ToggleArgs),

    #[command(
        next_help_heading = "Status",
        about = "Mark an item done",
        after_help = "EXAMPLES:\n    # Complete a teaching goal\n    tt done -t todo 1760000000000"
    )]
    Done(cmd::status::DoneArgs),

    #[command(
        next_help_heading = "Status",
        about = "Mark every pending item done",
        long_about = "Mark every pending item in a collection done. Defaults to teaching goals.",
        after_help = "EXAMPLES:\n    # Complete every teaching goal\n    tt done-all\n\n    # Complete every task\n    tt done-all -t task"
    )]
    DoneAll(cmd::status::DoneAllArgs),

    #[command(
        next_help_heading = "Dashboard",
        about = "Show today's pending work",
        long_about = "Show pending tasks and teaching goals together, most urgent first.",
        after_help = "EXAMPLES:\n    # What is left today\n    tt today"
    )]
    Today,

    #[command(
        next_help_heading = "Dashboard",
        about = "Show counts and the weekly chart",
        after_help = "EXAMPLES:\n    # Task stats\n    tt stats\n\n    # Teaching goal stats as JSON\n    tt stats -t todo --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Dashboard",
        about = "Show both lists with summary counts",
        after_help = "EXAMPLES:\n    # Everything, newest first\n    tt overview"
    )]
    Overview,

    #[command(
        next_help_heading = "Suggestions",
        about = "Ask a model for a suggestion",
        long_about = "Ask the configured providers for one new task or teaching goal, based on the current lists.",
        after_help = "EXAMPLES:\n    # Suggest a task\n    tt suggest\n\n    # Suggest a teaching goal and keep it\n    tt suggest -t todo --accept\n\n    # Steer the suggestion\n    tt suggest --prompt \"Something for parent night\""
    )]
    Suggest(cmd::suggest::SuggestArgs),

    #[command(
        next_help_heading = "Suggestions",
        about = "Add suggestion text as an item",
        long_about = "Add suggestion text as an item, parsing its title, priority and estimate.",
        after_help = "EXAMPLES:\n    # Keep a suggestion\n    tt accept \"**Grade essays** (High Priority, Est. Time: 30 minutes)\""
    )]
    Accept(cmd::suggest::AcceptArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Bash\n    tt completions bash > ~/.local/share/bash-completion/completions/tt"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TEACHTASK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "teachtask_core=debug,tt=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("TEACHTASK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(args) = &cli.command {
        return cmd::completions::run_completions(args.shell, &mut Cli::command());
    }

    let ctx = Context::open(&cli.globals())?;
    debug!(command = ?cli.command, output = ?ctx.output, "dispatch");

    match &cli.command {
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Priority(args) => cmd::priority::run_priority(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Reorder(args) => cmd::reorder::run_reorder(args, &ctx),
        Commands::Toggle(args) => cmd::status::run_toggle(args, &ctx),
        Commands::Done(args) => cmd::status::run_done(args, &ctx),
        Commands::DoneAll(args) => cmd::status::run_done_all(args, &ctx),
        Commands::Today => cmd::today::run_today(&ctx),
        Commands::Stats(args) => cmd::stats::run_stats(args, &ctx),
        Commands::Overview => cmd::stats::run_overview(&ctx),
        Commands::Suggest(args) => cmd::suggest::run_suggest(args, &ctx),
        Commands::Accept(args) => cmd::suggest::run_accept(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
