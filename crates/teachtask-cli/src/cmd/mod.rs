//! Subcommand handlers and the context they share.

pub mod add;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod list;
pub mod priority;
pub mod reorder;
pub mod stats;
pub mod status;
pub mod suggest;
pub mod today;

use crate::output::{
    CliError, OutputMode, plain_line, pretty_kv, pretty_markup, pretty_rule, pretty_section,
    priority_label, render_error, render_mode, status_mark,
};
use crate::session::CliSession;
use anyhow::Context as _;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use teachtask_core::config::{self, DB_ENV, UserConfig};
use teachtask_core::error::ErrorCode;
use teachtask_core::model::{Item, Variant};
use teachtask_core::store::SqliteStore;
use teachtask_core::{Identity, ListError, ListService, require_identity};

/// Flags every list command honours.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub user: Option<String>,
    pub db: Option<PathBuf>,
    pub json: bool,
}

/// Which collection a command targets.
#[derive(Args, Debug, Clone, Copy)]
pub struct VariantArg {
    /// Collection to act on: task or todo (teaching goal).
    #[arg(short = 't', long = "variant", default_value = "task")]
    pub variant: Variant,
}

/// Resolved config, output mode, identity and store for one invocation.
pub struct Context {
    pub output: OutputMode,
    pub config: UserConfig,
    pub identity: Identity,
    pub store: SqliteStore,
}

impl Context {
    /// Load config, resolve the user and open the store.
    ///
    /// Errors are rendered in the resolved output mode before being returned.
    pub fn open(globals: &Globals) -> anyhow::Result<Self> {
        let config = match config::load_user_config() {
            Ok(config) => config,
            Err(err) => {
                let fallback = UserConfig::default();
                let output = OutputMode::from_resolved(&config::resolve_output_from_env(
                    globals.json,
                    &fallback,
                ));
                render_error(
                    output,
                    &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
                )?;
                return Err(err);
            }
        };
        let output =
            OutputMode::from_resolved(&config::resolve_output_from_env(globals.json, &config));

        let session = CliSession::new(globals.user.as_deref(), &config);
        let identity = match require_identity(&session) {
            Ok(identity) => identity,
            Err(err) => {
                render_error(output, &CliError::coded(err.to_string(), err.code()))?;
                anyhow::bail!("{err}");
            }
        };

        let env_db = std::env::var(DB_ENV).ok();
        let path = config::resolve_db_path(globals.db.as_deref(), env_db.as_deref(), &config)?;
        let store = match SqliteStore::open(&path) {
            Ok(store) => store,
            Err(err) => {
                render_error(
                    output,
                    &CliError::coded(format!("{err:#}"), ErrorCode::RemoteFailure),
                )?;
                return Err(err).with_context(|| format!("open {}", path.display()));
            }
        };
        tracing::debug!(user = %identity.user_id, db = %path.display(), "context ready");

        Ok(Self {
            output,
            config,
            identity,
            store,
        })
    }

    /// List service for the resolved user, with both records provisioned.
    pub fn lists(&self) -> anyhow::Result<ListService<'_, SqliteStore>> {
        let service = ListService::new(&self.store, self.identity.clone());
        service.provision().map_err(|err| self.fail(&err))?;
        Ok(service)
    }

    /// Render a list error and turn it into the command's failure.
    pub fn fail(&self, err: &ListError) -> anyhow::Error {
        let rendered = render_error(self.output, &CliError::coded(err.to_string(), err.code()));
        match rendered {
            Ok(()) => anyhow::anyhow!("{err}"),
            Err(render_err) => render_err,
        }
    }
}

/// Join positional words into one text argument.
#[must_use]
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

/// Render one item: JSON object, one TSV row, or a labelled block.
pub fn render_item(output: OutputMode, variant: Variant, item: &Item) -> anyhow::Result<()> {
    render_mode(
        output,
        item,
        |item, w| write_item_row(w, item),
        |item, w| write_item_block(w, variant, item),
    )
}

/// Render many items as a JSON array, TSV rows, or a headed numbered list.
pub fn render_items(output: OutputMode, heading: &str, items: &[&Item]) -> anyhow::Result<()> {
    render_mode(
        output,
        &items,
        |items, w| {
            for item in *items {
                write_item_row(w, item)?;
            }
            Ok(())
        },
        |items, w| {
            pretty_section(w, &format!("{heading} ({})", items.len()))?;
            if items.is_empty() {
                return writeln!(w, "(nothing here yet)");
            }
            for item in *items {
                write_item_line(w, item)?;
            }
            Ok(())
        },
    )
}

/// `id  status  priority  title` as tab-separated text.
pub fn write_item_row(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    writeln!(
        w,
        "{}\t{}\t{}\t{}",
        item.id,
        item.status,
        item.priority,
        plain_line(&item.text)
    )
}

/// One human line: position, checkbox, priority, text with bold markup.
pub fn write_item_line(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    let first_line = item.text.lines().next().unwrap_or_default();
    writeln!(
        w,
        "{:>3}. {} {:<7} {}  ({})",
        item.order + 1,
        status_mark(item),
        priority_label(item),
        pretty_markup(first_line),
        item.id
    )
}

/// Labelled detail block for one item.
pub fn write_item_block(w: &mut dyn Write, variant: Variant, item: &Item) -> io::Result<()> {
    writeln!(w, "{} {}", status_mark(item), pretty_markup(&item.title))?;
    pretty_rule(w)?;
    pretty_kv(w, "ID", &item.id)?;
    pretty_kv(w, "Type", variant.to_string())?;
    pretty_kv(w, "Priority", priority_label(item))?;
    pretty_kv(w, "Position", (item.order + 1).to_string())?;
    if let Some(minutes) = item.estimated_time {
        pretty_kv(w, "Estimate", format!("{minutes} min"))?;
    }
    pretty_kv(w, "Created", item.created_at.format("%Y-%m-%d %H:%M").to_string())?;
    if let Some(done) = item.completed_at {
        pretty_kv(w, "Completed", done.format("%Y-%m-%d %H:%M").to_string())?;
    }
    writeln!(w)?;
    writeln!(w, "{}", pretty_markup(&item.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clap::Parser;
    use teachtask_core::model::Priority;

    fn item() -> Item {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid");
        let mut item = Item::new("17".into(), "**Grade** quizzes\nsecond", Priority::HIGH, now);
        item.order = 2;
        item
    }

    #[test]
    fn variant_arg_defaults_to_task() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: VariantArg,
        }
        assert_eq!(Wrapper::parse_from(["test"]).args.variant, Variant::Task);
        assert_eq!(
            Wrapper::parse_from(["test", "-t", "goals"]).args.variant,
            Variant::Todo
        );
        assert!(Wrapper::try_parse_from(["test", "--variant", "chore"]).is_err());
    }

    #[test]
    fn item_row_is_tab_separated_first_line() {
        let mut buf = Vec::new();
        write_item_row(&mut buf, &item()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "17\tpending\t1\tGrade quizzes\n");
    }

    #[test]
    fn item_line_is_one_based() {
        let mut buf = Vec::new();
        write_item_line(&mut buf, &item()).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.starts_with("  3. [ ] high"));
        assert!(line.ends_with("(17)\n"));
    }

    #[test]
    fn join_words_uses_single_spaces() {
        let words = vec!["Plan".to_string(), "lesson".to_string()];
        assert_eq!(join_words(&words), "Plan lesson");
    }
}
