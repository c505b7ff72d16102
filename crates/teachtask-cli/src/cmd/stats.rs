//! `tt stats` and `tt overview`: dashboard counts and the weekly series.

use super::list::heading;
use super::{Context, VariantArg, write_item_line, write_item_row};
use crate::output::{pretty_kv, pretty_rule, pretty_section, render_mode};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use teachtask_core::model::Variant;
use teachtask_core::stats::{self, DayBucket, OverviewStats, StatusCounts};
use teachtask_core::view::TaggedItem;

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub target: VariantArg,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    variant: Variant,
    counts: StatusCounts,
    week: Vec<DayBucket>,
}

#[derive(Debug, Serialize)]
struct OverviewReport {
    stats: OverviewStats,
    items: Vec<TaggedItem>,
}

pub fn run_stats(args: &StatsArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let items = ctx.lists()?.load(variant).map_err(|err| ctx.fail(&err))?;
    let report = StatsReport {
        variant,
        counts: StatusCounts::of(&items),
        week: stats::weekly_series(&items, Utc::now().date_naive()),
    };
    render_mode(ctx.output, &report, write_stats_text, write_stats_pretty)
}

pub fn run_overview(ctx: &Context) -> anyhow::Result<()> {
    let lists = ctx.lists()?.open_lists().map_err(|err| ctx.fail(&err))?;
    let report = OverviewReport {
        stats: OverviewStats::of(&lists.tasks, &lists.todos),
        items: stats::overview_table(&lists.tasks, &lists.todos),
    };
    render_mode(
        ctx.output,
        &report,
        |r, w| {
            for tagged in &r.items {
                write!(w, "{}\t", tagged.variant)?;
                write_item_row(w, &tagged.item)?;
            }
            Ok(())
        },
        write_overview_pretty,
    )
}

fn write_stats_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    let c = report.counts;
    writeln!(w, "total\t{}\npending\t{}\ndone\t{}", c.total, c.pending, c.done)?;
    for day in &report.week {
        writeln!(w, "{}\t{}\t{}", day.date, day.completed, day.pending)?;
    }
    Ok(())
}

fn write_stats_pretty(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, heading(report.variant))?;
    pretty_kv(w, "Total", report.counts.total.to_string())?;
    pretty_kv(w, "Pending", report.counts.pending.to_string())?;
    pretty_kv(w, "Done", report.counts.done.to_string())?;
    writeln!(w)?;
    pretty_section(w, "Created this week (# done, . pending)")?;
    for day in &report.week {
        writeln!(
            w,
            "{} {}  {}{}",
            day.weekday,
            day.date.format("%m-%d"),
            "#".repeat(day.completed),
            ".".repeat(day.pending)
        )?;
    }
    Ok(())
}

fn write_overview_pretty(report: &OverviewReport, w: &mut dyn Write) -> io::Result<()> {
    let s = report.stats;
    pretty_section(w, "Overview")?;
    pretty_kv(
        w,
        "Tasks",
        format!("{} total, {} pending, {} done", s.total_tasks, s.pending_tasks, s.completed_tasks),
    )?;
    pretty_kv(
        w,
        "Goals",
        format!("{} total, {} pending, {} done", s.total_todos, s.pending_todos, s.completed_todos),
    )?;
    pretty_rule(w)?;
    for tagged in &report.items {
        write!(w, "{:<5} ", tagged.variant.to_string())?;
        write_item_line(w, &tagged.item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use teachtask_core::model::{Item, Priority, Status};

    fn items() -> Vec<Item> {
        let created = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid");
        let mut done = Item::new("1".into(), "Grade quizzes", Priority::HIGH, created);
        done.set_status(Status::Done, created);
        let pending = Item::new("2".into(), "Plan lesson", Priority::LOW, created);
        vec![done, pending]
    }

    fn report() -> StatsReport {
        let items = items();
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid");
        StatsReport {
            variant: Variant::Task,
            counts: StatusCounts::of(&items),
            week: stats::weekly_series(&items, today),
        }
    }

    #[test]
    fn text_stats_lead_with_counts() {
        let mut buf = Vec::new();
        write_stats_text(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("total\t2\npending\t1\ndone\t1\n"));
        assert!(text.trim_end().ends_with("2026-03-02\t1\t1"));
    }

    #[test]
    fn pretty_stats_draw_one_bar_per_day() {
        let mut buf = Vec::new();
        write_stats_pretty(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Mon 03-02  #."));
        assert!(text.starts_with("Tasks\n"));
    }

    #[test]
    fn overview_json_has_stats_and_items() {
        let items = items();
        let report = OverviewReport {
            stats: OverviewStats::of(&items, &[]),
            items: stats::overview_table(&items, &[]),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["completed_tasks"], 1);
        assert_eq!(json["items"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["items"][0]["type"], "task");
    }
}
