//! `tt today`: pending tasks and goals together, most urgent first.

use super::{Context, write_item_line, write_item_row};
use crate::output::{pretty_section, render_mode};
use std::io::{self, Write};
use teachtask_core::model::Variant;
use teachtask_core::view::TaggedItem;

pub fn run_today(ctx: &Context) -> anyhow::Result<()> {
    let agenda = ctx.lists()?.today().map_err(|err| ctx.fail(&err))?;
    render_mode(
        ctx.output,
        &agenda,
        |items, w| {
            for tagged in items {
                write!(w, "{}\t", tagged.variant)?;
                write_item_row(w, &tagged.item)?;
            }
            Ok(())
        },
        |items, w| write_agenda(w, items),
    )
}

fn write_agenda(w: &mut dyn Write, items: &[TaggedItem]) -> io::Result<()> {
    pretty_section(w, &format!("Today ({} pending)", items.len()))?;
    if items.is_empty() {
        return writeln!(w, "Nothing pending. Enjoy the break.");
    }
    for tagged in items {
        let tag = match tagged.variant {
            Variant::Task => "task",
            Variant::Todo => "goal",
        };
        write!(w, "[{tag}] ")?;
        write_item_line(w, &tagged.item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use teachtask_core::model::{Item, Priority};

    #[test]
    fn agenda_tags_goals() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid");
        let items = vec![TaggedItem {
            variant: Variant::Todo,
            item: Item::new("5".into(), "Raise reading scores", Priority::HIGH, now),
        }];
        let mut buf = Vec::new();
        write_agenda(&mut buf, &items).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Today (1 pending)\n"));
        assert!(text.contains("[goal]   1. [ ] high"));
    }

    #[test]
    fn empty_agenda_says_so() {
        let mut buf = Vec::new();
        write_agenda(&mut buf, &[]).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("Nothing pending"));
    }
}
