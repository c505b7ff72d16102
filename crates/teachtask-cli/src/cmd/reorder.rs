//! `tt reorder`: apply a new sequence, or move one item to a position.

use super::list::heading;
use super::{Context, VariantArg, render_items};
use crate::output::{CliError, render_error};
use clap::Args;
use teachtask_core::model::Item;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Move the single given ID to this 1-based position instead.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub to: Option<u64>,

    /// Every item ID in the desired order, or one ID with `--to`.
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

pub fn run_reorder(args: &ReorderArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let lists = ctx.lists()?;
    let arranged = match (args.to, args.ids.as_slice()) {
        (Some(to), [id]) => {
            let index = usize::try_from(to - 1).unwrap_or(usize::MAX);
            lists.move_item(variant, id, index)
        }
        (Some(_), _) => {
            let err = CliError::new("--to moves exactly one ID");
            render_error(ctx.output, &err)?;
            anyhow::bail!("{}", err.message);
        }
        (None, ids) => lists.reorder(variant, ids),
    }
    .map_err(|err| ctx.fail(&err))?;

    let shown: Vec<&Item> = arranged.iter().collect();
    render_items(ctx.output, heading(variant), &shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ReorderArgs,
    }

    #[test]
    fn reorder_takes_many_ids() {
        let w = Wrapper::parse_from(["test", "-t", "todo", "3", "1", "2"]);
        assert_eq!(w.args.ids, ["3", "1", "2"]);
        assert_eq!(w.args.to, None);
    }

    #[test]
    fn to_is_one_based() {
        let w = Wrapper::parse_from(["test", "--to", "1", "7"]);
        assert_eq!(w.args.to, Some(1));
        assert!(Wrapper::try_parse_from(["test", "--to", "0", "7"]).is_err());
    }
}
