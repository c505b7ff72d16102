//! `tt priority`: change a task's priority.

use super::{Context, VariantArg, render_item};
use clap::Args;
use teachtask_core::model::Priority;

#[derive(Args, Debug)]
pub struct PriorityArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Item ID.
    pub id: String,

    /// New priority: high, medium, low or a rank number.
    pub priority: Priority,
}

pub fn run_priority(args: &PriorityArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let item = ctx
        .lists()?
        .set_priority(variant, &args.id, args.priority)
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn priority_accepts_names_and_ranks() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: PriorityArgs,
        }
        let w = Wrapper::parse_from(["test", "42", "medium"]);
        assert_eq!(w.args.priority, Priority::MEDIUM);
        let w = Wrapper::parse_from(["test", "42", "5"]);
        assert_eq!(w.args.priority, Priority::new(5));
        assert!(Wrapper::try_parse_from(["test", "42", "0"]).is_err());
    }
}
