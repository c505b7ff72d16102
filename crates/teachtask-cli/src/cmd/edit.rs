//! `tt edit`: replace an item's text.

use super::{Context, VariantArg, join_words, render_item};
use clap::Args;

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: VariantArg,

    /// Item ID.
    pub id: String,

    /// Replacement text.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let variant = args.target.variant;
    let item = ctx
        .lists()?
        .edit_text(variant, &args.id, &join_words(&args.text))
        .map_err(|err| ctx.fail(&err))?;
    render_item(ctx.output, variant, &item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn edit_args_take_id_then_text() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: EditArgs,
        }
        let w = Wrapper::parse_from(["test", "1700000000000", "Review", "essays"]);
        assert_eq!(w.args.id, "1700000000000");
        assert_eq!(w.args.text, ["Review", "essays"]);
        assert!(Wrapper::try_parse_from(["test", "1700000000000"]).is_err());
    }
}
