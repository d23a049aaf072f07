//! `hetzner auction ...`

use std::io::Write;

use tracing::debug;

use hetzner_client::AuctionFilter;

use super::Context;
use crate::cli::AuctionCommand;

pub async fn run<W: Write>(
    command: AuctionCommand,
    ctx: &Context,
    out: &mut W,
) -> eyre::Result<()> {
    let AuctionCommand::List {
        max_price,
        min_ram,
        datacenter,
        cpu,
        fixed_price,
        limit,
    } = command;

    let filter = AuctionFilter {
        max_price,
        min_ram,
        datacenter,
        cpu,
        fixed_price_only: fixed_price,
        limit,
    };
    debug!(?filter, "listing auction offers");

    let offers = ctx.auction()?.list_offers(&filter).await?;
    ctx.output.list(out, &offers)
}
