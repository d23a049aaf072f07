//! `hetzner robot ...`

use std::io::Write;

use super::Context;
use crate::cli::{ListOnly, ResetCommand, RobotCommand, RobotServerCommand};

pub async fn run<W: Write>(command: RobotCommand, ctx: &Context, out: &mut W) -> eyre::Result<()> {
    let client = ctx.robot()?;
    let output = ctx.output;

    match command {
        RobotCommand::Server {
            command: RobotServerCommand::List,
        } => output.list(out, &client.list_servers().await?),
        RobotCommand::Server {
            command: RobotServerCommand::Get { number },
        } => output.detail(out, &client.get_server(number).await?),
        RobotCommand::Reset {
            command: ResetCommand::Options { number },
        } => output.detail(out, &client.reset_options(number).await?),
        RobotCommand::Reset {
            command: ResetCommand::Execute { number, reset_type },
        } => {
            let result = client.reset_server(number, reset_type.into()).await?;
            output.detail(out, &result)
        }
        RobotCommand::Ip {
            command: ListOnly::List,
        } => output.list(out, &client.list_ips().await?),
        RobotCommand::Key {
            command: ListOnly::List,
        } => output.list(out, &client.list_ssh_keys().await?),
    }
}
