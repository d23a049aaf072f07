//! `hetzner cloud ...`

use std::io::Write;
use std::time::Duration;

use tracing::info;

use hetzner_api::{
    Action,
    requests::{CreateServerRequest, CreateSshKeyRequest},
};
use hetzner_client::{CloudClient, PollConfig, PowerAction, ServerFilter};

use super::{Context, Interrupt};
use crate::cli::{
    ActionCommand, CloudCommand, CreateServerArgs, ImageCommand, ListOnly, PowerArgs,
    ServerCommand, SshKeyCommand,
};

pub async fn run<W: Write>(command: CloudCommand, ctx: &Context, out: &mut W) -> eyre::Result<()> {
    let client = ctx.cloud()?;
    let output = ctx.output;

    match command {
        CloudCommand::Server { command } => server(command, ctx, &client, out).await,
        CloudCommand::Action { command } => action(command, ctx, &client, out).await,
        CloudCommand::SshKey { command } => ssh_key(command, ctx, &client, out).await,
        CloudCommand::Image {
            command: ImageCommand::List { image_type },
        } => {
            let images = client.list_images(image_type.as_deref()).await?;
            output.list(out, &images)
        }
        CloudCommand::Location {
            command: ListOnly::List,
        } => output.list(out, &client.list_locations().await?),
        CloudCommand::ServerType {
            command: ListOnly::List,
        } => output.list(out, &client.list_server_types().await?),
    }
}

async fn server<W: Write>(
    command: ServerCommand,
    ctx: &Context,
    client: &CloudClient,
    out: &mut W,
) -> eyre::Result<()> {
    let output = ctx.output;
    match command {
        ServerCommand::List {
            name,
            label_selector,
            status,
            sort,
        } => {
            let filter = ServerFilter {
                name,
                label_selector,
                status,
                sort,
            };
            output.list(out, &client.list_servers(&filter).await?)
        }
        ServerCommand::Get { id } => output.detail(out, &client.get_server(id).await?),
        ServerCommand::Create(args) => create_server(args, ctx, client, out).await,
        ServerCommand::Delete { id, wait } => {
            let action = client.delete_server(id).await?;
            let action = maybe_wait(client, action, wait.wait, ctx.poll_config()?).await?;
            output.detail(out, &action)
        }
        ServerCommand::Poweron(args) => power(PowerAction::PowerOn, args, ctx, client, out).await,
        ServerCommand::Poweroff(args) => {
            power(PowerAction::PowerOff, args, ctx, client, out).await
        }
        ServerCommand::Reboot(args) => power(PowerAction::Reboot, args, ctx, client, out).await,
        ServerCommand::Reset(args) => power(PowerAction::Reset, args, ctx, client, out).await,
        ServerCommand::Shutdown(args) => {
            power(PowerAction::Shutdown, args, ctx, client, out).await
        }
    }
}

async fn power<W: Write>(
    power: PowerAction,
    args: PowerArgs,
    ctx: &Context,
    client: &CloudClient,
    out: &mut W,
) -> eyre::Result<()> {
    let action = client.server_action(args.id, power).await?;
    let action = maybe_wait(client, action, args.wait.wait, ctx.poll_config()?).await?;
    ctx.output.detail(out, &action)
}

async fn create_server<W: Write>(
    args: CreateServerArgs,
    ctx: &Context,
    client: &CloudClient,
    out: &mut W,
) -> eyre::Result<()> {
    let request = CreateServerRequest {
        name: args.name,
        server_type: args.server_type,
        image: args.image,
        location: args.location,
        ssh_keys: args.ssh_keys,
        labels: args.labels.into_iter().collect(),
        start_after_create: None,
    };
    let mut created = client.create_server(&request).await?;

    if args.wait.wait {
        created.action = maybe_wait(client, created.action, true, ctx.poll_config()?).await?;
        created.server = client.get_server(created.server.id).await?;
    }
    ctx.output.detail(out, &created)
}

async fn action<W: Write>(
    command: ActionCommand,
    ctx: &Context,
    client: &CloudClient,
    out: &mut W,
) -> eyre::Result<()> {
    let output = ctx.output;
    match command {
        ActionCommand::List { status } => {
            output.list(out, &client.list_actions(status.map(Into::into)).await?)
        }
        ActionCommand::Get { id } => output.detail(out, &client.get_action(id).await?),
        ActionCommand::Wait {
            id,
            timeout,
            interval,
        } => {
            let mut config = ctx.poll_config()?;
            if let Some(secs) = timeout {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            if let Some(ms) = interval {
                config = config.with_interval(Duration::from_millis(ms));
            }
            info!(id, "waiting for action");
            let interrupt = Interrupt::listen();
            let action = client
                .wait_for_action(id, config, Some(interrupt.token()))
                .await?;
            output.detail(out, &action)
        }
    }
}

async fn ssh_key<W: Write>(
    command: SshKeyCommand,
    ctx: &Context,
    client: &CloudClient,
    out: &mut W,
) -> eyre::Result<()> {
    let output = ctx.output;
    match command {
        SshKeyCommand::List => output.list(out, &client.list_ssh_keys().await?),
        SshKeyCommand::Get { id } => output.detail(out, &client.get_ssh_key(id).await?),
        SshKeyCommand::Create { name, public_key } => {
            let request = CreateSshKeyRequest {
                name,
                public_key,
                labels: Default::default(),
            };
            output.detail(out, &client.create_ssh_key(&request).await?)
        }
        SshKeyCommand::Delete { id } => {
            client.delete_ssh_key(id).await?;
            output.message(out, &format!("SSH key {id} deleted"))
        }
    }
}

async fn maybe_wait(
    client: &CloudClient,
    action: Action,
    wait: bool,
    config: PollConfig,
) -> eyre::Result<Action> {
    if !wait {
        return Ok(action);
    }
    info!(id = action.id, command = %action.command, "waiting for action");
    let interrupt = Interrupt::listen();
    Ok(client
        .wait_for_action(action.id, config, Some(interrupt.token()))
        .await?)
}
