//! Command handlers

pub mod auction;
pub mod cloud;
pub mod config;
pub mod robot;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Context as _, bail};
use tokio::signal;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use hetzner_client::{
    ApiClient, AuctionClient, CloudClient, Credentials, PollConfig, RobotClient,
    auction::AUCTION_URL, cloud::CLOUD_API_URL, robot::ROBOT_API_URL,
};

use crate::cli::{AuthArgs, Commands, Format};
use crate::config::Config;
use crate::credentials::{self, CLOUD_TOKEN, ROBOT_PASSWORD, ROBOT_USER, TerminalPrompt};
use crate::output::Output;

/// Everything a handler needs besides its own arguments
pub struct Context {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub auth: AuthArgs,
    pub output: Output,
}

impl Context {
    /// Combine parsed flags with the loaded config
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        auth: AuthArgs,
        format: Option<Format>,
    ) -> Self {
        let format = format.or(config.defaults.output).unwrap_or_default();
        Self {
            config,
            config_path,
            auth,
            output: Output::new(format),
        }
    }

    /// Cloud client from the resolved token and endpoint
    pub fn cloud(&self) -> eyre::Result<CloudClient> {
        let (token, _) = credentials::resolve(
            &CLOUD_TOKEN,
            self.auth.token.as_deref(),
            &credentials::process_env,
            self.config.cloud.token.as_deref(),
            &mut TerminalPrompt,
        )?;
        let endpoint = pick(
            self.auth.cloud_endpoint.as_deref(),
            self.config.cloud.endpoint.as_deref(),
            CLOUD_API_URL,
        );
        debug!(endpoint, "using cloud endpoint");

        let mut builder = ApiClient::builder(endpoint).credentials(Credentials::Bearer(token));
        if let Some(per_page) = self.per_page()? {
            builder = builder.per_page(per_page);
        }
        let api = builder.build().wrap_err("failed to create cloud client")?;
        Ok(CloudClient::from_api(api))
    }

    /// Robot client from the resolved user, password and endpoint
    pub fn robot(&self) -> eyre::Result<RobotClient> {
        let mut prompt = TerminalPrompt;
        let (user, _) = credentials::resolve(
            &ROBOT_USER,
            self.auth.robot_user.as_deref(),
            &credentials::process_env,
            self.config.robot.user.as_deref(),
            &mut prompt,
        )?;
        let (password, _) = credentials::resolve(
            &ROBOT_PASSWORD,
            self.auth.robot_password.as_deref(),
            &credentials::process_env,
            self.config.robot.password.as_deref(),
            &mut prompt,
        )?;
        let endpoint = pick(
            self.auth.robot_endpoint.as_deref(),
            self.config.robot.endpoint.as_deref(),
            ROBOT_API_URL,
        );
        debug!(endpoint, "using robot endpoint");

        let api = ApiClient::builder(endpoint)
            .credentials(Credentials::basic(user, password))
            .build()
            .wrap_err("failed to create robot client")?;
        Ok(RobotClient::from_api(api))
    }

    /// Auction client; the feed needs no credentials
    pub fn auction(&self) -> eyre::Result<AuctionClient> {
        let endpoint = pick(
            self.auth.auction_endpoint.as_deref(),
            self.config.auction.endpoint.as_deref(),
            AUCTION_URL,
        );
        AuctionClient::with_endpoint(endpoint).wrap_err("failed to create auction client")
    }

    /// Poll settings from the config defaults
    pub fn poll_config(&self) -> eyre::Result<PollConfig> {
        let mut config = PollConfig::default();
        match self.config.defaults.poll_interval_ms {
            Some(0) => bail!("defaults.poll_interval_ms must be at least 1"),
            Some(ms) => config = config.with_interval(Duration::from_millis(ms)),
            None => {}
        }
        if let Some(secs) = self.config.defaults.action_timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn per_page(&self) -> eyre::Result<Option<u32>> {
        match self.auth.per_page.or(self.config.defaults.per_page) {
            Some(0) => bail!("--per-page must be at least 1"),
            other => Ok(other),
        }
    }
}

fn pick<'a>(flag: Option<&'a str>, config: Option<&'a str>, default: &'a str) -> &'a str {
    flag.filter(|v| !v.is_empty())
        .or(config.filter(|v| !v.is_empty()))
        .unwrap_or(default)
}

/// Ctrl-C handling for the duration of one wait
///
/// While the guard lives, Ctrl-C cancels [`Interrupt::token`]. Once the signal
/// handler is installed it stays for the life of the process, so after the
/// guard is dropped (or after a first Ctrl-C) the next Ctrl-C exits with 130.
pub struct Interrupt {
    cancel: CancellationToken,
    _done: DropGuard,
}

impl Interrupt {
    pub fn listen() -> Self {
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();

        let (task_cancel, task_done) = (cancel.clone(), done.clone());
        tokio::spawn(async move {
            forward_interrupt(signal::ctrl_c(), &task_cancel, &task_done).await;
            if signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });

        Self {
            cancel,
            _done: done.drop_guard(),
        }
    }

    /// Token to hand to the poller
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Cancel `cancel` when `interrupted` fires before `done`; true if it did
async fn forward_interrupt<F>(
    interrupted: F,
    cancel: &CancellationToken,
    done: &CancellationToken,
) -> bool
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        result = interrupted => {
            if result.is_ok() {
                debug!("interrupt received, cancelling wait");
                cancel.cancel();
            }
            result.is_ok()
        }
        () = done.cancelled() => false,
    }
}

/// Run the selected command, writing results to stdout
pub async fn run(command: Commands, ctx: &Context) -> eyre::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Commands::Cloud { command } => cloud::run(command, ctx, &mut out).await?,
        Commands::Robot { command } => robot::run(command, ctx, &mut out).await?,
        Commands::Auction { command } => auction::run(command, ctx, &mut out).await?,
        Commands::Config { command } => config::run(command, ctx, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_precedence() {
        assert_eq!(pick(Some("flag"), Some("config"), "default"), "flag");
        assert_eq!(pick(None, Some("config"), "default"), "config");
        assert_eq!(pick(Some(""), None, "default"), "default");
    }

    #[test]
    fn test_output_format_precedence() {
        let mut config = Config::default();
        config.defaults.output = Some(Format::Json);

        let ctx = Context::new(config.clone(), None, AuthArgs::default(), None);
        assert!(ctx.output.is_json());

        let ctx = Context::new(config, None, AuthArgs::default(), Some(Format::Table));
        assert!(!ctx.output.is_json());
    }

    #[test]
    fn test_poll_config_from_defaults() {
        let mut config = Config::default();
        config.defaults.poll_interval_ms = Some(250);
        config.defaults.action_timeout_secs = Some(10);

        let ctx = Context::new(config, None, AuthArgs::default(), None);
        let poll = ctx.poll_config().unwrap();
        assert_eq!(poll.interval, Duration::from_millis(250));
        assert_eq!(poll.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_poll_interval_in_config_rejected() {
        let mut config = Config::default();
        config.defaults.poll_interval_ms = Some(0);

        let ctx = Context::new(config, None, AuthArgs::default(), None);
        assert!(ctx.poll_config().is_err());
    }

    #[tokio::test]
    async fn test_interrupt_cancels_wait() {
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();

        let forwarded = forward_interrupt(async { Ok(()) }, &cancel, &done).await;
        assert!(forwarded);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_interrupt_released_after_wait() {
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        done.cancel();

        let forwarded =
            forward_interrupt(std::future::pending::<io::Result<()>>(), &cancel, &done).await;
        assert!(!forwarded);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_interrupt_guard_does_not_cancel_on_drop() {
        let interrupt = Interrupt::listen();
        let token = interrupt.token();
        drop(interrupt);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_zero_per_page_rejected() {
        let auth = AuthArgs {
            per_page: Some(0),
            ..AuthArgs::default()
        };
        let ctx = Context::new(Config::default(), None, auth, None);
        assert!(ctx.per_page().is_err());
    }
}
