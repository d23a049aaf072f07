//! Credential resolution
//!
//! Each secret is looked up in order: command-line flag, environment
//! variable, config file, interactive prompt. Empty values count as unset.

use std::io::{self, BufRead, IsTerminal, Write};

use eyre::eyre;
use tracing::debug;

/// Cloud token lookup
pub const CLOUD_TOKEN: CredentialLookup = CredentialLookup {
    label: "Cloud API token",
    flag: "--token",
    env: "HCLOUD_TOKEN",
};

/// Robot user lookup
pub const ROBOT_USER: CredentialLookup = CredentialLookup {
    label: "Robot user",
    flag: "--robot-user",
    env: "HETZNER_ROBOT_USER",
};

/// Robot password lookup
pub const ROBOT_PASSWORD: CredentialLookup = CredentialLookup {
    label: "Robot password",
    flag: "--robot-password",
    env: "HETZNER_ROBOT_PASSWORD",
};

/// Where a credential can come from
#[derive(Debug, Clone, Copy)]
pub struct CredentialLookup {
    pub label: &'static str,
    pub flag: &'static str,
    pub env: &'static str,
}

/// Source a credential was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Env,
    ConfigFile,
    Prompt,
}

/// Asks the user for a missing value
pub trait Prompt {
    /// `Ok(None)` when no one can be asked
    fn ask(&mut self, label: &str) -> io::Result<Option<String>>;
}

/// Prompts on stderr and reads stdin, only when stdin is a terminal
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Ok(None);
        }
        let mut stderr = io::stderr();
        write!(stderr, "{label}: ")?;
        stderr.flush()?;

        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        Ok(Some(line.trim().to_string()))
    }
}

/// Resolve one credential
///
/// # Errors
/// Returns an error naming the flag and env var when no source has a value.
pub fn resolve(
    lookup: &CredentialLookup,
    flag: Option<&str>,
    env: &dyn Fn(&str) -> Option<String>,
    config: Option<&str>,
    prompt: &mut dyn Prompt,
) -> eyre::Result<(String, Source)> {
    let found = if let Some(value) = flag.filter(|v| present(v)) {
        Some((value.to_string(), Source::Flag))
    } else if let Some(value) = env(lookup.env).filter(|v| present(v)) {
        Some((value, Source::Env))
    } else if let Some(value) = config.filter(|v| present(v)) {
        Some((value.to_string(), Source::ConfigFile))
    } else {
        prompt
            .ask(lookup.label)?
            .filter(|v| present(v))
            .map(|value| (value, Source::Prompt))
    };

    let (value, source) = found.ok_or_else(|| {
        eyre!(
            "missing {}: pass {}, set {} or add it to the config file",
            lookup.label,
            lookup.flag,
            lookup.env
        )
    })?;
    debug!(credential = lookup.label, ?source, "resolved credential");
    Ok((value, source))
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Read a variable from the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
