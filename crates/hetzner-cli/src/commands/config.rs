//! `hetzner config ...`

use std::io::Write;

use eyre::eyre;

use super::Context;
use crate::cli::ConfigCommand;

pub fn run<W: Write>(command: ConfigCommand, ctx: &Context, out: &mut W) -> eyre::Result<()> {
    let path = ctx
        .config_path
        .as_deref()
        .ok_or_else(|| eyre!("no config location: pass --config or set HETZNER_CONFIG"))?;

    match command {
        ConfigCommand::Show => {
            let shown = ctx.config.redacted();
            if ctx.output.is_json() {
                serde_json::to_writer_pretty(&mut *out, &shown)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", toml::to_string_pretty(&shown)?)?;
            }
        }
        ConfigCommand::Path => writeln!(out, "{}", path.display())?,
        ConfigCommand::Set { key, value } => {
            let mut config = ctx.config.clone();
            config.set(&key, &value)?;
            config.save(path)?;
            ctx.output
                .message(out, &format!("{key} updated in {}", path.display()))?;
        }
    }
    Ok(())
}
