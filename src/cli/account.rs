//! `reset`, `logout`, `remember` and `status` subcommands

use super::{GlobalArgs, build_unblocker, init_logging, load_settings, print_json};
use crate::Message;
use anyhow::{Context, Result, bail};
use std::io::BufRead;

async fn dispatch(global: GlobalArgs, message: Message) -> Result<()> {
    let settings = load_settings(&global)?;
    init_logging(&settings);
    let reply = build_unblocker(settings)?.dispatch(message).await?;
    print_json(&reply)
}

pub async fn run_reset(global: GlobalArgs) -> Result<()> {
    dispatch(global, Message::ResetLastUnblock).await
}

pub async fn run_logout(global: GlobalArgs) -> Result<()> {
    dispatch(global, Message::Logout).await
}

pub async fn run_settings(global: GlobalArgs) -> Result<()> {
    dispatch(global, Message::GetSettings).await
}

/// Store credentials; the password is the first line on stdin
pub async fn run_remember(global: GlobalArgs, username: String) -> Result<()> {
    let password = read_password(std::io::stdin().lock())?;
    dispatch(global, Message::RememberLogin { username, password }).await
}

fn read_password<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("No password given on stdin");
    }
    Ok(password)
}

pub async fn run_status(global: GlobalArgs) -> Result<()> {
    let settings = load_settings(&global)?;
    init_logging(&settings);
    let status = build_unblocker(settings)?.status().await?;
    print_json(&status)
}
