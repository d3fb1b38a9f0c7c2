//! Azure CLI command execution.
//!
//! Used to borrow the signed-in `az` session for a Resource Manager token.

use crate::error::BastionError;
use colored::Colorize;
use regex::Regex;
use serde::Deserialize;
use std::process::Command;
use std::sync::OnceLock;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Output of `az account get-access-token`.
#[derive(Deserialize, Debug)]
pub struct CliToken {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Subscription the CLI session is pointed at.
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    /// Unix timestamp, only emitted by newer CLI versions.
    #[serde(default)]
    pub expires_on: Option<i64>,
}

/// Run a shell command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
pub fn run(cmd: &str) -> Result<String, BastionError> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);
    let program = cmds
        .first()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| BastionError::Credential("empty command".to_string()))?;

    let output = Command::new(program)
        .args(cmds.iter().skip(1).filter(|a| !a.is_empty()))
        .output()
        .map_err(|e| {
            log::error!("Command execution failed: {}", e);
            BastionError::Credential(format!("Failed to execute {program}: {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(BastionError::Credential(format!(
            "ERROR running {program}: {}",
            stderr.trim()
        )));
    }
    log::debug!("Success cmd: {cmd}, stdout.len()={}", output.stdout.len());

    String::from_utf8(output.stdout)
        .map_err(|e| BastionError::Credential(format!("Invalid UTF-8 from {program}: {e}")))
}

/// Ask the signed-in Azure CLI for a token scoped to `resource`.
pub fn get_access_token(resource: &str) -> Result<CliToken, BastionError> {
    let cmd = format!("az account get-access-token --resource {resource} --output json");
    let output = run(&cmd)?;
    parse_token(&output)
}

fn parse_token(output: &str) -> Result<CliToken, BastionError> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    let token: CliToken = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        BastionError::Credential(format!(
            "Error parsing az cli token: path={} error={}",
            e.path(),
            e
        ))
    })?;

    if let Some(expires_on) = token.expires_on {
        match chrono::DateTime::from_timestamp(expires_on, 0) {
            Some(at) if at < chrono::Utc::now() => {
                log::warn!("az cli token expired at {at}, run 'az login'")
            }
            Some(at) => log::debug!("az cli token valid until {at}"),
            None => log::debug!("az cli token expiry {expires_on} out of range"),
        }
    }
    Ok(token)
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}
