use std::{env, fs, path::Path};

use crate::{domain::ChannelId, errors::Error, router::RoutingRule, Result};

/// Channel the original deployment relayed `-updates` traffic into. Kept as
/// the default so existing setups work without configuration; override with
/// `FORWARD_TARGET_CHANNEL`.
const DEFAULT_FORWARD_TARGET: u64 = 1_087_039_208_260_124_856;

/// Typed configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot token. Secret; never logged.
    pub discord_token: String,
    pub command_prefix: char,
    pub forward_marker: String,
    pub forward_target: ChannelId,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let discord_token = env_str("DISCORD_TOKEN").unwrap_or_default();
        if discord_token.trim().is_empty() {
            return Err(Error::MissingCredential(
                "DISCORD_TOKEN environment variable is required".to_string(),
            ));
        }

        let command_prefix = parse_prefix(env_str("COMMAND_PREFIX"))?;
        let forward_marker = env_str("FORWARD_CHANNEL_MARKER")
            .and_then(non_empty)
            .unwrap_or_else(|| "-updates".to_string());
        let forward_target = parse_channel_id(env_str("FORWARD_TARGET_CHANNEL"))?
            .unwrap_or(ChannelId(DEFAULT_FORWARD_TARGET));

        Ok(Self {
            discord_token,
            command_prefix,
            forward_marker,
            forward_target,
        })
    }

    pub fn routing_rule(&self) -> RoutingRule {
        RoutingRule {
            prefix: self.command_prefix,
            forward_marker: self.forward_marker.clone(),
            forward_target: self.forward_target,
        }
    }
}

/// The prefix sentinel must be exactly one character.
fn parse_prefix(v: Option<String>) -> Result<char> {
    let Some(s) = v.map(|s| s.trim().to_string()).and_then(non_empty) else {
        return Ok('!');
    };

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::Config(format!(
            "COMMAND_PREFIX must be a single character, got {s:?}"
        ))),
    }
}

fn parse_channel_id(v: Option<String>) -> Result<Option<ChannelId>> {
    let Some(s) = v.map(|s| s.trim().to_string()).and_then(non_empty) else {
        return Ok(None);
    };

    s.parse::<u64>()
        .map(|id| Some(ChannelId(id)))
        .map_err(|_| Error::Config(format!("FORWARD_TARGET_CHANNEL must be numeric, got {s:?}")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> String {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        val[1..val.len() - 1].to_string()
    } else {
        val.to_string()
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
