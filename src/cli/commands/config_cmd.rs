//! config command - Get, set, or list configuration values

use anyhow::{bail, Context as _, Result};

use crate::core::config::{AuthorConfig, Config, GitLabConfig};
use crate::core::tips::TipPolicy;
use crate::engine::Context;
use crate::ui::output;

/// Keys accepted by `get` and `set`.
pub const KEYS: &[&str] = &[
    "tip_policy",
    "remote",
    "author.name",
    "author.email",
    "gitlab.url",
    "gitlab.token",
    "gitlab.https",
];

/// The configured value for `key`, without defaults.
fn lookup(config: &Config, key: &str) -> Result<Option<String>> {
    let global = &config.global;
    let author = global.author.as_ref();
    let gitlab = global.gitlab.as_ref();

    Ok(match key {
        "tip_policy" => global.tip_policy.map(|p| p.to_string()),
        "remote" => global.remote.clone(),
        "author.name" => author.and_then(|a| a.name.clone()),
        "author.email" => author.and_then(|a| a.email.clone()),
        "gitlab.url" => gitlab.and_then(|g| g.url.clone()),
        "gitlab.token" => gitlab.and_then(|g| g.token.as_ref().map(|_| "(set)".to_string())),
        "gitlab.https" => gitlab.and_then(|g| g.https.map(|b| b.to_string())),
        _ => bail!("Unknown configuration key: {} (known: {})", key, KEYS.join(", ")),
    })
}

/// Get a configuration value.
///
/// Prints nothing when the key is unset.
pub fn get(config: &Config, key: &str) -> Result<()> {
    if let Some(value) = lookup(config, key)? {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value and save the file.
pub fn set(ctx: &Context, mut config: Config, key: &str, value: &str) -> Result<()> {
    let global = &mut config.global;

    match key {
        "tip_policy" => {
            let policy: TipPolicy = value.parse().map_err(anyhow::Error::msg)?;
            global.tip_policy = Some(policy);
        }
        "remote" => global.remote = Some(value.to_string()),
        "author.name" => {
            global.author.get_or_insert_with(AuthorConfig::default).name = Some(value.to_string())
        }
        "author.email" => {
            global.author.get_or_insert_with(AuthorConfig::default).email = Some(value.to_string())
        }
        "gitlab.url" => {
            global.gitlab.get_or_insert_with(GitLabConfig::default).url = Some(value.to_string())
        }
        "gitlab.token" => {
            global.gitlab.get_or_insert_with(GitLabConfig::default).token = Some(value.to_string())
        }
        "gitlab.https" => {
            let https: bool = value
                .parse()
                .with_context(|| format!("Invalid boolean '{}'", value))?;
            global.gitlab.get_or_insert_with(GitLabConfig::default).https = Some(https);
        }
        _ => bail!("Unknown configuration key: {} (known: {})", key, KEYS.join(", ")),
    }

    let path = config.save().context("Failed to write config")?;
    tracing::debug!(path = %path.display(), key, "saved config");
    output::success(format!("Set {} = {}", key, value), ctx.verbosity());
    Ok(())
}

/// List all configured values.
pub fn list(config: &Config) -> Result<()> {
    match config.loaded_from() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# (no config file)"),
    }

    for key in KEYS {
        match lookup(config, key)? {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} = (not set)", key),
        }
    }
    Ok(())
}
