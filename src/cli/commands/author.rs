//! author command - Set user.name / user.email in every repository

use std::path::Path;

use anyhow::{bail, Result};

use super::run_walk;
use crate::core::config::{AuthorConfig, Config};
use crate::engine::{Context, RepoOperation};
use crate::git::Git;
use crate::ui::output::{self, Verbosity};

/// Writes the author identity into each repository's local config.
#[derive(Debug)]
pub struct AuthorOperation {
    name: Option<String>,
    email: Option<String>,
    verbosity: Verbosity,
}

impl AuthorOperation {
    /// Build the operation from flags, falling back to `[author]` in the
    /// config file.
    ///
    /// # Errors
    ///
    /// Fails when neither a name nor an email can be resolved, or when a
    /// resolved value is invalid.
    pub fn resolve(
        config: &Config,
        name: Option<String>,
        email: Option<String>,
        verbosity: Verbosity,
    ) -> Result<Self> {
        let author = AuthorConfig {
            name: name.or_else(|| config.author_name().map(String::from)),
            email: email.or_else(|| config.author_email().map(String::from)),
        };
        if author.name.is_none() && author.email.is_none() {
            bail!("No author given: pass --name/--email or set [author] in the config file");
        }
        author.validate()?;

        Ok(Self {
            name: author.name,
            email: author.email,
            verbosity,
        })
    }
}

impl RepoOperation for AuthorOperation {
    fn name(&self) -> &str {
        "author"
    }

    fn process(&mut self, git: &Git, path: &Path) -> Result<()> {
        let mut changed = false;
        for (key, value) in [("user.name", &self.name), ("user.email", &self.email)] {
            let Some(value) = value else { continue };
            if git.config_string(key)?.as_deref() == Some(value.as_str()) {
                continue;
            }
            git.set_config_string(key, value)?;
            changed = true;
        }

        let verb = if changed { "updated" } else { "unchanged" };
        output::print(format!("{} {}", verb, path.display()), self.verbosity);
        Ok(())
    }
}

/// Set the author identity in every repository under `path`.
pub fn author(
    ctx: &Context,
    config: &Config,
    path: &Path,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let mut op = AuthorOperation::resolve(config, name, email, ctx.verbosity())?;
    run_walk(ctx, path, &mut op);
    Ok(())
}
