//! User identity resolution for CLI commands.
//!
//! The resolution chain: `--user` flag > `TEACHTASK_USER` env > `[user] id`
//! in the user config. Every list command requires an identity.

use std::env;
use teachtask_core::config::UserConfig;
use teachtask_core::session::{Identity, SessionError, SessionProvider};

/// Env var naming the signed-in user.
pub const USER_ENV: &str = "TEACHTASK_USER";

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Identity from flag, environment and config.
pub struct CliSession<'a> {
    flag: Option<&'a str>,
    config: &'a UserConfig,
    env: &'a dyn EnvReader,
}

impl<'a> CliSession<'a> {
    #[must_use]
    pub fn new(flag: Option<&'a str>, config: &'a UserConfig) -> Self {
        Self {
            flag,
            config,
            env: &RealEnv,
        }
    }
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_user_with(
    cli_flag: Option<&str>,
    config: &UserConfig,
    env: &dyn EnvReader,
) -> Option<Identity> {
    if let Some(user) = cli_flag.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(Identity::new(user));
    }

    if let Some(user) = env.get(USER_ENV) {
        return Some(Identity::new(user.trim()));
    }

    // The configured email belongs to the configured id only.
    let id = config.user.id.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
    let identity = Identity::new(id);
    Some(match &config.user.email {
        Some(email) => identity.with_email(email.as_str()),
        None => identity,
    })
}

impl SessionProvider for CliSession<'_> {
    fn current_identity(&self) -> Result<Option<Identity>, SessionError> {
        Ok(resolve_user_with(self.flag, self.config, self.env))
    }
}
