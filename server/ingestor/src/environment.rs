fn default_environment_name() -> String {
    "local".to_owned()
}

#[derive(serde::Deserialize, Debug)]
pub struct Env {
    #[serde(default = "default_environment_name")]
    pub environment_name: String,
    pub sentry_dsn: Option<String>,
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::prefixed("ENV_").from_env::<Self>()?)
    }

    /// Sentry only receives events from deployed environments.
    pub fn sentry_dsn(&self) -> Option<&str> {
        if self.environment_name == "local" {
            None
        } else {
            self.sentry_dsn.as_deref()
        }
    }
}
