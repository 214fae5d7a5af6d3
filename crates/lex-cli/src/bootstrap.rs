use anyhow::Context;
use lex_client::LexClient;
use lex_config::LexConfig;

/// Load `.lexa/.env` (or `./.env`), then the layered configuration.
pub fn load_config() -> anyhow::Result<LexConfig> {
    load_dotenv()?;
    LexConfig::load().context("failed to load lexa configuration")
}

pub fn build_client(config: LexConfig) -> anyhow::Result<LexClient> {
    tracing::debug!(origin = config.api.origin(), "building api client");
    LexClient::from_config(config).context("failed to set up the api client")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    let project_env = cwd.join(".lexa").join(".env");
    if project_env.exists() {
        dotenvy::from_path(&project_env)
            .with_context(|| format!("failed to load dotenv file at {}", project_env.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
