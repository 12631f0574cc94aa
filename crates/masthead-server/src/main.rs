use masthead_core::MastheadConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = MastheadConfig::load()?;
    let team = config.team.resolve_from_env();

    if !config.environment.is_development() && team.uses_defaults() {
        tracing::warn!(
            "production environment is running with built-in team secrets; \
             set every *_BIRTH, *_PHONE and PROJECT_SECRET variable"
        );
    }

    masthead_server::server::run(config, team).await?;
    Ok(())
}
