use couponverse::configuration::Settings;
use couponverse::startup::{get_pg_pool, get_session_gate, Application};
use couponverse::telemetry::config_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::get_configuration().expect("Failed to read configuration");

    // Install the subscriber before anything else logs
    config_tracing(&settings.application);

    let pg_pool = get_pg_pool(&settings.database);
    let session_gate = get_session_gate(&settings)?;
    let app = Application::build(pg_pool, settings, session_gate).await?;
    app.run_until_terminated().await?;
    Ok(())
}
