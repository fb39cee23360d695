//! Agent commands: free-text queries and the capability listing.

use storelens_api::agents::{AgentCoordinator, report};

use super::{CommandError, connect, emit};

async fn coordinator() -> Result<AgentCoordinator, CommandError> {
    let (config, pool) = connect().await?;
    Ok(AgentCoordinator::with_defaults(pool, config.cost_assumptions))
}

/// Answer `text` and print the text report.
///
/// `agent` is `auto` for keyword routing, or an agent ID to ask that agent
/// directly.
///
/// # Errors
///
/// Returns an error for an unknown agent or if the database is unreachable.
pub async fn run(text: &str, agent: &str) -> Result<(), CommandError> {
    let coordinator = coordinator().await?;

    if agent == "auto" {
        let response = coordinator.process_query(text).await;
        emit(&report::render(&coordinator, &response));
        return Ok(());
    }

    let response = coordinator
        .process_with(agent, text)
        .await
        .ok_or_else(|| CommandError::Invalid(format!("Unknown agent: {agent}")))?;
    emit(&report::render_direct(&response));
    Ok(())
}

/// Print the agents, their capabilities and tools as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing or the database is
/// unreachable.
pub async fn capabilities() -> Result<(), CommandError> {
    let coordinator = coordinator().await?;
    emit(&serde_json::to_string_pretty(&coordinator.capabilities())?);
    Ok(())
}
