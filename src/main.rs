//! taskpilot - Interactive CLI Entry Point
//!
//! Reads one prompt per cycle and drives the agent loop until the planner
//! declares the work complete or the session ends.

use taskpilot::agent::{Agent, CycleEnd};
use taskpilot::config::Config;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskpilot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing API key is startup-fatal
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    let mut agent = Agent::new(config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Enter prompt to generate/edit, or type 'exit' to quit");
        let Some(line) = lines.next_line().await? else {
            break; // stdin closed
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt == "exit" {
            break;
        }

        match agent.run_cycle(prompt).await {
            Ok(CycleEnd::Output) => {}
            Ok(CycleEnd::Exit) => break,
            // A failed cycle never crashes the process; report and re-prompt.
            Err(e) => error!("prompt cycle failed: {:#}", e),
        }
    }

    Ok(())
}
