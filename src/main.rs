//! USSD Framework
//!
//! Console simulator: plays the demo dialog through the engine as a phone
//! and gateway would.

use std::sync::Arc;
use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use ussd_framework::{
    config::{Settings, SimulatorConfig},
    demo::{demo_registry, DemoSettings},
    middleware::LoggingListener,
    services::UssdBuilder,
    state::{InMemorySessionStore, SessionStore, StoreJanitor},
    utils::{helpers::generate_session_id, logging},
    RequestType, Ussd, UssdRequest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load settings")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", ussd_framework::info());

    // Initialize the session store
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(settings.store.entry_lifetime())?);
    let mut janitor = settings
        .store
        .sweep_interval()
        .map(|interval| StoreJanitor::new(Arc::clone(&store), interval));
    if let Some(janitor) = janitor.as_mut() {
        janitor.start();
    }

    // Initialize the engine
    let engine = UssdBuilder::from_config(&settings.ussd, Arc::clone(&store), demo_registry())
        .shared_data(Arc::new(DemoSettings {
            footer: format!("\nPowered by {}", ussd_framework::NAME),
        }))
        .listener(Arc::new(LoggingListener::default()))
        .build()?;
    info!(engine = ?engine, "Engine ready");

    run_simulator(&engine, &settings.simulator).await?;

    if let Some(mut janitor) = janitor {
        janitor.stop();
    }
    info!("Simulator has been shut down.");
    Ok(())
}

/// Read dial strings and replies from stdin until `exit` or end of input
async fn run_simulator(engine: &Ussd, config: &SimulatorConfig) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut session: Option<(String, u32, Option<String>)> = None;

    loop {
        let prompt = if session.is_some() {
            "> ".to_string()
        } else {
            format!("Dial {} (or 'exit'): ", config.service_code)
        };
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            if let Some((session_id, sequence, _)) = session.take() {
                let release = UssdRequest::new(session_id, RequestType::Release, "").with_sequence(sequence + 1);
                engine.process_request(release);
            }
            break;
        }

        let request = match session.take() {
            Some((session_id, sequence, client_state)) => UssdRequest::new(session_id, RequestType::Response, input)
                .with_service_code(config.service_code.clone())
                .with_sequence(sequence + 1)
                .with_client_state(client_state),
            None => {
                let dial = if input.is_empty() { config.service_code.as_str() } else { input };
                UssdRequest::initiation(generate_session_id(), config.service_code.clone(), dial)
            }
        }
        .with_mobile(config.mobile.clone())
        .with_operator(config.operator.clone());

        let session_id = request.session_id.clone();
        let sequence = request.sequence;
        let response = engine.process_request(request);

        stdout.write_all(format!("\n{}\n\n", response.message.trim_end()).as_bytes()).await?;
        if !response.is_release() {
            session = Some((session_id, sequence, response.client_state.clone()));
        }
    }

    Ok(())
}
