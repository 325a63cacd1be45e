//! transfer-gate demo driver
//!
//! Walks the full authorization flow against the seeded demo directories
//! and a stub gateway, narrating each transition:
//!
//! ```text
//! ┌─────────┐   ┌──────────┐   ┌───────────┐   ┌─────────┐
//! │  Draft  │──▶│ Validate │──▶│ Challenge │──▶│ Gateway │
//! │ (edit)  │   │ + review │   │   (OTP)   │   │ (stub)  │
//! └─────────┘   └──────────┘   └───────────┘   └─────────┘
//! ```

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tracing::info;

use transfer_gate::config::AppConfig;
use transfer_gate::directory::demo_directories;
use transfer_gate::logging::init_logging;
use transfer_gate::workflow::gateway::AcceptAllGateway;
use transfer_gate::workflow::TransferWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load_or_default(&env);
    let _guard = init_logging(&config);

    let (accounts, payees) = demo_directories();
    let mut workflow = TransferWorkflow::new(
        Arc::new(accounts),
        Arc::new(payees),
        Arc::new(AcceptAllGateway),
        config.challenge.clone(),
        config.currency_symbol.clone(),
    );

    workflow.set_source_account("acc123")?;
    workflow.set_existing_payee("payee1")?;
    workflow.set_amount("50.00")?;
    workflow.set_reference(Some("rent".to_string()))?;
    workflow.set_scheduled_date(Some(Local::now().date_naive()))?;

    let summary = workflow.submit_for_review()?;
    println!("--- Confirm Your Transfer ---");
    println!("{}", summary);
    println!("-----------------------------");

    // In a deployment the code goes to the user's registered device; the
    // demo plays both sides of that channel.
    let session = workflow.confirm()?;
    let code = session.code().to_string();
    info!("one-time password delivered out of band");

    let result = workflow.verify_code(&code)?;
    info!(result = %result, "challenge verified");

    let receipt = workflow.submit_transfer().await?;
    println!(
        "Transfer complete: receipt {} at {}",
        receipt.receipt_id, receipt.timestamp
    );
    info!(state = %workflow.state(), "workflow finished");

    Ok(())
}
