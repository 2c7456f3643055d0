//! Mint a root IP with commercial remix terms, register a derivative of it,
//! pay a royalty into the derivative and claim the root's share.
//!
//! The royalty module must be approved to spend the payment token from the
//! signer's wallet before running; the payment step checks the allowance and
//! stops if it is too low.

use anyhow::Context;
use helpers::{run_workflow, setup_client, ClientSetup, WorkflowParams};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                "helpers=info,register_derivative_commercial_spg=info".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // instantiate client
    let ClientSetup { client, config } = setup_client().await?;

    let params = WorkflowParams::commercial_remix(&config)
        .context("failed to build workflow parameters")?;
    tracing::info!(
        wait_for_transaction = params.tx.wait_for_transaction,
        step_timeout = ?params.step_timeout,
        "running derivative commercial workflow"
    );

    let report = run_workflow(&client, &params).await?;
    println!("{report}");

    Ok(())
}
