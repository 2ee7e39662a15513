//! Mandate Revocation Scenario
//!
//! Walks a mandate through the revocation flow: create an Intent mandate,
//! revoke it, then show the problem detail an agent receives when it tries
//! to execute the revoked mandate anyway.

use ap2_agent::{failure_response, MandateTools, PaymentOutcome};
use chrono::{TimeZone, Utc};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let tools = MandateTools::default();

    // 1. The user delegates an intent to their shopping agent.
    let mandate = tools
        .create_intent_mandate(
            "Buy a pair of Nike shoes if price drops below $80",
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
        )
        .await?;

    println!("Created mandate {} [{}]", mandate.reference(), mandate.status());

    // 2. The user changes their mind and revokes.
    let revoked = tools.revoke_mandate(mandate.reference()).await?;
    println!("Revoked mandate {} [{}]", revoked.reference(), revoked.status());

    // 3. A merchant agent still tries to execute it.
    match tools
        .execute_mandate(mandate.reference(), PaymentOutcome::Success)
        .await
    {
        Ok(_) => println!("unexpected: revoked mandate executed"),
        Err(error) => {
            let (status, body) = failure_response(&error);
            println!("Execution rejected with status {status}:");
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
