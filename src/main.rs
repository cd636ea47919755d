use aws_config::BehaviorVersion;
use gradi_event_bridge::bridge::{BatchStatus, EventBridge, RecordOutcome};
use gradi_event_bridge::config::Config;
use gradi_event_bridge::event::NotificationBatch;
use gradi_event_bridge::object_store::S3ObjectStore;
use gradi_event_bridge::publisher::SqsWorkQueue;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        queue_configured = config.queue.url.is_some(),
        "Starting Gradi event bridge"
    );

    // Client bundle: constructed once, reused across invocations
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(config.s3.region.clone()))
        .load()
        .await;

    let store = Arc::new(S3ObjectStore::new(&aws_config, &config.s3));
    let queue = Arc::new(SqsWorkQueue::new(&aws_config, &config.queue));

    let bridge = EventBridge::new(
        store,
        queue,
        config.queue.url.clone(),
        config.presigned_url_expiry(),
    );

    run(service_fn(|event: LambdaEvent<NotificationBatch>| {
        handle_batch(event, &bridge)
    }))
    .await
}

/// Process one notification batch and map the report back to the runtime.
///
/// A configuration error or any fatal record outcome becomes a handler error
/// so the runtime can mark the batch for redelivery per its own policy.
async fn handle_batch(
    event: LambdaEvent<NotificationBatch>,
    bridge: &EventBridge,
) -> Result<serde_json::Value, Error> {
    let report = bridge.process(&event.payload).await;

    if let BatchStatus::ConfigError(message) = &report.status {
        return Err(message.clone().into());
    }

    if let Some(RecordOutcome::Failed { event_id, error }) = report.failures().next() {
        return Err(format!("record {event_id}: {error}").into());
    }

    info!(published = report.published(), "Batch processed");

    Ok(serde_json::json!({
        "statusCode": report.status.code(),
        "body": report.status.message(),
        "published": report.published(),
    }))
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}
