//! Redis pub/sub subscriber for the registration topics.
//!
//! Each topic gets its own connection and task, and every message is
//! processed on its own spawned task. A bad message or a failing topic
//! never takes down the other.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use redis::aio::PubSub;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use super::handlers::dispatch;
use crate::services::AuthService;

/// Delay between subscribe attempts.
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Consecutive failed subscribe attempts before a topic gives up.
const MAX_SUBSCRIBE_ATTEMPTS: u32 = 5;

/// Subscribes to the registration topics and persists what arrives.
pub struct RegistrationListener {
    client: redis::Client,
    service: Arc<AuthService>,
}

impl RegistrationListener {
    pub fn new(client: redis::Client, service: Arc<AuthService>) -> Self {
        Self { client, service }
    }

    /// Subscribe to every topic, then hand each subscription to its own task.
    ///
    /// The first subscribe attempt completes before this returns, so a
    /// manifest published afterwards is not missed. A failed first attempt
    /// is logged and retried in the background.
    pub async fn start(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(beheer_sdk::topics::ALL.len());

        for topic in beheer_sdk::topics::ALL {
            let initial = match subscribe(&self.client, topic).await {
                Ok(pubsub) => {
                    info!(topic, "subscribed to registration topic");
                    Some(pubsub)
                }
                Err(e) => {
                    warn!(topic, error = %format!("{e:#}"), "failed to subscribe, will retry");
                    None
                }
            };

            let client = self.client.clone();
            let service = Arc::clone(&self.service);
            handles.push(tokio::spawn(async move {
                run_topic(client, service, topic, initial).await;
            }));
        }

        handles
    }
}

async fn subscribe(client: &redis::Client, topic: &str) -> Result<PubSub> {
    let mut pubsub = client
        .get_async_pubsub()
        .await
        .context("failed to open pub/sub connection")?;

    pubsub
        .subscribe(topic)
        .await
        .with_context(|| format!("failed to subscribe to {topic}"))?;

    Ok(pubsub)
}

async fn run_topic(
    client: redis::Client,
    service: Arc<AuthService>,
    topic: &'static str,
    mut current: Option<PubSub>,
) {
    let mut failures = if current.is_some() { 0 } else { 1 };

    loop {
        if let Some(pubsub) = current.take() {
            failures = 0;
            consume(pubsub, &service, topic).await;
            warn!(topic, "subscription stream ended, re-subscribing");
        }

        if failures >= MAX_SUBSCRIBE_ATTEMPTS {
            error!(topic, attempts = failures, "giving up on registration topic");
            return;
        }

        tokio::time::sleep(RETRY_BACKOFF).await;

        match subscribe(&client, topic).await {
            Ok(pubsub) => {
                info!(topic, "re-subscribed to registration topic");
                current = Some(pubsub);
            }
            Err(e) => {
                failures += 1;
                warn!(topic, attempt = failures, error = %format!("{e:#}"), "subscribe attempt failed");
            }
        }
    }
}

async fn consume(pubsub: PubSub, service: &Arc<AuthService>, topic: &'static str) {
    let mut messages = std::pin::pin!(pubsub.into_on_message());

    while let Some(msg) = messages.next().await {
        let payload = msg.get_payload_bytes().to_vec();
        let service = Arc::clone(service);
        debug!(topic, bytes = payload.len(), "registration message received");

        tokio::spawn(async move {
            match dispatch(&service, topic, &payload).await {
                Ok(summary) => debug!(
                    topic,
                    owner = %summary.owner,
                    count = summary.count,
                    "registration applied"
                ),
                Err(e) => warn!(topic, error = %e, "registration message dropped"),
            }
        });
    }
}
