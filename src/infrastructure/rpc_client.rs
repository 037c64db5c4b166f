//! RPC client (spec §4.G): correlation-ID request/reply over a message
//! broker, one-shot reply queue per call, timeout and context-cancel.

use async_trait::async_trait;
use futures_util::stream::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions, QueueDeleteOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;

/// The request/reply contract L depends on (spec §4.G), so that the
/// dashboard service can be tested against a mock broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcCaller: Send + Sync {
    async fn call(
        &self,
        queue_name: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, AppError>;
}

/// A request/reply RPC client over one shared AMQP channel. Calls are
/// independent; publishes and consumer registrations are serialized through
/// the channel's own internal locking plus our own `Mutex` around queue
/// declare/delete, since `lapin::Channel` is cheaply cloneable but a reply
/// queue's lifecycle (declare -> consume -> delete) must not interleave with
/// another call's on the same queue name.
pub struct RpcClient {
    channel: Channel,
    declare_lock: Mutex<()>,
}

impl RpcClient {
    pub async fn connect(amqp_url: &str) -> Result<Self, AppError> {
        let connection = Connection::connect(amqp_url, ConnectionProperties::default())
            .await
            .map_err(|e| AppError::queue_error("Failed to connect to broker").wrap(e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| AppError::queue_error("Failed to open broker channel").wrap(e))?;

        Ok(Self { channel, declare_lock: Mutex::new(()) })
    }

    /// Performs one RPC call per spec §4.G's six-step protocol. The reply
    /// queue is released on every exit path (success, protocol violation,
    /// timeout, or cancellation).
    async fn call_impl(
        &self,
        queue_name: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, AppError> {
        let reply_queue = {
            let _guard = self.declare_lock.lock().await;
            self.channel
                .queue_declare(
                    "",
                    QueueDeclareOptions {
                        exclusive: true,
                        auto_delete: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| AppError::queue_error("Failed to declare reply queue").wrap(e))?
        };
        let reply_queue_name = reply_queue.name().to_string();

        let result = self
            .call_inner(queue_name, payload, timeout, &reply_queue_name)
            .await;

        let _ = self
            .channel
            .queue_delete(&reply_queue_name, QueueDeleteOptions::default())
            .await;

        result
    }

    async fn call_inner(
        &self,
        queue_name: &str,
        payload: &[u8],
        timeout: Duration,
        reply_queue_name: &str,
    ) -> Result<Vec<u8>, AppError> {
        let correlation_id = Uuid::new_v4().to_string();

        let mut consumer = self
            .channel
            .basic_consume(
                reply_queue_name,
                &format!("rpc-{correlation_id}"),
                BasicConsumeOptions { no_ack: true, ..Default::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| AppError::queue_error("Failed to start reply consumer").wrap(e))?;

        let properties = BasicProperties::default()
            .with_reply_to(reply_queue_name.into())
            .with_correlation_id(correlation_id.clone().into())
            .with_content_type("application/json".into())
            .with_delivery_mode(1); // transient: RPC is latency- not durability-oriented

        self.channel
            .basic_publish(
                "",
                queue_name,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await
            .map_err(|e| AppError::queue_error("Failed to publish RPC request").wrap(e))?;

        let wait = async {
            loop {
                match consumer.next().await {
                    Some(Ok(delivery)) => {
                        let reply_correlation = delivery
                            .properties
                            .correlation_id()
                            .as_ref()
                            .map(|id| id.to_string());
                        if reply_correlation.as_deref() == Some(correlation_id.as_str()) {
                            return Ok(delivery.data);
                        }
                        return Err(AppError::queue_error(
                            "Received reply with mismatched correlation ID",
                        ));
                    }
                    Some(Err(e)) => {
                        return Err(AppError::queue_error("Reply consumer error").wrap(e));
                    }
                    None => {
                        return Err(AppError::queue_error("Reply consumer closed unexpectedly"));
                    }
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(AppError::request_timeout("RPC call timed out")
                .with_context("queue", queue_name)),
        }
    }
}

#[async_trait]
impl RpcCaller for RpcClient {
    async fn call(
        &self,
        queue_name: &str,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>, AppError> {
        self.call_impl(queue_name, payload, timeout).await
    }
}

/// Shared handle, cloned into services that issue RPC calls.
pub type SharedRpcClient = Arc<dyn RpcCaller>;
