use crate::attribute::MessageAttributes;
use crate::policy::PolicyDocument;
use crate::topic::TopicArn;
use crate::Result;

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

/// Subscription protocol for queue delivery.
pub const QUEUE_PROTOCOL: &str = "sqs";

/// Local view of a remote queue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueueHandle {
    /// Queue name.
    pub name: String,

    /// Queue URL used to address queue-service calls.
    pub url: String,

    /// Queue ARN used as the subscription endpoint.
    pub arn: String,

    /// Queue attributes as reported when the handle was resolved.
    pub attributes: HashMap<String, String>,
}

/// Subscription as reported by the topic service.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubscriptionRecord {
    /// Subscription ARN (or `PendingConfirmation`).
    pub subscription_arn: Option<String>,

    /// Account that owns the subscription.
    pub owner: Option<String>,

    /// Delivery protocol.
    pub protocol: Option<String>,

    /// Delivery endpoint.
    pub endpoint: Option<String>,

    /// Topic the subscription belongs to.
    pub topic_arn: Option<String>,
}

/// Resolves the account behind the configured credentials.
#[async_trait]
pub trait IdentityService
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// Region every remote call is sent to.
    fn region(&self) -> &str;

    /// Returns the caller's account id.
    async fn resolve_account_id(&self) -> Result<String>;
}

/// Topic-side operations.
#[async_trait]
pub trait TopicService
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// Creates the named topic (idempotent) and returns its ARN.
    async fn create_topic(&self, name: &str) -> Result<String>;

    /// Publishes one message to the topic.
    async fn publish(
        &self,
        topic: &TopicArn,
        message: String,
        attributes: Option<MessageAttributes>,
    ) -> Result<()>;

    /// Subscribes an endpoint to the topic and returns the subscription ARN.
    async fn subscribe(&self, topic: &TopicArn, protocol: &str, endpoint: &str) -> Result<String>;

    /// Removes a subscription.
    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()>;

    /// Lists every subscription of the topic.
    async fn list_subscriptions(&self, topic: &TopicArn) -> Result<Vec<SubscriptionRecord>>;
}

/// Queue-side operations.
#[async_trait]
pub trait QueueService
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// Resolves a queue by name.
    async fn get_queue_by_name(&self, name: &str) -> Result<QueueHandle>;

    /// Replaces the queue's access policy.
    async fn set_queue_policy(&self, queue: &QueueHandle, policy: &PolicyDocument) -> Result<()>;
}

/// Everything a `FanoutPublisher` needs from its backend.
pub trait FanoutClient: IdentityService + QueueService + TopicService {}

impl<T> FanoutClient for T where T: IdentityService + QueueService + TopicService {}
