//! Fan-out publisher over a pub/sub topic with queue subscribers.
//!
//! A [`FanoutPublisher`] owns one topic, publishes messages to it, and
//! subscribes queues so each receives a copy of every published message.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod attribute;
mod client;
mod error;
mod policy;
mod registry;
mod topic;

pub use attribute::{AttributeValue, MessageAttributes, normalize as normalize_attributes};
pub use client::{
    FanoutClient, IdentityService, QUEUE_PROTOCOL, QueueHandle, QueueService, SubscriptionRecord,
    TopicService,
};
pub use error::{BoxError, Error, ErrorKind, Operation, Result};
pub use policy::{ArnEquals, Condition, PolicyDocument, Principal, Statement};
pub use registry::{Subscriber, SubscriberRegistry};
pub use topic::{TopicArn, partition_for_region};

use tracing::{debug, info, warn};

/// Options for configuring a `FanoutPublisher`.
#[derive(Clone, Debug)]
pub struct FanoutOptions<C>
where
    C: FanoutClient,
{
    /// Backend carrying the credentials, region and sessions for all remote
    /// calls. The topic lives in the client's region.
    pub client: C,

    /// Topic name.
    pub topic: String,
}

/// Publishes to a topic and manages the queues subscribed to it.
#[derive(Debug)]
pub struct FanoutPublisher<C>
where
    C: FanoutClient,
{
    client: C,
    subscribers: SubscriberRegistry,
    topic_arn: TopicArn,
}

impl<C> FanoutPublisher<C>
where
    C: FanoutClient,
{
    /// Creates a new `FanoutPublisher`, resolving the account id once.
    ///
    /// # Errors
    ///
    /// Returns an input error, before any remote call, if the client's region
    /// or the topic name is unusable, and `Error::Authentication` if the
    /// identity lookup fails.
    pub async fn new(FanoutOptions { client, topic }: FanoutOptions<C>) -> Result<Self> {
        TopicArn::validate(client.region(), &topic)?;

        let account_id = client.resolve_account_id().await?;
        let topic_arn = TopicArn::new(client.region(), account_id, topic)?;

        debug!(%topic_arn, "fanout publisher ready");

        Ok(Self {
            client,
            subscribers: SubscriberRegistry::new(),
            topic_arn,
        })
    }

    /// The topic this publisher owns.
    #[must_use]
    pub const fn topic_arn(&self) -> &TopicArn {
        &self.topic_arn
    }

    /// Queues subscribed through this publisher.
    #[must_use]
    pub const fn subscribers(&self) -> &SubscriberRegistry {
        &self.subscribers
    }

    /// Creates the topic if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the topic service rejects the request.
    pub async fn create_topic(&self) -> Result<()> {
        let created = self.client.create_topic(self.topic_arn.name()).await?;

        if created != self.topic_arn.to_string() {
            warn!(
                expected = %self.topic_arn,
                %created,
                "topic service returned an unexpected topic arn"
            );
        }

        info!(topic_arn = %self.topic_arn, "topic created");

        Ok(())
    }

    /// Publishes one message to the topic.
    ///
    /// An empty attribute map is sent exactly like no attributes. Nothing is
    /// validated locally and nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteService` if the topic service rejects the message.
    pub async fn publish<M>(&self, message: M, attributes: Option<MessageAttributes>) -> Result<()>
    where
        M: Into<String> + Send,
    {
        let attributes = normalize_attributes(attributes);

        debug!(
            topic_arn = %self.topic_arn,
            attributes = attributes.as_ref().map_or(0, MessageAttributes::len),
            "publishing message"
        );

        self.client
            .publish(&self.topic_arn, message.into(), attributes)
            .await
    }

    /// Subscribes a queue to the topic.
    ///
    /// Resolves the queue, replaces its access policy with one that lets this
    /// topic send into it, subscribes it, and records it. The policy write is
    /// not rolled back if the subscription fails, so a failed call can leave
    /// the queue's previous policy overwritten. Subscribing the same queue
    /// twice creates a second remote subscription and replaces the registry
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::QueueNotFound` if no such queue exists, or the error of
    /// whichever remote call failed.
    pub async fn subscribe(&mut self, queue_name: &str) -> Result<()> {
        let queue = self.client.get_queue_by_name(queue_name).await?;

        let policy = PolicyDocument::allow_topic_to_queue(&queue.arn, self.topic_arn.to_string());
        self.client.set_queue_policy(&queue, &policy).await?;

        let subscription_arn = match self
            .client
            .subscribe(&self.topic_arn, QUEUE_PROTOCOL, &queue.arn)
            .await
        {
            Ok(subscription_arn) => subscription_arn,
            Err(e) => {
                warn!(
                    queue = queue_name,
                    queue_arn = %queue.arn,
                    "subscribe failed after queue policy was replaced: {e}"
                );
                return Err(e);
            }
        };

        info!(queue = queue_name, %subscription_arn, "queue subscribed");

        self.subscribers.insert(
            queue_name,
            Subscriber {
                queue,
                subscription_arn,
            },
        );

        Ok(())
    }

    /// Unsubscribes a queue previously subscribed through this publisher.
    ///
    /// Targets the subscription recorded at subscribe time without consulting
    /// the topic service, then forgets the queue.
    ///
    /// # Errors
    ///
    /// Returns `Error::SubscriberNotFound` without any remote call if the
    /// queue is not registered, or `Error::RemoteService` if the topic
    /// service rejects the request.
    pub async fn unsubscribe(&mut self, queue_name: &str) -> Result<()> {
        let subscription_arn = self
            .subscribers
            .get(queue_name)
            .map(|subscriber| subscriber.subscription_arn.clone())
            .ok_or_else(|| Error::SubscriberNotFound(queue_name.to_string()))?;

        self.client.unsubscribe(&subscription_arn).await?;
        self.subscribers.remove(queue_name);

        info!(queue = queue_name, %subscription_arn, "queue unsubscribed");

        Ok(())
    }

    /// Lists every current subscription of the topic, as reported remotely.
    ///
    /// # Errors
    ///
    /// Returns `Error::RemoteService` if the listing fails.
    pub async fn list_subscriptions(&self) -> Result<Vec<SubscriptionRecord>> {
        self.client.list_subscriptions(&self.topic_arn).await
    }
}
