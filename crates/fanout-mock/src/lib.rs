//! A mock implementation of the fan-out backend.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use proven_fanout::{
    Error, IdentityService, MessageAttributes, Operation, PolicyDocument, QueueHandle,
    QueueService, Result, SubscriptionRecord, TopicArn, TopicService, partition_for_region,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A message accepted by the mock topic service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublishedMessage {
    /// Topic ARN the message was published to.
    pub topic_arn: String,

    /// Message body.
    pub message: String,

    /// Attributes exactly as received.
    pub attributes: Option<MessageAttributes>,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Operation>,
    failures: HashSet<Operation>,
    policies: HashMap<String, String>,
    published: Vec<PublishedMessage>,
    queues: HashMap<String, QueueHandle>,
    subscriptions: Vec<SubscriptionRecord>,
    topics: HashSet<String>,
}

impl State {
    fn record(&mut self, operation: Operation) -> Result<()> {
        self.calls.push(operation);

        if self.failures.remove(&operation) {
            return Err(Error::RemoteService {
                operation,
                status: Some(500),
                source: "injected failure".into(),
            });
        }

        Ok(())
    }
}

/// In-memory topic, queue and identity services. Used for testing.
#[derive(Clone, Debug)]
pub struct MockFanoutClient {
    account_id: Option<String>,
    region: String,
    state: Arc<Mutex<State>>,
}

impl MockFanoutClient {
    /// Creates a mock whose credentials resolve to `account_id`.
    #[must_use]
    pub fn new<R, A>(region: R, account_id: A) -> Self
    where
        R: Into<String>,
        A: Into<String>,
    {
        Self {
            account_id: Some(account_id.into()),
            region: region.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Creates a mock whose identity lookup always fails.
    #[must_use]
    pub fn unauthenticated<R: Into<String>>(region: R) -> Self {
        Self {
            account_id: None,
            region: region.into(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Creates a queue and returns its handle.
    pub async fn create_queue<N: Into<String>>(&self, name: N) -> QueueHandle {
        let name = name.into();
        let account_id = self.account_id.clone().unwrap_or_default();

        let queue = QueueHandle {
            url: format!(
                "https://sqs.{}.amazonaws.com/{}/{}",
                self.region, account_id, name
            ),
            arn: format!(
                "arn:{}:sqs:{}:{}:{}",
                partition_for_region(&self.region),
                self.region,
                account_id,
                name
            ),
            attributes: HashMap::new(),
            name: name.clone(),
        };

        self.state.lock().await.queues.insert(name, queue.clone());

        queue
    }

    /// Sets a queue policy directly, bypassing the call log.
    pub async fn put_policy<A, P>(&self, queue_arn: A, policy: P)
    where
        A: Into<String>,
        P: Into<String>,
    {
        self.state
            .lock()
            .await
            .policies
            .insert(queue_arn.into(), policy.into());
    }

    /// Makes the next call of `operation` fail with a 500 status.
    pub async fn fail_next(&self, operation: Operation) {
        self.state.lock().await.failures.insert(operation);
    }

    /// Every remote call received so far, in order.
    pub async fn calls(&self) -> Vec<Operation> {
        self.state.lock().await.calls.clone()
    }

    /// Current policy of a queue, by queue ARN.
    pub async fn policy(&self, queue_arn: &str) -> Option<String> {
        self.state.lock().await.policies.get(queue_arn).cloned()
    }

    /// Every message published so far.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.state.lock().await.published.clone()
    }

    /// Topic ARNs created so far.
    pub async fn topics(&self) -> Vec<String> {
        self.state.lock().await.topics.iter().cloned().collect()
    }
}

#[async_trait]
impl IdentityService for MockFanoutClient {
    fn region(&self) -> &str {
        &self.region
    }

    async fn resolve_account_id(&self) -> Result<String> {
        self.state.lock().await.record(Operation::ResolveAccount)?;

        self.account_id
            .clone()
            .ok_or_else(|| Error::Authentication("invalid credentials".into()))
    }
}

#[async_trait]
impl TopicService for MockFanoutClient {
    async fn create_topic(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        state.record(Operation::CreateTopic)?;

        let account_id = self.account_id.clone().unwrap_or_default();
        let arn = TopicArn::new(self.region.clone(), account_id, name)?.to_string();
        state.topics.insert(arn.clone());

        Ok(arn)
    }

    async fn publish(
        &self,
        topic: &TopicArn,
        message: String,
        attributes: Option<MessageAttributes>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        state.record(Operation::Publish)?;

        state.published.push(PublishedMessage {
            topic_arn: topic.to_string(),
            message,
            attributes,
        });

        Ok(())
    }

    async fn subscribe(&self, topic: &TopicArn, protocol: &str, endpoint: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        state.record(Operation::Subscribe)?;

        let subscription_arn = format!("{topic}:{}", Uuid::new_v4());

        state.subscriptions.push(SubscriptionRecord {
            subscription_arn: Some(subscription_arn.clone()),
            owner: Some(topic.account_id().to_string()),
            protocol: Some(protocol.to_string()),
            endpoint: Some(endpoint.to_string()),
            topic_arn: Some(topic.to_string()),
        });

        Ok(subscription_arn)
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.record(Operation::Unsubscribe)?;

        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|s| s.subscription_arn.as_deref() != Some(subscription_arn));

        if state.subscriptions.len() == before {
            return Err(Error::RemoteService {
                operation: Operation::Unsubscribe,
                status: Some(404),
                source: format!("subscription {subscription_arn} does not exist").into(),
            });
        }

        Ok(())
    }

    async fn list_subscriptions(&self, topic: &TopicArn) -> Result<Vec<SubscriptionRecord>> {
        let mut state = self.state.lock().await;
        state.record(Operation::ListSubscriptions)?;

        let topic_arn = topic.to_string();

        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.topic_arn.as_deref() == Some(topic_arn.as_str()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QueueService for MockFanoutClient {
    async fn get_queue_by_name(&self, name: &str) -> Result<QueueHandle> {
        let mut state = self.state.lock().await;
        state.record(Operation::GetQueue)?;

        state
            .queues
            .get(name)
            .cloned()
            .ok_or_else(|| Error::QueueNotFound(name.to_string()))
    }

    async fn set_queue_policy(&self, queue: &QueueHandle, policy: &PolicyDocument) -> Result<()> {
        let mut state = self.state.lock().await;
        state.record(Operation::SetQueuePolicy)?;

        state.policies.insert(queue.arn.clone(), policy.to_json()?);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_queue_is_not_found() {
        let client = MockFanoutClient::new("us-east-1", "123456789012");

        let result = client.get_queue_by_name("missing").await;

        assert!(matches!(result, Err(Error::QueueNotFound(name)) if name == "missing"));
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let client = MockFanoutClient::new("us-east-1", "123456789012");
        client.fail_next(Operation::ResolveAccount).await;

        assert!(client.resolve_account_id().await.is_err());
        assert_eq!(client.resolve_account_id().await.unwrap(), "123456789012");
        assert_eq!(
            client.calls().await,
            vec![Operation::ResolveAccount, Operation::ResolveAccount]
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_subscription_fails() {
        let client = MockFanoutClient::new("us-east-1", "123456789012");

        let result = client.unsubscribe("arn:aws:sns:us-east-1:123456789012:orders:nope").await;

        assert!(matches!(
            result,
            Err(Error::RemoteService {
                status: Some(404),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_queue_arn_uses_region_partition() {
        let client = MockFanoutClient::new("cn-north-1", "123456789012");

        let queue = client.create_queue("orders-queue").await;

        assert_eq!(queue.arn, "arn:aws-cn:sqs:cn-north-1:123456789012:orders-queue");
    }
}
