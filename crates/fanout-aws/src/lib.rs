//! AWS-backed fan-out client: STS for the caller identity, SNS for the topic
//! and SQS for subscribed queues.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod convert;

use convert::{remote_error, to_record, to_sns_attributes};

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_sqs::operation::get_queue_url::GetQueueUrlError;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sts::config::Credentials;
use proven_fanout::{
    Error, IdentityService, MessageAttributes, Operation, PolicyDocument, QueueHandle,
    QueueService, Result, SubscriptionRecord, TopicArn, TopicService,
};
use tracing::debug;

const CREDENTIALS_PROVIDER_NAME: &str = "proven-fanout";

/// Static access key pair.
#[derive(Clone)]
pub struct StaticCredentials {
    /// Access key id.
    pub access_key_id: String,

    /// Secret access key.
    pub secret_access_key: String,
}

impl Debug for StaticCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// Options for configuring an `AwsFanoutClient`.
#[derive(Clone, Debug)]
pub struct AwsClientOptions {
    /// Static credentials. The default provider chain is used when `None`.
    pub credentials: Option<StaticCredentials>,

    /// The AWS region every client calls, and the region of the topic.
    pub region: String,
}

/// One long-lived set of STS, SNS and SQS clients sharing a config.
#[derive(Clone, Debug)]
pub struct AwsFanoutClient {
    region: String,
    sns: aws_sdk_sns::Client,
    sqs: aws_sdk_sqs::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsFanoutClient {
    /// Creates a new `AwsFanoutClient` with the specified options.
    pub async fn new(
        AwsClientOptions {
            credentials,
            region,
        }: AwsClientOptions,
    ) -> Self {
        let mut loader = aws_config::from_env().region(Region::new(region.clone()));

        if let Some(StaticCredentials {
            access_key_id,
            secret_access_key,
        }) = credentials
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        let config = loader.load().await;

        Self {
            region,
            sns: aws_sdk_sns::Client::new(&config),
            sqs: aws_sdk_sqs::Client::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
        }
    }
}

#[async_trait]
impl IdentityService for AwsFanoutClient {
    fn region(&self) -> &str {
        &self.region
    }

    async fn resolve_account_id(&self) -> Result<String> {
        let resp = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| Error::Authentication(remote_error(Operation::ResolveAccount, e).into()))?;

        resp.account.ok_or(Error::MalformedResponse {
            operation: Operation::ResolveAccount,
            field: "Account",
        })
    }
}

#[async_trait]
impl TopicService for AwsFanoutClient {
    async fn create_topic(&self, name: &str) -> Result<String> {
        debug!(name, "creating topic");

        let resp = self
            .sns
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| remote_error(Operation::CreateTopic, e))?;

        resp.topic_arn.ok_or(Error::MalformedResponse {
            operation: Operation::CreateTopic,
            field: "TopicArn",
        })
    }

    async fn publish(
        &self,
        topic: &TopicArn,
        message: String,
        attributes: Option<MessageAttributes>,
    ) -> Result<()> {
        let attributes = attributes.map(to_sns_attributes).transpose()?;

        let resp = self
            .sns
            .publish()
            .topic_arn(topic.to_string())
            .message(message)
            .set_message_attributes(attributes)
            .send()
            .await
            .map_err(|e| remote_error(Operation::Publish, e))?;

        debug!(message_id = resp.message_id.as_deref(), "message published");

        Ok(())
    }

    async fn subscribe(&self, topic: &TopicArn, protocol: &str, endpoint: &str) -> Result<String> {
        let resp = self
            .sns
            .subscribe()
            .topic_arn(topic.to_string())
            .protocol(protocol)
            .endpoint(endpoint)
            .return_subscription_arn(true)
            .send()
            .await
            .map_err(|e| remote_error(Operation::Subscribe, e))?;

        resp.subscription_arn.ok_or(Error::MalformedResponse {
            operation: Operation::Subscribe,
            field: "SubscriptionArn",
        })
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        // Non-2xx statuses surface as SDK errors.
        self.sns
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(|e| remote_error(Operation::Unsubscribe, e))?;

        Ok(())
    }

    async fn list_subscriptions(&self, topic: &TopicArn) -> Result<Vec<SubscriptionRecord>> {
        let topic_arn = topic.to_string();
        let mut records = Vec::new();
        let mut next_token = None;

        loop {
            let resp = self
                .sns
                .list_subscriptions_by_topic()
                .topic_arn(&topic_arn)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| remote_error(Operation::ListSubscriptions, e))?;

            records.extend(resp.subscriptions.unwrap_or_default().into_iter().map(to_record));

            match resp.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl QueueService for AwsFanoutClient {
    async fn get_queue_by_name(&self, name: &str) -> Result<QueueHandle> {
        let url = self
            .sqs
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| {
                if e
                    .as_service_error()
                    .is_some_and(GetQueueUrlError::is_queue_does_not_exist)
                {
                    Error::QueueNotFound(name.to_string())
                } else {
                    remote_error(Operation::GetQueue, e)
                }
            })?
            .queue_url
            .ok_or(Error::MalformedResponse {
                operation: Operation::GetQueue,
                field: "QueueUrl",
            })?;

        let attributes: HashMap<String, String> = self
            .sqs
            .get_queue_attributes()
            .queue_url(&url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await
            .map_err(|e| remote_error(Operation::GetQueue, e))?
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect();

        let arn = attributes
            .get(QueueAttributeName::QueueArn.as_str())
            .cloned()
            .ok_or(Error::MalformedResponse {
                operation: Operation::GetQueue,
                field: "QueueArn",
            })?;

        Ok(QueueHandle {
            name: name.to_string(),
            url,
            arn,
            attributes,
        })
    }

    async fn set_queue_policy(&self, queue: &QueueHandle, policy: &PolicyDocument) -> Result<()> {
        debug!(queue = %queue.name, "replacing queue policy");

        self.sqs
            .set_queue_attributes()
            .queue_url(&queue.url)
            .attributes(QueueAttributeName::Policy, policy.to_json()?)
            .send()
            .await
            .map_err(|e| remote_error(Operation::SetQueuePolicy, e))?;

        Ok(())
    }
}
