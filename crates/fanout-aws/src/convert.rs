use std::collections::HashMap;
use std::error::Error as StdError;

use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use aws_sdk_sns::primitives::Blob;
use aws_sdk_sns::types::{MessageAttributeValue, Subscription};
use proven_fanout::{AttributeValue, Error, MessageAttributes, Operation, SubscriptionRecord};

/// Maps an SDK failure to a remote-service error for the given operation.
pub fn remote_error<E>(operation: Operation, error: SdkError<E>) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    let status = error
        .raw_response()
        .map(|response| response.status().as_u16());

    Error::RemoteService {
        operation,
        status,
        source: DisplayErrorContext(error).to_string().into(),
    }
}

pub fn to_sns_attributes(
    attributes: MessageAttributes,
) -> Result<HashMap<String, MessageAttributeValue>, Error> {
    attributes
        .into_iter()
        .map(|(name, value)| to_sns_attribute(&value).map(|value| (name, value)))
        .collect()
}

fn to_sns_attribute(value: &AttributeValue) -> Result<MessageAttributeValue, Error> {
    MessageAttributeValue::builder()
        .data_type(value.data_type())
        .set_string_value(value.string_value())
        .set_binary_value(value.binary_value().map(|bytes| Blob::new(bytes.to_vec())))
        .build()
        .map_err(|e| Error::remote(Operation::Publish, e))
}

pub fn to_record(subscription: Subscription) -> SubscriptionRecord {
    SubscriptionRecord {
        subscription_arn: subscription.subscription_arn,
        owner: subscription.owner,
        protocol: subscription.protocol,
        endpoint: subscription.endpoint,
        topic_arn: subscription.topic_arn,
    }
}
