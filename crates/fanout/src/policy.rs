use crate::Result;

use serde::{Deserialize, Serialize};

const POLICY_VERSION: &str = "2012-10-17";

/// Access policy attached to a queue.
///
/// Built by [`PolicyDocument::allow_topic_to_queue`], which grants
/// `sqs:SendMessage` on a single queue to senders whose source ARN is a
/// single topic.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    pub version: String,

    /// Policy statements.
    pub statement: Vec<Statement>,
}

/// A single policy statement.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// `Allow` or `Deny`.
    pub effect: String,

    /// Principals the statement applies to.
    pub principal: Principal,

    /// Permitted action.
    pub action: String,

    /// Resource ARN the action applies to.
    pub resource: String,

    /// Conditions on the request.
    pub condition: Condition,
}

/// Statement principal.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Principal {
    /// AWS principal pattern.
    #[serde(rename = "AWS")]
    pub aws: String,
}

/// Statement condition block.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Condition {
    /// ARN equality condition.
    #[serde(rename = "ArnEquals")]
    pub arn_equals: ArnEquals,
}

/// `ArnEquals` condition operator.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ArnEquals {
    /// Required source ARN of the sender.
    #[serde(rename = "aws:SourceArn")]
    pub source_arn: String,
}

impl PolicyDocument {
    /// Policy letting `topic_arn` send messages into `queue_arn`.
    #[must_use]
    pub fn allow_topic_to_queue<Q, T>(queue_arn: Q, topic_arn: T) -> Self
    where
        Q: Into<String>,
        T: Into<String>,
    {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                effect: "Allow".to_string(),
                principal: Principal {
                    aws: "*".to_string(),
                },
                action: "sqs:SendMessage".to_string(),
                resource: queue_arn.into(),
                condition: Condition {
                    arn_equals: ArnEquals {
                        source_arn: topic_arn.into(),
                    },
                },
            }],
        }
    }

    /// Serializes the policy to its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_policy_json_shape() {
        let policy = PolicyDocument::allow_topic_to_queue(
            "arn:aws:sqs:us-east-1:123456789012:orders-queue",
            "arn:aws:sns:us-east-1:123456789012:orders",
        );

        let value: serde_json::Value = serde_json::from_str(&policy.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": "sqs:SendMessage",
                    "Resource": "arn:aws:sqs:us-east-1:123456789012:orders-queue",
                    "Condition": {
                        "ArnEquals": {
                            "aws:SourceArn": "arn:aws:sns:us-east-1:123456789012:orders"
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn test_policy_parses_back() {
        let policy = PolicyDocument::allow_topic_to_queue("queue", "topic");
        let parsed: PolicyDocument = serde_json::from_str(&policy.to_json().unwrap()).unwrap();

        assert_eq!(parsed.statement.len(), 1);
        assert_eq!(parsed.statement[0].condition.arn_equals.source_arn, "topic");
    }
}
