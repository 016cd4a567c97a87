use crate::{Error, Result};

use std::fmt::{Display, Formatter, Result as FmtResult};

const FIFO_SUFFIX: &str = ".fifo";
const MAX_TOPIC_NAME_LEN: usize = 256;

/// Returns the ARN partition a region belongs to.
#[must_use]
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else {
        "aws"
    }
}

/// Identity of an SNS topic.
///
/// Renders as `arn:{partition}:sns:{region}:{account}:{name}`. Every field is
/// derived from the region, account id and topic name given to [`TopicArn::new`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TopicArn {
    partition: &'static str,
    region: String,
    account_id: String,
    name: String,
}

impl TopicArn {
    /// Creates a topic identity.
    ///
    /// # Errors
    ///
    /// Returns an error if [`TopicArn::validate`] rejects the region or name.
    pub fn new<R, A, N>(region: R, account_id: A, name: N) -> Result<Self>
    where
        R: Into<String>,
        A: Into<String>,
        N: Into<String>,
    {
        let region = region.into();
        let name = name.into();

        Self::validate(&region, &name)?;

        Ok(Self {
            partition: partition_for_region(&region),
            region,
            account_id: account_id.into(),
            name,
        })
    }

    /// Checks a region and topic name without building an identity.
    ///
    /// Names are 1 to 256 characters of ASCII alphanumerics, hyphens or
    /// underscores, optionally ending in `.fifo`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRegion` for an empty region and
    /// `Error::InvalidTopicName` for an unusable name.
    pub fn validate(region: &str, name: &str) -> Result<()> {
        if region.is_empty() {
            return Err(Error::InvalidRegion(region.to_string()));
        }

        if !is_valid_topic_name(name) {
            return Err(Error::InvalidTopicName(name.to_string()));
        }

        Ok(())
    }

    /// The account the topic belongs to.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// The topic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

}

impl Display for TopicArn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "arn:{}:sns:{}:{}:{}",
            self.partition, self.region, self.account_id, self.name
        )
    }
}

fn is_valid_topic_name(name: &str) -> bool {
    let base = name.strip_suffix(FIFO_SUFFIX).unwrap_or(name);

    !base.is_empty()
        && name.len() <= MAX_TOPIC_NAME_LEN
        && base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_arn_format() {
        let arn = TopicArn::new("us-east-1", "123456789012", "orders").unwrap();

        assert_eq!(arn.to_string(), "arn:aws:sns:us-east-1:123456789012:orders");
    }

    #[test]
    fn test_topic_arn_is_deterministic() {
        let first = TopicArn::new("eu-west-2", "210987654321", "audit_log").unwrap();
        let second = TopicArn::new("eu-west-2", "210987654321", "audit_log").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_partition_follows_region() {
        let china = TopicArn::new("cn-north-1", "123456789012", "orders").unwrap();
        let gov = TopicArn::new("us-gov-west-1", "123456789012", "orders").unwrap();

        assert_eq!(china.to_string(), "arn:aws-cn:sns:cn-north-1:123456789012:orders");
        assert_eq!(
            gov.to_string(),
            "arn:aws-us-gov:sns:us-gov-west-1:123456789012:orders"
        );
    }

    #[test]
    fn test_rejects_invalid_names() {
        assert!(matches!(
            TopicArn::new("us-east-1", "123456789012", ""),
            Err(Error::InvalidTopicName(_))
        ));
        assert!(matches!(
            TopicArn::new("us-east-1", "123456789012", "orders:v2"),
            Err(Error::InvalidTopicName(_))
        ));
        assert!(matches!(
            TopicArn::new("us-east-1", "123456789012", "a".repeat(257)),
            Err(Error::InvalidTopicName(_))
        ));
        assert!(TopicArn::new("us-east-1", "123456789012", "a".repeat(256)).is_ok());
    }

    #[test]
    fn test_accepts_fifo_suffix() {
        let arn = TopicArn::new("us-east-1", "123456789012", "orders.fifo").unwrap();

        assert_eq!(
            arn.to_string(),
            "arn:aws:sns:us-east-1:123456789012:orders.fifo"
        );
        assert!(matches!(
            TopicArn::new("us-east-1", "123456789012", ".fifo"),
            Err(Error::InvalidTopicName(_))
        ));
        assert!(matches!(
            TopicArn::new("us-east-1", "123456789012", "orders.v2"),
            Err(Error::InvalidTopicName(_))
        ));
    }

    #[test]
    fn test_rejects_empty_region() {
        assert!(matches!(
            TopicArn::new("", "123456789012", "orders"),
            Err(Error::InvalidRegion(_))
        ));
    }
}
