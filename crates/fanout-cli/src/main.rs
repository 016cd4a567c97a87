//! CLI binary to manage a fan-out topic and its queue subscribers.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use clap::{Parser, Subcommand};
use proven_fanout::{AttributeValue, FanoutOptions, FanoutPublisher, MessageAttributes};
use proven_fanout_aws::{AwsClientOptions, AwsFanoutClient, StaticCredentials};
use tracing::info;

/// CLI-specific error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Attribute argument is not `name=value`
    #[error("invalid attribute `{0}`, expected name=value")]
    Attribute(String),

    /// Only one half of a static key pair was given
    #[error("both --access-key-id and --secret-access-key must be set")]
    Credentials,

    /// Fan-out library error
    #[error(transparent)]
    Fanout(#[from] proven_fanout::Error),
}

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// AWS access key id (default provider chain if unset)
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    access_key_id: Option<String>,

    /// AWS region of the topic
    #[arg(long, default_value = "us-east-1", env = "PROVEN_FANOUT_REGION")]
    region: String,

    /// AWS secret access key (default provider chain if unset)
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Topic name
    #[arg(long, env = "PROVEN_FANOUT_TOPIC")]
    topic: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Create the topic if it does not exist
    CreateTopic,

    /// List the topic's subscriptions
    ListSubscriptions,

    /// Publish a message to the topic
    Publish {
        /// Message body
        message: String,

        /// String attribute as name=value (repeatable)
        #[arg(long = "attribute", short = 'a')]
        attributes: Vec<String>,
    },

    /// Subscribe a queue to the topic, replacing its access policy
    Subscribe {
        /// Queue name
        queue: String,
    },
}

fn parse_attributes(raw: Vec<String>) -> Result<MessageAttributes, Error> {
    raw.into_iter()
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                Ok((name.to_string(), AttributeValue::from(value)))
            }
            _ => Err(Error::Attribute(pair)),
        })
        .collect()
}

fn credentials(args: &Args) -> Result<Option<StaticCredentials>, Error> {
    match (&args.access_key_id, &args.secret_access_key) {
        (Some(access_key_id), Some(secret_access_key)) => Ok(Some(StaticCredentials {
            access_key_id: access_key_id.clone(),
            secret_access_key: secret_access_key.clone(),
        })),
        (None, None) => Ok(None),
        _ => Err(Error::Credentials),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let client = AwsFanoutClient::new(AwsClientOptions {
        credentials: credentials(&args)?,
        region: args.region,
    })
    .await;

    let mut publisher = FanoutPublisher::new(FanoutOptions {
        client,
        topic: args.topic,
    })
    .await?;

    match args.command {
        Command::CreateTopic => publisher.create_topic().await?,
        Command::ListSubscriptions => {
            for subscription in publisher.list_subscriptions().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    subscription.subscription_arn.unwrap_or_default(),
                    subscription.protocol.unwrap_or_default(),
                    subscription.endpoint.unwrap_or_default(),
                    subscription.owner.unwrap_or_default(),
                );
            }
        }
        Command::Publish {
            message,
            attributes,
        } => {
            let attributes = parse_attributes(attributes)?;
            publisher.publish(message, Some(attributes)).await?;
            info!(topic_arn = %publisher.topic_arn(), "message published");
        }
        Command::Subscribe { queue } => publisher.subscribe(&queue).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        let attributes =
            parse_attributes(vec!["region=eu".to_string(), "note=a=b".to_string()]).unwrap();

        assert_eq!(attributes["region"], AttributeValue::from("eu"));
        assert_eq!(attributes["note"], AttributeValue::from("a=b"));
    }

    #[test]
    fn test_parse_attributes_rejects_missing_name() {
        assert!(matches!(
            parse_attributes(vec!["=eu".to_string()]),
            Err(Error::Attribute(_))
        ));
        assert!(matches!(
            parse_attributes(vec!["region".to_string()]),
            Err(Error::Attribute(_))
        ));
    }

    #[test]
    fn test_args_parse_subcommand() {
        let args = Args::try_parse_from([
            "proven-fanout",
            "--topic",
            "orders",
            "--region",
            "eu-west-1",
            "subscribe",
            "orders-queue",
        ])
        .unwrap();

        assert_eq!(args.region, "eu-west-1");
        assert!(matches!(args.command, Command::Subscribe { queue } if queue == "orders-queue"));
    }

    fn args(access_key_id: Option<&str>, secret_access_key: Option<&str>) -> Args {
        Args {
            access_key_id: access_key_id.map(str::to_string),
            region: "us-east-1".to_string(),
            secret_access_key: secret_access_key.map(str::to_string),
            topic: "orders".to_string(),
            command: Command::CreateTopic,
        }
    }

    #[test]
    fn test_half_credentials_rejected() {
        assert!(matches!(
            credentials(&args(Some("AKIDEXAMPLE"), None)),
            Err(Error::Credentials)
        ));
        assert!(matches!(
            credentials(&args(None, Some("secret"))),
            Err(Error::Credentials)
        ));
    }

    #[test]
    fn test_credentials() {
        assert!(matches!(credentials(&args(None, None)), Ok(None)));

        let credentials = credentials(&args(Some("AKIDEXAMPLE"), Some("secret")))
            .unwrap()
            .unwrap();

        assert_eq!(credentials.access_key_id, "AKIDEXAMPLE");
        assert_eq!(credentials.secret_access_key, "secret");
    }
}
