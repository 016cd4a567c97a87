use crate::client::QueueHandle;

use std::collections::HashMap;

/// A queue subscribed through a publisher.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscriber {
    /// The queue as resolved at subscribe time.
    pub queue: QueueHandle,

    /// Subscription ARN returned by the topic service.
    pub subscription_arn: String,
}

/// In-memory map of queue name to subscriber.
///
/// Not persisted and never re-validated, so entries go stale if the
/// subscription is changed by another process.
#[derive(Clone, Debug, Default)]
pub struct SubscriberRegistry {
    entries: HashMap<String, Subscriber>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a subscriber by queue name.
    #[must_use]
    pub fn get(&self, queue_name: &str) -> Option<&Subscriber> {
        self.entries.get(queue_name)
    }

    /// Returns `true` if the queue is registered.
    #[must_use]
    pub fn contains(&self, queue_name: &str) -> bool {
        self.entries.contains_key(queue_name)
    }

    /// Inserts a subscriber, returning the one it replaced.
    pub fn insert<N: Into<String>>(
        &mut self,
        queue_name: N,
        subscriber: Subscriber,
    ) -> Option<Subscriber> {
        self.entries.insert(queue_name.into(), subscriber)
    }

    /// Removes a subscriber.
    pub fn remove(&mut self, queue_name: &str) -> Option<Subscriber> {
        self.entries.remove(queue_name)
    }

    /// Number of registered queues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber(subscription_arn: &str) -> Subscriber {
        Subscriber {
            queue: QueueHandle {
                name: "orders-queue".to_string(),
                url: "https://sqs.us-east-1.amazonaws.com/123456789012/orders-queue".to_string(),
                arn: "arn:aws:sqs:us-east-1:123456789012:orders-queue".to_string(),
                attributes: HashMap::new(),
            },
            subscription_arn: subscription_arn.to_string(),
        }
    }

    #[test]
    fn test_insert_replaces_existing_entry() {
        let mut registry = SubscriberRegistry::new();

        assert!(registry.insert("orders-queue", subscriber("first")).is_none());
        let previous = registry.insert("orders-queue", subscriber("second"));

        assert_eq!(previous.map(|s| s.subscription_arn).as_deref(), Some("first"));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("orders-queue").map(|s| s.subscription_arn.as_str()),
            Some("second")
        );
    }

    #[test]
    fn test_remove() {
        let mut registry = SubscriberRegistry::new();
        registry.insert("orders-queue", subscriber("first"));

        assert!(registry.remove("orders-queue").is_some());
        assert!(registry.remove("orders-queue").is_none());
        assert!(registry.is_empty());
        assert!(!registry.contains("orders-queue"));
    }
}
