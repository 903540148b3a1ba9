use crate::error::{ErrorKind, ServiceError};
use serde::Serialize;

/// Result of one item in a best-effort batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum ItemOutcome {
    Ok,
    CapacityExceeded,
    InvalidState(String),
    Failed(String),
}

impl From<&ServiceError> for ItemOutcome {
    fn from(err: &ServiceError) -> Self {
        match err.kind() {
            ErrorKind::Capacity => ItemOutcome::CapacityExceeded,
            ErrorKind::StateConflict => ItemOutcome::InvalidState(err.to_string()),
            _ => ItemOutcome::Failed(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub id: i64,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Tally of a batch; items never abort their siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub success: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
}

impl BatchOutcome {
    pub fn record<T>(&mut self, id: i64, result: &Result<T, ServiceError>) {
        let outcome = match result {
            Ok(_) => {
                self.success += 1;
                ItemOutcome::Ok
            }
            Err(err) => {
                self.failed += 1;
                if err.kind() == ErrorKind::Internal {
                    tracing::error!(id, error = %err, "Batch item failed");
                }
                ItemOutcome::from(err)
            }
        };
        self.items.push(BatchItem { id, outcome });
    }

    pub fn failed_ids(&self) -> Vec<i64> {
        self.items
            .iter()
            .filter(|item| item.outcome != ItemOutcome::Ok)
            .map(|item| item.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tallies_each_item() {
        let mut batch = BatchOutcome::default();
        batch.record::<()>(1, &Ok(()));
        batch.record::<()>(2, &Err(ServiceError::CapacityExceeded));
        batch.record::<()>(3, &Err(ServiceError::transition("confirmed", "confirmed")));

        assert_eq!(batch.success, 1);
        assert_eq!(batch.failed, 2);
        assert_eq!(batch.failed_ids(), vec![2, 3]);
        assert_eq!(batch.items[1].outcome, ItemOutcome::CapacityExceeded);
        assert!(matches!(batch.items[2].outcome, ItemOutcome::InvalidState(_)));
    }
}
