//! Per-campaign write serialisation.

use std::sync::Arc;

use atlas_domain::CampaignId;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per campaign.
///
/// Writers hold the guard while they load the campaign snapshot, validate,
/// and commit, so every check runs against the state the write lands on.
/// Campaigns never contend with each other.
#[derive(Default)]
pub struct CampaignLocks {
    locks: DashMap<CampaignId, Arc<Mutex<()>>>,
}

impl CampaignLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to a campaign.
    pub async fn acquire(&self, campaign_id: CampaignId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(campaign_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Number of campaigns that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_campaign_is_exclusive() {
        let locks = Arc::new(CampaignLocks::new());
        let campaign = CampaignId::new();

        let guard = locks.acquire(campaign).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(campaign).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_campaigns_do_not_block() {
        let locks = CampaignLocks::new();
        let _first = locks.acquire(CampaignId::new()).await;
        let second = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(CampaignId::new()),
        )
        .await;

        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
