use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::database::models::YearTotals;

/// Per `(user, year)` application totals. Balances are never cached; they
/// are always read fresh next to these totals.
#[derive(Clone)]
pub struct StatsCache {
    cache: Cache<(Uuid, i32), YearTotals>,
}

impl StatsCache {
    pub fn new(max_capacity: u64, ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();
        Self { cache }
    }

    pub async fn get(&self, user_id: Uuid, year: i32) -> Option<YearTotals> {
        self.cache.get(&(user_id, year)).await
    }

    pub async fn insert(&self, user_id: Uuid, year: i32, totals: YearTotals) {
        self.cache.insert((user_id, year), totals).await;
    }

    pub async fn invalidate(&self, user_id: Uuid, year: i32) {
        self.cache.invalidate(&(user_id, year)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::Days;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn invalidation_is_scoped_to_user_and_year() {
        let cache = StatsCache::new(100, 60);
        let user = Uuid::new_v4();
        let totals = YearTotals {
            used_days: Days::whole(3),
            approved_applications: 1,
            ..YearTotals::default()
        };

        cache.insert(user, 2025, totals.clone()).await;
        cache.insert(user, 2026, totals.clone()).await;
        cache.invalidate(user, 2025).await;

        assert_eq!(cache.get(user, 2025).await, None);
        assert_eq!(cache.get(user, 2026).await, Some(totals));
        assert_eq!(cache.get(Uuid::new_v4(), 2026).await, None);
    }
}
