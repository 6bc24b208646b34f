use crate::entities::subscriptions;
use crate::error::{AppError, AppResult};
use crate::models::NewSubscription;
use crate::repositories::{SubscriptionRepository, SubscriptionStore};
use crate::utils::{months_overlap, truncate_to_month};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

/// Concrete service wired to the sea-orm repository.
pub type DbSubscriptionService = SubscriptionService<SubscriptionRepository>;

#[derive(Clone)]
pub struct SubscriptionService<S> {
    store: S,
}

impl<S: SubscriptionStore> SubscriptionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, data: NewSubscription) -> AppResult<subscriptions::Model> {
        log::info!(
            "Creating subscription service={} user={}",
            data.service_name,
            data.user_id
        );
        self.store.create(data).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<subscriptions::Model> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id} not found")))
    }

    pub async fn update(&self, id: i64, data: NewSubscription) -> AppResult<subscriptions::Model> {
        log::info!("Updating subscription id={id}");
        self.store
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id} not found")))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        log::info!("Deleting subscription id={id}");
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("subscription {id} not found")))
        }
    }

    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<subscriptions::Model>> {
        self.store.list(limit, offset).await
    }

    /// Total cost of the matching subscriptions over the inclusive month
    /// period: `price x overlapping months` per record. Open-ended records
    /// count through the current month. Records outside the period simply
    /// contribute nothing; zero is a valid total, not an error.
    pub async fn sum_cost(
        &self,
        user_id: Option<Uuid>,
        service_name: Option<&str>,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> AppResult<i64> {
        log::info!(
            "Summing subscription cost user={:?} service={:?}",
            user_id,
            service_name
        );
        self.sum_cost_at(
            user_id,
            service_name,
            period_start,
            period_end,
            Utc::now().date_naive(),
        )
        .await
    }

    /// Evaluation date is a parameter so tests control what "now" means for
    /// open-ended subscriptions.
    async fn sum_cost_at(
        &self,
        user_id: Option<Uuid>,
        service_name: Option<&str>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<i64> {
        let subs = self.store.find_filtered(user_id, service_name).await?;

        let p_start = truncate_to_month(period_start);
        let p_end = truncate_to_month(period_end);

        let mut total: i64 = 0;
        for sub in subs {
            let s_start = truncate_to_month(sub.start_date);
            let s_end = truncate_to_month(sub.end_date.unwrap_or(today));

            let months = months_overlap(s_start, s_end, p_start, p_end);
            if months > 0 {
                total += months * sub.price;
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::subscriptions::Model;
    use std::sync::Mutex;

    /// In-memory stand-in for the sea-orm repository, mirroring its
    /// contract: assigned ids, id-ordered listing, AND-combined filters.
    struct FakeStore {
        subs: Mutex<Vec<Model>>,
        next_id: Mutex<i64>,
    }

    impl FakeStore {
        fn new(subs: Vec<Model>) -> Self {
            let next_id = subs.iter().map(|s| s.id).max().unwrap_or(0) + 1;
            Self {
                subs: Mutex::new(subs),
                next_id: Mutex::new(next_id),
            }
        }

        fn empty() -> Self {
            Self::new(Vec::new())
        }
    }

    impl SubscriptionStore for FakeStore {
        async fn create(&self, data: NewSubscription) -> AppResult<Model> {
            let mut next_id = self.next_id.lock().unwrap();
            let model = Model {
                id: *next_id,
                service_name: data.service_name,
                price: data.price,
                user_id: data.user_id,
                start_date: data.start_date,
                end_date: data.end_date,
            };
            *next_id += 1;
            self.subs.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn get_by_id(&self, id: i64) -> AppResult<Option<Model>> {
            Ok(self
                .subs
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn update(&self, id: i64, data: NewSubscription) -> AppResult<Option<Model>> {
            let mut subs = self.subs.lock().unwrap();
            let Some(existing) = subs.iter_mut().find(|s| s.id == id) else {
                return Ok(None);
            };
            existing.service_name = data.service_name;
            existing.price = data.price;
            existing.user_id = data.user_id;
            existing.start_date = data.start_date;
            existing.end_date = data.end_date;
            Ok(Some(existing.clone()))
        }

        async fn delete(&self, id: i64) -> AppResult<bool> {
            let mut subs = self.subs.lock().unwrap();
            let before = subs.len();
            subs.retain(|s| s.id != id);
            Ok(subs.len() < before)
        }

        async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<Model>> {
            let mut subs = self.subs.lock().unwrap().clone();
            subs.sort_by_key(|s| s.id);
            Ok(subs
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }

        async fn find_filtered(
            &self,
            user_id: Option<Uuid>,
            service_name: Option<&str>,
        ) -> AppResult<Vec<Model>> {
            Ok(self
                .subs
                .lock()
                .unwrap()
                .iter()
                .filter(|s| user_id.is_none_or(|uid| s.user_id == uid))
                .filter(|s| service_name.is_none_or(|name| s.service_name == name))
                .cloned()
                .collect())
        }
    }

    fn month(m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn user(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn sub(id: i64, name: &str, price: i64, owner: Uuid, start: NaiveDate, end: Option<NaiveDate>) -> Model {
        Model {
            id,
            service_name: name.to_string(),
            price,
            user_id: owner,
            start_date: start,
            end_date: end,
        }
    }

    fn new_sub(name: &str, price: i64, owner: Uuid, start: NaiveDate, end: Option<NaiveDate>) -> NewSubscription {
        NewSubscription {
            service_name: name.to_string(),
            price,
            user_id: owner,
            start_date: start,
            end_date: end,
        }
    }

    #[tokio::test]
    async fn test_sum_cost_single_subscription_windows() {
        let store = FakeStore::new(vec![sub(
            1,
            "Yandex Plus",
            100,
            user(1),
            month(1, 2025),
            Some(month(3, 2025)),
        )]);
        let service = SubscriptionService::new(store);
        let today = month(6, 2025);

        // one month inside the active range
        let total = service
            .sum_cost_at(None, None, month(2, 2025), month(2, 2025), today)
            .await
            .unwrap();
        assert_eq!(total, 100);

        // whole year covers all three active months
        let total = service
            .sum_cost_at(None, None, month(1, 2025), month(12, 2025), today)
            .await
            .unwrap();
        assert_eq!(total, 300);

        // period entirely after the subscription ended
        let total = service
            .sum_cost_at(None, None, month(4, 2025), month(12, 2025), today)
            .await
            .unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_sum_cost_open_ended_runs_through_today() {
        let store = FakeStore::new(vec![sub(
            1,
            "Spotify",
            50,
            user(1),
            month(1, 2025),
            None,
        )]);
        let service = SubscriptionService::new(store);

        // evaluated in May: active Jan..May, query Mar..Dec overlaps Mar..May
        let total = service
            .sum_cost_at(None, None, month(3, 2025), month(12, 2025), month(5, 2025))
            .await
            .unwrap();
        assert_eq!(total, 150);

        // same query a year later picks up every month through Dec
        let total = service
            .sum_cost_at(None, None, month(3, 2025), month(12, 2025), month(5, 2026))
            .await
            .unwrap();
        assert_eq!(total, 500);
    }

    #[tokio::test]
    async fn test_sum_cost_filters_and_combined() {
        let alice = user(1);
        let bob = user(2);
        let store = FakeStore::new(vec![
            sub(1, "Spotify", 10, alice, month(1, 2025), Some(month(12, 2025))),
            sub(2, "Netflix", 20, alice, month(1, 2025), Some(month(12, 2025))),
            sub(3, "Spotify", 40, bob, month(1, 2025), Some(month(12, 2025))),
        ]);
        let service = SubscriptionService::new(store);
        let today = month(12, 2025);
        let period = (month(1, 2025), month(1, 2025));

        let no_filter = service
            .sum_cost_at(None, None, period.0, period.1, today)
            .await
            .unwrap();
        assert_eq!(no_filter, 70);

        let by_user = service
            .sum_cost_at(Some(alice), None, period.0, period.1, today)
            .await
            .unwrap();
        assert_eq!(by_user, 30);

        let by_service = service
            .sum_cost_at(None, Some("Spotify"), period.0, period.1, today)
            .await
            .unwrap();
        assert_eq!(by_service, 50);

        let by_both = service
            .sum_cost_at(Some(alice), Some("Spotify"), period.0, period.1, today)
            .await
            .unwrap();
        assert_eq!(by_both, 10);
    }

    #[tokio::test]
    async fn test_sum_cost_skips_inverted_ranges() {
        // stored range ends before it starts: contributes nothing
        let store = FakeStore::new(vec![
            sub(1, "Spotify", 10, user(1), month(9, 2025), Some(month(1, 2025))),
            sub(2, "Netflix", 20, user(1), month(1, 2025), Some(month(12, 2025))),
        ]);
        let service = SubscriptionService::new(store);

        let total = service
            .sum_cost_at(None, None, month(1, 2025), month(1, 2025), month(12, 2025))
            .await
            .unwrap();
        assert_eq!(total, 20);
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id_and_round_trips() {
        let service = SubscriptionService::new(FakeStore::empty());
        let input = new_sub("Yandex Plus", 400, user(7), month(7, 2025), None);

        let created = service.create(input.clone()).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.service_name, input.service_name);
        assert_eq!(fetched.price, input.price);
        assert_eq!(fetched.user_id, input.user_id);
        assert_eq!(fetched.start_date, input.start_date);
        assert_eq!(fetched.end_date, input.end_date);

        let second = service.create(input).await.unwrap();
        assert_ne!(second.id, created.id);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let service = SubscriptionService::new(FakeStore::new(vec![sub(
            1,
            "Spotify",
            10,
            user(1),
            month(1, 2025),
            None,
        )]));

        let replacement = new_sub("Netflix", 25, user(2), month(2, 2025), Some(month(8, 2025)));
        let updated = service.update(1, replacement).await.unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.service_name, "Netflix");
        assert_eq!(updated.price, 25);
        assert_eq!(updated.user_id, user(2));
        assert_eq!(updated.end_date, Some(month(8, 2025)));
    }

    #[tokio::test]
    async fn test_missing_id_maps_to_not_found() {
        let service = SubscriptionService::new(FakeStore::empty());

        assert!(matches!(
            service.get_by_id(42).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(42).await,
            Err(AppError::NotFound(_))
        ));
        let data = new_sub("Spotify", 10, user(1), month(1, 2025), None);
        assert!(matches!(
            service.update(42, data).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let store = FakeStore::new(vec![
            sub(3, "C", 1, user(1), month(1, 2025), None),
            sub(1, "A", 1, user(1), month(1, 2025), None),
            sub(2, "B", 1, user(1), month(1, 2025), None),
        ]);
        let service = SubscriptionService::new(store);

        let page = service.list(2, 1).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
