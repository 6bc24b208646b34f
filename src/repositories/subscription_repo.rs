use crate::entities::subscriptions;
use crate::error::AppResult;
use crate::models::NewSubscription;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Store contract for subscription records. The aggregation engine only
/// needs `find_filtered`; everything else backs the CRUD surface. Kept as a
/// trait so the service layer stays testable against an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait SubscriptionStore {
    async fn create(&self, data: NewSubscription) -> AppResult<subscriptions::Model>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<subscriptions::Model>>;
    /// Full replace. Returns `None` when the id does not exist.
    async fn update(&self, id: i64, data: NewSubscription)
    -> AppResult<Option<subscriptions::Model>>;
    /// Returns `false` when the id does not exist.
    async fn delete(&self, id: i64) -> AppResult<bool>;
    /// Page ordered by identifier.
    async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<subscriptions::Model>>;
    /// Present filters are AND-combined; `None` means no filter on that
    /// dimension. Result order is unspecified.
    async fn find_filtered(
        &self,
        user_id: Option<Uuid>,
        service_name: Option<&str>,
    ) -> AppResult<Vec<subscriptions::Model>>;
}

#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: DatabaseConnection,
}

impl SubscriptionRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

impl SubscriptionStore for SubscriptionRepository {
    async fn create(&self, data: NewSubscription) -> AppResult<subscriptions::Model> {
        log::debug!(
            "Inserting subscription service={} user={}",
            data.service_name,
            data.user_id
        );
        let model = subscriptions::ActiveModel {
            service_name: Set(data.service_name),
            price: Set(data.price),
            user_id: Set(data.user_id),
            start_date: Set(data.start_date),
            end_date: Set(data.end_date),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(model)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<subscriptions::Model>> {
        let found = subscriptions::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(found)
    }

    async fn update(
        &self,
        id: i64,
        data: NewSubscription,
    ) -> AppResult<Option<subscriptions::Model>> {
        let Some(existing) = subscriptions::Entity::find_by_id(id).one(&self.pool).await? else {
            return Ok(None);
        };

        let mut am = existing.into_active_model();
        am.service_name = Set(data.service_name);
        am.price = Set(data.price);
        am.user_id = Set(data.user_id);
        am.start_date = Set(data.start_date);
        am.end_date = Set(data.end_date);

        let updated = am.update(&self.pool).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = subscriptions::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<subscriptions::Model>> {
        let page = subscriptions::Entity::find()
            .order_by_asc(subscriptions::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.pool)
            .await?;
        Ok(page)
    }

    async fn find_filtered(
        &self,
        user_id: Option<Uuid>,
        service_name: Option<&str>,
    ) -> AppResult<Vec<subscriptions::Model>> {
        let mut query = subscriptions::Entity::find();
        if let Some(uid) = user_id {
            query = query.filter(subscriptions::Column::UserId.eq(uid));
        }
        if let Some(name) = service_name {
            query = query.filter(subscriptions::Column::ServiceName.eq(name));
        }
        let matches = query.all(&self.pool).await?;
        Ok(matches)
    }
}
