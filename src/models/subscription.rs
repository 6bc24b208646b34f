use crate::entities::subscription_entity;
use crate::error::{AppError, AppResult};
use crate::utils::{format_month, parse_month};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validated domain input for create and full-replace update. The store
/// assigns the identifier; it never comes from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    pub service_name: String,
    /// Monthly price in whole monetary units, must be >= 0
    pub price: i64,
    pub user_id: Uuid,
    /// MM-YYYY
    pub start_date: String,
    /// MM-YYYY; absent means the subscription is still active
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Boundary validation: fail fast before anything reaches the store.
    /// An end month earlier than the start month is deliberately accepted;
    /// such a range just never contributes to cost aggregation.
    pub fn into_new_subscription(self) -> AppResult<NewSubscription> {
        if self.service_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "service_name must not be empty".to_string(),
            ));
        }
        if self.price < 0 {
            return Err(AppError::ValidationError(
                "price must be >= 0".to_string(),
            ));
        }
        let start_date = parse_month(&self.start_date).ok_or_else(|| {
            AppError::ValidationError("bad start_date format, expected MM-YYYY".to_string())
        })?;
        let end_date = match self.end_date.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_month(raw).ok_or_else(|| {
                AppError::ValidationError("bad end_date format, expected MM-YYYY".to_string())
            })?),
            None => None,
        };

        Ok(NewSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    /// MM-YYYY
    pub start_date: String,
    /// MM-YYYY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<subscription_entity::Model> for SubscriptionResponse {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: format_month(m.start_date),
            end_date: m.end_date.map(format_month),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListQuery {
    pub fn get_limit(&self) -> u64 {
        self.limit.filter(|l| *l > 0).unwrap_or(50)
    }

    pub fn get_offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SumCostQuery {
    /// Optional exact-match filter, UUID
    pub user_id: Option<String>,
    /// Optional exact-match filter
    pub service_name: Option<String>,
    /// MM-YYYY
    pub start_month: String,
    /// MM-YYYY
    pub end_month: String,
}

impl SumCostQuery {
    /// Empty string behaves like an absent filter.
    pub fn user_filter(&self) -> AppResult<Option<Uuid>> {
        match self.user_id.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<Uuid>()
                .map(Some)
                .map_err(|_| AppError::ValidationError("bad user_id, expected UUID".to_string())),
            None => Ok(None),
        }
    }

    pub fn service_filter(&self) -> Option<String> {
        self.service_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn period(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        let start = parse_month(&self.start_month).ok_or_else(|| {
            AppError::ValidationError("bad start_month format, expected MM-YYYY".to_string())
        })?;
        let end = parse_month(&self.end_month).ok_or_else(|| {
            AppError::ValidationError("bad end_month format, expected MM-YYYY".to_string())
        })?;
        Ok((start, end))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SumCostResponse {
    pub total: i64,
}
