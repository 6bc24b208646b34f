use crate::models::*;
use crate::services::DbSubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Malformed body or month format", body = ApiError)
    )
)]
pub async fn create_subscription(
    service: web::Data<DbSubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let data = match request.into_inner().into_new_subscription() {
        Ok(data) => data,
        Err(e) => return Ok(e.error_response()),
    };

    match service.create(data).await {
        Ok(model) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": SubscriptionResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    params(
        ("limit" = Option<u64>, Query, description = "Page size (default 50)"),
        ("offset" = Option<u64>, Query, description = "Rows to skip (default 0)")
    ),
    responses(
        (status = 200, description = "Page of subscriptions ordered by id", body = [SubscriptionResponse])
    )
)]
pub async fn list_subscriptions(
    service: web::Data<DbSubscriptionService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    match service.list(query.get_limit(), query.get_offset()).await {
        Ok(models) => {
            let items: Vec<SubscriptionResponse> =
                models.into_iter().map(SubscriptionResponse::from).collect();
            Ok(HttpResponse::Ok().json(json!({"success": true, "data": items})))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/sum",
    tag = "subscriptions",
    params(
        ("start_month" = String, Query, description = "MM-YYYY, inclusive"),
        ("end_month" = String, Query, description = "MM-YYYY, inclusive"),
        ("user_id" = Option<String>, Query, description = "Filter by owner UUID"),
        ("service_name" = Option<String>, Query, description = "Filter by exact service name")
    ),
    responses(
        (status = 200, description = "Total cost over the period", body = SumCostResponse),
        (status = 400, description = "Malformed month or user_id", body = ApiError)
    )
)]
pub async fn sum_cost(
    service: web::Data<DbSubscriptionService>,
    query: web::Query<SumCostQuery>,
) -> Result<HttpResponse> {
    let user_id = match query.user_filter() {
        Ok(v) => v,
        Err(e) => return Ok(e.error_response()),
    };
    let service_name = query.service_filter();
    let (period_start, period_end) = match query.period() {
        Ok(v) => v,
        Err(e) => return Ok(e.error_response()),
    };

    match service
        .sum_cost(user_id, service_name.as_deref(), period_start, period_end)
        .await
    {
        Ok(total) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SumCostResponse { total }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
pub async fn get_subscription(
    service: web::Data<DbSubscriptionService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_by_id(path.into_inner()).await {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SubscriptionResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription replaced", body = SubscriptionResponse),
        (status = 400, description = "Malformed body or month format", body = ApiError),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
pub async fn update_subscription(
    service: web::Data<DbSubscriptionService>,
    path: web::Path<i64>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    // full replace; the id always comes from the path, never the body
    let data = match request.into_inner().into_new_subscription() {
        Ok(data) => data,
        Err(e) => return Ok(e.error_response()),
    };

    match service.update(path.into_inner(), data).await {
        Ok(model) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": SubscriptionResponse::from(model)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = i64, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 404, description = "Unknown id", body = ApiError)
    )
)]
pub async fn delete_subscription(
    service: web::Data<DbSubscriptionService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            // literal route must precede the {id} matcher
            .route("/sum", web::get().to(sum_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
