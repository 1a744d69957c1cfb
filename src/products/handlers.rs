use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{NameAndPriceQuery, NameQuery, PriceRangeQuery, ProductIdQuery, ProductPayload},
    error::BadRequest,
    repo_types::ProductInformation,
    services::ProductService,
};
use crate::state::AppState;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/product/products", get(list_products))
        .route("/product/product", get(get_product))
        .route("/product/add", post(add_product))
        .route("/product/update", post(update_product))
        .route("/product/delete", delete(delete_product))
        .route("/product/search/name", get(search_by_name))
        .route("/product/search/price", get(search_by_price))
        .route("/product/search", get(search_by_name_and_price))
}

fn list_or_no_content(items: Vec<ProductInformation>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Response, BadRequest> {
    state.products.list_all().await.map(list_or_no_content)
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Query(q): Query<ProductIdQuery>,
) -> Result<Response, BadRequest> {
    Ok(match state.products.get_by_id(&q.product_id).await? {
        Some(product) => Json(product).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

#[instrument(skip(state, payload))]
pub async fn add_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductInformation>, BadRequest> {
    let invalid = BadRequest::new("Product details are missing or invalid");
    if ProductService::validate(&payload) {
        warn!("product payload rejected");
        return Err(invalid);
    }
    let product = payload.into_product().ok_or(invalid)?;
    state.products.create(product).await.map(Json)
}

#[instrument(skip(state, patch))]
pub async fn update_product(
    State(state): State<AppState>,
    Query(q): Query<ProductIdQuery>,
    Json(patch): Json<ProductPayload>,
) -> Result<Json<ProductInformation>, BadRequest> {
    state.products.update(&q.product_id, patch).await.map(Json)
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Query(q): Query<ProductIdQuery>,
) -> Result<&'static str, BadRequest> {
    state.products.delete(&q.product_id).await?;
    Ok("Product deleted successfully")
}

#[instrument(skip(state))]
pub async fn search_by_name(
    State(state): State<AppState>,
    Query(q): Query<NameQuery>,
) -> Result<Response, BadRequest> {
    state
        .products
        .search_by_name(&q.name)
        .await
        .map(list_or_no_content)
}

#[instrument(skip(state))]
pub async fn search_by_price(
    State(state): State<AppState>,
    Query(q): Query<PriceRangeQuery>,
) -> Result<Response, BadRequest> {
    state
        .products
        .search_by_price_range(q.min_price, q.max_price)
        .await
        .map(list_or_no_content)
}

#[instrument(skip(state))]
pub async fn search_by_name_and_price(
    State(state): State<AppState>,
    Query(q): Query<NameAndPriceQuery>,
) -> Result<Response, BadRequest> {
    state
        .products
        .search_by_name_and_price(&q.name, q.min_price, q.max_price)
        .await
        .map(list_or_no_content)
}
