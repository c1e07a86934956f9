/*
 * Responsibility
 * - /drinks CRUD handlers
 * - Protected handlers take Authorized<P>; extraction runs before the body
 *   is read, so an unauthorized caller never reaches validation
 * - Body/path rejections are folded into the AppError envelope
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeleteDrinkResponse, DrinkLong, DrinkShort, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::{Authorized, CreateDrink, DeleteDrink, ReadDrinkDetail, UpdateDrink},
    },
    error::AppError,
    state::AppState,
};

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(req)) => Ok(req),
        // Well-formed JSON with the wrong shape
        Err(JsonRejection::JsonDataError(err)) => {
            tracing::debug!(error = %err, "request body rejected");
            Err(AppError::Unprocessable)
        }
        Err(err) => {
            tracing::debug!(error = %err, "request body rejected");
            Err(AppError::BadRequest)
        }
    }
}

fn drink_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|_| AppError::NotFound)
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, AppError> {
    let drinks = state.drinks.list().await?;
    if drinks.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(DrinksResponse::new(
        drinks.into_iter().map(DrinkShort::from).collect(),
    )))
}

pub async fn drinks_detail(
    State(state): State<AppState>,
    _auth: Authorized<ReadDrinkDetail>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let drinks = state.drinks.list().await?;

    Ok(Json(DrinksResponse::new(
        drinks.into_iter().map(DrinkLong::from).collect(),
    )))
}

pub async fn create_drink(
    State(state): State<AppState>,
    auth: Authorized<CreateDrink>,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let (title, recipe) = json_body(body)?.validate().map_err(|reason| {
        tracing::debug!(reason, "create drink rejected");
        AppError::Unprocessable
    })?;

    let drink = state.drinks.create(&title, &recipe).await?;
    tracing::info!(drink_id = drink.id, sub = ?auth.claims.sub, "drink created");

    Ok(Json(DrinksResponse::new(vec![drink.into()])))
}

pub async fn update_drink(
    State(state): State<AppState>,
    auth: Authorized<UpdateDrink>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let id = drink_id(path)?;
    let (title, recipe) = json_body(body)?.validate().map_err(|reason| {
        tracing::debug!(reason, "update drink rejected");
        AppError::BadRequest
    })?;

    let drink = state
        .drinks
        .update(id, title.as_deref(), recipe.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(drink_id = id, sub = ?auth.claims.sub, "drink updated");

    Ok(Json(DrinksResponse::new(vec![drink.into()])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    auth: Authorized<DeleteDrink>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteDrinkResponse>, AppError> {
    let id = drink_id(path)?;
    if !state.drinks.delete(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(drink_id = id, sub = ?auth.claims.sub, "drink deleted");

    Ok(Json(DeleteDrinkResponse {
        success: true,
        deleted: id,
    }))
}
