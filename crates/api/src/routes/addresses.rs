//! Shipping address routes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use attara_core::AddressId;

use crate::db::AddressRepository;
use crate::db::addresses::AddressFields;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::Address;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressRequest {
    fn into_fields(self) -> Result<AddressFields, AppError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{field} must not be empty")));
            }
        }
        Ok(AddressFields {
            full_name: self.full_name,
            phone: self.phone,
            line1: self.line1,
            line2: self.line2,
            city: self.city,
            state: self.state,
            country: self.country,
            zip_code: self.zip_code,
            is_default: self.is_default,
        })
    }
}

/// `GET /addresses` - the user's addresses, default first.
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(addresses))
}

/// `POST /addresses` - create an address; the first one becomes default.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(body): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    let fields = body.into_fields()?;
    let address = AddressRepository::new(state.pool())
        .create(current.id, &fields)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PATCH /addresses/{id}` - update an address.
///
/// Editing an address the user doesn't own is a bad request, not a 403.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<Json<Address>, AppError> {
    let repo = AddressRepository::new(state.pool());
    let existing = repo.get(id).await?.ok_or(AppError::NotFound)?;
    if existing.user_id != current.id {
        return Err(AppError::BadRequest("address does not belong to user".to_owned()));
    }

    let fields = body.into_fields()?;
    let address = repo.update(id, current.id, &fields).await?;
    Ok(Json(address))
}

/// `POST /addresses/{id}/default` - make an address the default.
pub async fn set_default(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>, AppError> {
    let address = AddressRepository::new(state.pool())
        .set_default(id, current.id)
        .await?;
    Ok(Json(address))
}

/// `DELETE /addresses/{id}` - delete an address, promoting the oldest
/// remaining one if the default was removed.
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<AddressId>,
) -> Result<StatusCode, AppError> {
    AddressRepository::new(state.pool())
        .delete(id, current.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
