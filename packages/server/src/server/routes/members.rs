//! Member REST endpoints.
//!
//! POST   /members       create
//! GET    /members       list, optional `?search=`
//! GET    /members/:id   fetch
//! PATCH  /members/:id   partial update
//! DELETE /members/:id   delete with contacts
//!
//! Every handler owns its error boundary: store failures become an
//! `ApiError::Store` carrying that operation's message.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use validator::Validate;

use crate::common::MemberId;
use crate::domains::member::{CreateMember, Member, MemberPatch, MemberProfile};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

const MEMBER_NOT_FOUND: &str = "Member not found";

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMember {
    pub id: MemberId,
}

#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberList {
    pub members: Vec<Member>,
    pub count: usize,
}

/// Parse the `:id` path segment
///
/// A blank id is a client error. Anything that is not a UUID cannot name a
/// member, so it yields `None` and the caller answers 404.
fn parse_member_id(raw: &str) -> Result<Option<MemberId>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("ID is required".to_string()));
    }
    Ok(MemberId::parse(raw).ok())
}

/// POST /members
pub async fn create_member(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateMember>, JsonRejection>,
) -> Result<Json<CreatedMember>, ApiError> {
    let Json(input) = payload?;
    input
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let id = Member::create(&input, &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not add new member", e))?;

    info!(member_id = %id, by = %user.subject, "Member created");
    Ok(Json(CreatedMember { id }))
}

/// GET /members
pub async fn list_members(
    Extension(state): Extension<AppState>,
    query: Result<Query<ListMembersQuery>, QueryRejection>,
) -> Result<Json<MemberList>, ApiError> {
    let Query(query) = query?;

    let members = Member::search(query.search.as_deref(), &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not fetch members", e))?;

    debug!(count = members.len(), search = ?query.search, "Listed members");
    Ok(Json(MemberList {
        count: members.len(),
        members,
    }))
}

/// GET /members/:id
pub async fn get_member(
    Extension(state): Extension<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MemberProfile>, ApiError> {
    let Some(id) = parse_member_id(&raw_id)? else {
        return Err(ApiError::not_found(MEMBER_NOT_FOUND));
    };

    MemberProfile::find_by_id(id, &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not fetch member", e))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(MEMBER_NOT_FOUND))
}

/// PATCH /members/:id
///
/// Checks existence first, then validates the body. Success is 200 with an
/// empty body.
pub async fn update_member(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Some(id) = parse_member_id(&raw_id)? else {
        return Err(ApiError::not_found(MEMBER_NOT_FOUND));
    };

    let exists = Member::exists(id, &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not update member", e))?;
    if !exists {
        return Err(ApiError::not_found(MEMBER_NOT_FOUND));
    }

    let Json(body) = payload?;
    let patch = MemberPatch::from_json(body)?;

    let updated = Member::apply_patch(id, &patch, &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not update member", e))?;
    if updated == 0 {
        // Deleted between the existence check and the update
        return Err(ApiError::not_found(MEMBER_NOT_FOUND));
    }

    let fields: Vec<&str> = patch.fields().map(|field| field.key()).collect();
    info!(member_id = %id, by = %user.subject, ?fields, "Member updated");
    Ok(StatusCode::OK)
}

/// DELETE /members/:id
///
/// 204 when a member was removed, 404 (empty body) when there was none.
pub async fn delete_member(
    Extension(state): Extension<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let Some(id) = parse_member_id(&raw_id)? else {
        return Ok(StatusCode::NOT_FOUND);
    };

    let deleted = Member::delete_with_contacts(id, &state.db_pool)
        .await
        .map_err(|e| ApiError::store("Could not delete member", e))?;

    match deleted {
        Some(deleted_id) => {
            info!(member_id = %deleted_id, by = %user.subject, "Member deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Ok(StatusCode::NOT_FOUND),
    }
}
