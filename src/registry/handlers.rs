//! Generic registry handlers
//!
//! Every handler checks the registry's policy for its operation first, then
//! works on the typed collection and publishes the resulting change.

use super::{RegistryHooks, RegistryState};
use crate::auth::Auth;
use crate::core::entity::{Record, Status};
use crate::core::error::{BackofficeError, BackofficeResult, EntityError, ValidationError};
use crate::core::events::RecordEvent;
use crate::core::query::{ListQuery, PaginatedResponse, filter_and_sort, paginate};
use crate::core::service::{DataService, is_unchanged, merge_payload, record_from_payload};
use crate::core::validation::Validated;
use crate::export::{ExportFile, ExportFormat, ExportTable};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Body of `POST /{plural}/bulk/status`
#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<Uuid>,
    /// Target status; every record is toggled when omitted
    #[serde(default)]
    pub status: Option<Status>,
}

/// Body of `POST /{plural}/bulk/delete`
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub(crate) fn query_params<Q>(query: Result<Query<Q>, QueryRejection>) -> BackofficeResult<Q> {
    query.map(|Query(q)| q).map_err(|e| {
        ValidationError::InvalidQuery {
            parameter: "query".to_string(),
            message: e.body_text(),
        }
        .into()
    })
}

fn json_body<B>(body: Result<Json<B>, JsonRejection>) -> BackofficeResult<B> {
    body.map(|Json(b)| b).map_err(|e| {
        ValidationError::InvalidJson {
            message: e.body_text(),
        }
        .into()
    })
}

fn parse_id(raw: &str) -> BackofficeResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ValidationError::InvalidUuid {
            value: raw.to_string(),
        }
        .into()
    })
}

fn not_found<T: Record>(id: Uuid) -> BackofficeError {
    EntityError::NotFound {
        entity_type: T::resource_name_singular().to_string(),
        id,
    }
    .into()
}

fn unique(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Search, filter and sort the whole collection
pub(crate) async fn query_records<T: RegistryHooks>(
    state: &RegistryState<T>,
    query: &ListQuery,
) -> BackofficeResult<Vec<T>> {
    let records = state.collection.list().await?;
    filter_and_sort(records, query)
}

/// One page of the listing described by `query`
pub(crate) async fn list_page<T: RegistryHooks>(
    state: &RegistryState<T>,
    query: &ListQuery,
) -> BackofficeResult<PaginatedResponse<T>> {
    let records = query_records(state, query).await?;
    let page_size = state.listing.page_size(query.page_size);
    Ok(paginate(records, query.page.unwrap_or(1), page_size))
}

pub async fn list<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> BackofficeResult<Json<PaginatedResponse<T>>> {
    auth.require(&state.policies.read, &format!("list {}", T::resource_name()))?;
    let query = query_params(query)?;
    Ok(Json(list_page(&state, &query).await?))
}

pub async fn create<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    payload: Validated<T>,
) -> BackofficeResult<(StatusCode, Json<T>)> {
    auth.require(&state.policies.write, &format!("create {}", T::resource_name()))?;

    let mut payload = payload.into_inner();
    let id = T::before_create(&state, &mut payload).await?;

    let created = match record_from_payload::<T>(payload, id) {
        Ok(record) => state.collection.create(record).await,
        Err(e) => Err(e),
    };
    let record = match created {
        Ok(record) => record,
        Err(e) => {
            if let Some(id) = id {
                T::create_failed(&state, &id).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        entity_type = T::resource_name_singular(),
        entity_id = %record.id(),
        "record created"
    );
    state.publish_created(&record, auth.actor());
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    Path(id): Path<String>,
) -> BackofficeResult<Json<T>> {
    auth.require(&state.policies.read, &format!("view {}", T::resource_name()))?;
    let id = parse_id(&id)?;
    let record = state
        .collection
        .get(&id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;
    Ok(Json(record))
}

/// Apply an edit form; a form that changes nothing writes nothing
pub async fn update<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    Path(id): Path<String>,
    payload: Validated<T>,
) -> BackofficeResult<Json<T>> {
    auth.require(&state.policies.write, &format!("edit {}", T::resource_name()))?;
    let id = parse_id(&id)?;

    let current = state
        .collection
        .get(&id)
        .await?
        .ok_or_else(|| not_found::<T>(id))?;
    let edited = merge_payload(&current, payload.into_inner())?;

    if is_unchanged(&current, &edited) {
        tracing::debug!(
            entity_type = T::resource_name_singular(),
            entity_id = %id,
            "edit without changes"
        );
        return Ok(Json(current));
    }

    let record = state.collection.update(&id, edited).await?;
    state.publish_updated(&record, auth.actor());
    Ok(Json(record))
}

pub async fn delete<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    Path(id): Path<String>,
) -> BackofficeResult<StatusCode> {
    auth.require(&state.policies.delete, &format!("delete {}", T::resource_name()))?;
    let id = parse_id(&id)?;

    state.collection.delete(&id).await?;
    T::after_delete(&state, &[id]).await?;

    tracing::info!(
        entity_type = T::resource_name_singular(),
        entity_id = %id,
        "record deleted"
    );
    state.publish_deleted(vec![id], auth.actor());
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_status<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    body: Result<Json<BulkStatusRequest>, JsonRejection>,
) -> BackofficeResult<Json<Vec<T>>> {
    auth.require(
        &state.policies.write,
        &format!("change the status of {}", T::resource_name()),
    )?;
    let request = json_body(body)?;

    let records = state
        .collection
        .set_status_many(&request.ids, request.status)
        .await?;

    state.events.publish(
        RecordEvent::StatusChanged {
            collection: T::resource_name().to_string(),
            record_ids: records.iter().map(|r| r.id()).collect(),
            status: request.status,
        },
        auth.actor(),
    );
    Ok(Json(records))
}

pub async fn bulk_delete<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    body: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> BackofficeResult<Json<BulkDeleteResponse>> {
    auth.require(&state.policies.delete, &format!("delete {}", T::resource_name()))?;
    let request = json_body(body)?;

    let ids = unique(&request.ids);
    state.collection.delete_many(&ids).await?;
    T::after_delete(&state, &ids).await?;

    tracing::info!(
        entity_type = T::resource_name_singular(),
        count = ids.len(),
        "records deleted"
    );
    let deleted = ids.len();
    state.publish_deleted(ids, auth.actor());
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// Report of the current listing (search, status, sort and optional `ids`),
/// without pagination
pub async fn export<T: RegistryHooks>(
    State(state): State<RegistryState<T>>,
    auth: Auth,
    query: Result<Query<ListQuery>, QueryRejection>,
    format: Result<Query<ExportQuery>, QueryRejection>,
) -> BackofficeResult<ExportFile> {
    auth.require(&state.policies.read, &format!("export {}", T::resource_name()))?;
    let query = query_params(query)?;
    let format = match query_params(format)?.format {
        Some(format) => ExportFormat::parse(&format)?,
        None => ExportFormat::Csv,
    };

    let records = query_records(&state, &query).await?;
    let table = ExportTable::from_records(&state.plural, &records);
    Ok(ExportFile::build(&table, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert_eq!(parse_id("42").unwrap_err().error_code(), "INVALID_ID");
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(unique(&[a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_bulk_status_request_status_is_optional() {
        let id = Uuid::new_v4();
        let request: BulkStatusRequest =
            serde_json::from_value(serde_json::json!({ "ids": [id] })).unwrap();
        assert_eq!(request.status, None);

        let request: BulkStatusRequest =
            serde_json::from_value(serde_json::json!({ "ids": [id], "status": "inactive" }))
                .unwrap();
        assert_eq!(request.status, Some(Status::Inactive));
    }
}
