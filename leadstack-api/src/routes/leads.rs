/// Lead routes
///
/// CRUD plus the filtered, paginated listing. Every handler runs behind the
/// auth gate and is scoped to the authenticated owner: leads belonging to
/// other users are indistinguishable from leads that do not exist.
use crate::{
    app::{AppState, CurrentUser},
    error::{conflict_on_unique, invalid_field, validation_error, ApiError},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use leadstack_shared::{
    filter::FilterSpec,
    models::lead::{CreateLead, Lead, LeadPage, LeadSource, LeadStatus, UpdateLead},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating or replacing a lead.
///
/// `source` and `status` arrive as plain strings and are parsed after
/// validation, so an unknown variant produces a field-level 400 instead of a
/// body-level deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct LeadPayload {
    #[serde(rename = "firstName")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[serde(rename = "lastName")]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,

    pub source: String,

    pub status: String,

    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: i32,

    #[validate(range(min = 0.0, message = "Lead value must be non-negative"))]
    pub lead_value: f64,

    pub is_qualified: bool,

    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl LeadPayload {
    /// Validates the payload and parses the enum fields.
    fn into_parts(self) -> Result<ParsedLead, ApiError> {
        self.validate().map_err(validation_error)?;

        let source: LeadSource = self
            .source
            .parse()
            .map_err(|_| invalid_field("source", "Unknown lead source"))?;
        let status: LeadStatus = self
            .status
            .parse()
            .map_err(|_| invalid_field("status", "Unknown lead status"))?;

        Ok(ParsedLead {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.to_lowercase(),
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source,
            status,
            score: self.score,
            lead_value: self.lead_value,
            is_qualified: self.is_qualified,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(Debug)]
struct ParsedLead {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    company: String,
    city: String,
    state: String,
    source: LeadSource,
    status: LeadStatus,
    score: i32,
    lead_value: f64,
    is_qualified: bool,
    last_activity_at: Option<DateTime<Utc>>,
}

/// Query parameters for GET /api/leads
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,

    /// URL-encoded JSON object of per-field `{operator, value}` filters,
    /// e.g. `{"status":{"operator":"equals","value":"new"}}`
    pub filters: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<LeadPayload>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let parsed = payload.into_parts()?;

    let lead = Lead::create(
        &state.db,
        CreateLead {
            user_id: current.id,
            first_name: parsed.first_name,
            last_name: parsed.last_name,
            email: parsed.email,
            phone: parsed.phone,
            company: parsed.company,
            city: parsed.city,
            state: parsed.state,
            source: parsed.source,
            status: parsed.status,
            score: parsed.score,
            lead_value: parsed.lead_value,
            is_qualified: parsed.is_qualified,
            last_activity_at: parsed.last_activity_at,
        },
    )
    .await
    .map_err(|err| conflict_on_unique(err, "Lead with this email already exists"))?;

    tracing::info!(lead_id = %lead.id, user_id = %current.id, "Lead created");

    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/leads?page=&limit=&filters=
///
/// The `filters` parameter must be a JSON object; anything else is rejected
/// up front. Unknown fields and malformed operator values inside a
/// well-formed object are silently dropped by the filter compiler.
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Json<LeadPage>, ApiError> {
    let filters = match params.filters.as_deref() {
        None | Some("") => FilterSpec::default(),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| invalid_field("filters", "Filters must be a JSON object"))?,
    };

    let page = Lead::list(&state.db, current.id, &filters, params.page, params.limit).await?;

    Ok(Json(page))
}

/// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, ApiError> {
    let lead = Lead::find_by_id(&state.db, id, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    Ok(Json(lead))
}

/// PUT /api/leads/:id
///
/// Full replace of the mutable fields: the payload carries every field, and
/// an omitted `last_activity_at` clears any previous value.
pub async fn update_lead(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadPayload>,
) -> Result<Json<Lead>, ApiError> {
    let parsed = payload.into_parts()?;

    let lead = Lead::update(
        &state.db,
        id,
        current.id,
        UpdateLead {
            first_name: parsed.first_name,
            last_name: parsed.last_name,
            email: parsed.email,
            phone: parsed.phone,
            company: parsed.company,
            city: parsed.city,
            state: parsed.state,
            source: parsed.source,
            status: parsed.status,
            score: parsed.score,
            lead_value: parsed.lead_value,
            is_qualified: parsed.is_qualified,
            last_activity_at: parsed.last_activity_at,
        },
    )
    .await
    .map_err(|err| conflict_on_unique(err, "Lead with this email already exists"))?
    .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    tracing::info!(lead_id = %lead.id, user_id = %current.id, "Lead updated");

    Ok(Json(lead))
}

/// DELETE /api/leads/:id
pub async fn delete_lead(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = Lead::delete(&state.db, id, current.id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Lead not found".to_string()));
    }

    tracing::info!(lead_id = %id, user_id = %current.id, "Lead deleted");

    Ok(Json(MessageResponse {
        message: "Lead deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_json() -> serde_json::Value {
        serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "Ada@Example.com",
            "phone": "555-0100",
            "company": "Analytical Engines",
            "city": "London",
            "state": "LDN",
            "source": "referral",
            "status": "new",
            "score": 75,
            "lead_value": 1200.5,
            "is_qualified": false
        })
    }

    #[test]
    fn test_lead_payload_parses_and_lowercases_email() {
        let payload: LeadPayload = serde_json::from_value(payload_json()).unwrap();
        let parsed = payload.into_parts().unwrap();

        assert_eq!(parsed.email, "ada@example.com");
        assert_eq!(parsed.source, LeadSource::Referral);
        assert_eq!(parsed.status, LeadStatus::New);
        assert_eq!(parsed.score, 75);
        assert!(!parsed.is_qualified);
        assert!(parsed.last_activity_at.is_none());
    }

    #[test]
    fn test_lead_payload_rejects_unknown_source() {
        let mut json = payload_json();
        json["source"] = serde_json::json!("carrier_pigeon");

        let payload: LeadPayload = serde_json::from_value(json).unwrap();
        let err = payload.into_parts().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_lead_payload_rejects_empty_contact_fields() {
        for field in ["phone", "company", "city", "state"] {
            let mut json = payload_json();
            json[field] = serde_json::json!("");

            let payload: LeadPayload = serde_json::from_value(json).unwrap();
            assert!(
                payload.into_parts().is_err(),
                "empty {field} must be rejected"
            );
        }
    }

    #[test]
    fn test_lead_payload_requires_score_value_and_flag() {
        for field in ["score", "lead_value", "is_qualified", "phone"] {
            let mut json = payload_json();
            json.as_object_mut().unwrap().remove(field);

            assert!(
                serde_json::from_value::<LeadPayload>(json).is_err(),
                "missing {field} must not deserialize"
            );
        }
    }

    #[test]
    fn test_lead_payload_rejects_out_of_range_score() {
        let mut json = payload_json();
        json["score"] = serde_json::json!(150);

        let payload: LeadPayload = serde_json::from_value(json).unwrap();
        assert!(payload.into_parts().is_err());
    }

    #[test]
    fn test_lead_payload_rejects_negative_value() {
        let mut json = payload_json();
        json["lead_value"] = serde_json::json!(-1.0);

        let payload: LeadPayload = serde_json::from_value(json).unwrap();
        assert!(payload.into_parts().is_err());
    }

    #[test]
    fn test_list_params_optional_fields() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert!(params.page.is_none());
        assert!(params.limit.is_none());
        assert!(params.filters.is_none());
    }
}
