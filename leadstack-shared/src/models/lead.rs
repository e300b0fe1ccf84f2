/// Lead model, owner-scoped CRUD, and the paginated listing engine
///
/// Leads are sales-prospect records owned by exactly one user. Every read and
/// write path here conjoins `user_id = <owner>`, so a lead is only ever
/// visible to, counted for, or mutable by its owner. Email uniqueness is
/// global across the whole collection (not per owner) and is enforced
/// atomically by the store's unique index — there is no check-then-act.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE lead_source AS ENUM (
///     'website', 'facebook_ads', 'google_ads', 'referral', 'events', 'other'
/// );
/// CREATE TYPE lead_status AS ENUM (
///     'new', 'contacted', 'qualified', 'lost', 'won'
/// );
///
/// CREATE TABLE leads (
///     id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     first_name TEXT NOT NULL,
///     last_name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     phone TEXT NOT NULL,
///     company TEXT NOT NULL,
///     city TEXT NOT NULL,
///     state TEXT NOT NULL,
///     source lead_source NOT NULL,
///     status lead_status NOT NULL,
///     score INTEGER NOT NULL CHECK (score >= 0 AND score <= 100),
///     lead_value DOUBLE PRECISION NOT NULL CHECK (lead_value >= 0),
///     is_qualified BOOLEAN NOT NULL DEFAULT FALSE,
///     last_activity_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Listing
///
/// `Lead::list` compiles the client filter specification (see
/// [`crate::filter`]) into predicates, renders them as parameterized SQL
/// conjoined with the mandatory owner predicate, and runs a count plus a
/// sorted, offset/limit fetch over the identical WHERE clause so the totals
/// always agree with the returned page.
use crate::filter::{self, FilterSpec, Predicate, Scalar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgArguments;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Columns returned by every lead query.
const LEAD_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, company, city, \
     state, source, status, score, lead_value, is_qualified, last_activity_at, \
     created_at, updated_at";

/// Page size used when the client does not supply one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard cap on page size, regardless of what the client asks for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Error returned when parsing an unknown enum label.
#[derive(Debug, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Where a lead came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::FacebookAds => "facebook_ads",
            LeadSource::GoogleAds => "google_ads",
            LeadSource::Referral => "referral",
            LeadSource::Events => "events",
            LeadSource::Other => "other",
        }
    }
}

impl std::str::FromStr for LeadSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(LeadSource::Website),
            "facebook_ads" => Ok(LeadSource::FacebookAds),
            "google_ads" => Ok(LeadSource::GoogleAds),
            "referral" => Ok(LeadSource::Referral),
            "events" => Ok(LeadSource::Events),
            "other" => Ok(LeadSource::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Where a lead sits in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
            LeadStatus::Won => "won",
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "qualified" => Ok(LeadStatus::Qualified),
            "lost" => Ok(LeadStatus::Lost),
            "won" => Ok(LeadStatus::Won),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Lead model representing a sales prospect
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    /// Unique lead ID
    pub id: Uuid,

    /// Owning user (immutable after creation)
    pub user_id: Uuid,

    pub first_name: String,
    pub last_name: String,

    /// Email, unique across the entire collection (all owners)
    pub email: String,

    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: LeadSource,
    pub status: LeadStatus,

    /// Fit score, 0–100 inclusive
    pub score: i32,

    /// Estimated deal value, non-negative
    pub lead_value: f64,

    pub is_qualified: bool,

    /// Last recorded activity, if any
    pub last_activity_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new lead
#[derive(Debug, Clone)]
pub struct CreateLead {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Input for updating a lead: a full replace of the mutable fields.
///
/// `id` and `user_id` are immutable and never part of an update.
#[derive(Debug, Clone)]
pub struct UpdateLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub city: String,
    pub state: String,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i32,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Paginated listing result
#[derive(Debug, Clone, Serialize)]
pub struct LeadPage {
    /// Leads on this page, newest created_at first
    pub data: Vec<Lead>,

    /// 1-based page number
    pub page: i64,

    /// Page size actually applied (after default/cap)
    pub limit: i64,

    /// Total leads matching the filter for this owner
    pub total: i64,

    /// ceil(total / limit)
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// A value bound into a rendered filter query, in placeholder order.
#[derive(Debug, Clone)]
enum BindValue {
    Text(String),
    TextList(Vec<String>),
    Number(f64),
    Flag(bool),
    Time(DateTime<Utc>),
}

impl From<&Scalar> for BindValue {
    fn from(value: &Scalar) -> Self {
        match value {
            Scalar::Text(s) => BindValue::Text(s.clone()),
            Scalar::Number(n) => BindValue::Number(*n),
            Scalar::Flag(b) => BindValue::Flag(*b),
            Scalar::Time(t) => BindValue::Time(*t),
        }
    }
}

/// SQL expression for a filterable column.
///
/// Enum columns are compared as text so that a stray client value (say a
/// status of "bogus") matches nothing instead of failing an enum cast.
fn column_expr(column: &str) -> String {
    match column {
        "status" | "source" => format!("{}::text", column),
        other => other.to_string(),
    }
}

/// Escapes LIKE/ILIKE metacharacters in a user-supplied needle.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Renders compiled predicates into a SQL clause and its bind values.
///
/// Returns a string of " AND ..." fragments (empty when there are no
/// predicates) with placeholders numbered from `first_param`, plus the values
/// to bind in order. Column names come from the compiler's fixed field table,
/// never from client input; values are always bound.
fn render_predicates(predicates: &[Predicate], first_param: usize) -> (String, Vec<BindValue>) {
    let mut sql = String::new();
    let mut binds = Vec::new();
    let mut param = first_param;

    for predicate in predicates {
        match predicate {
            Predicate::Eq { column, value } => {
                sql.push_str(&format!(" AND {} = ${}", column_expr(column), param));
                binds.push(BindValue::from(value));
                param += 1;
            }
            Predicate::TextContains { column, needle } => {
                sql.push_str(&format!(" AND {} ILIKE ${}", column_expr(column), param));
                binds.push(BindValue::Text(format!("%{}%", escape_like(needle))));
                param += 1;
            }
            Predicate::AnyOf { column, values } => {
                sql.push_str(&format!(" AND {} = ANY(${})", column_expr(column), param));
                binds.push(BindValue::TextList(values.clone()));
                param += 1;
            }
            Predicate::Gt { column, value } => {
                sql.push_str(&format!(" AND {} > ${}", column_expr(column), param));
                binds.push(BindValue::from(value));
                param += 1;
            }
            Predicate::Lt { column, value } => {
                sql.push_str(&format!(" AND {} < ${}", column_expr(column), param));
                binds.push(BindValue::from(value));
                param += 1;
            }
            Predicate::Within { column, low, high } => {
                let expr = column_expr(column);
                sql.push_str(&format!(
                    " AND ({expr} >= ${} AND {expr} <= ${})",
                    param,
                    param + 1
                ));
                binds.push(BindValue::from(low));
                binds.push(BindValue::from(high));
                param += 2;
            }
            Predicate::DayWindow { column, start, end } => {
                let expr = column_expr(column);
                sql.push_str(&format!(
                    " AND ({expr} >= ${} AND {expr} < ${})",
                    param,
                    param + 1
                ));
                binds.push(BindValue::Time(*start));
                binds.push(BindValue::Time(*end));
                param += 2;
            }
        }
    }

    (sql, binds)
}

/// Appends rendered bind values to a query in placeholder order.
fn bind_filters<'q, O>(
    query: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    binds: &[BindValue],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    binds.iter().fold(query, |q, value| match value {
        BindValue::Text(s) => q.bind(s.clone()),
        BindValue::TextList(xs) => q.bind(xs.clone()),
        BindValue::Number(n) => q.bind(*n),
        BindValue::Flag(b) => q.bind(*b),
        BindValue::Time(t) => q.bind(*t),
    })
}

/// Normalizes client paging inputs.
///
/// `page` defaults to 1 when absent or non-positive; `limit` defaults to
/// [`DEFAULT_PAGE_SIZE`] when absent or non-positive and is capped at
/// [`MAX_PAGE_SIZE`] to protect the store from unbounded scans.
pub fn normalize_paging(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = match page {
        Some(p) if p > 0 => p,
        _ => 1,
    };
    let limit = match limit {
        Some(l) if l > 0 => l.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    };
    (page, limit)
}

/// `ceil(total / limit)` without touching floats.
fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// Row offset for a 1-based page.
///
/// Saturating: an absurdly large client-supplied page clamps to `i64::MAX`,
/// which the store answers with an empty page instead of the query failing.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

impl Lead {
    /// Creates a new lead owned by `data.user_id`
    ///
    /// Global email uniqueness is enforced by the unique index; a duplicate
    /// (under any owner) surfaces as a unique-constraint violation that the
    /// API layer translates into a Conflict.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate email or when the store is
    /// unavailable.
    pub async fn create(pool: &PgPool, data: CreateLead) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO leads (user_id, first_name, last_name, email, phone, company,
                               city, state, source, status, score, lead_value,
                               is_qualified, last_activity_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(data.user_id)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.company)
            .bind(data.city)
            .bind(data.state)
            .bind(data.source)
            .bind(data.status)
            .bind(data.score)
            .bind(data.lead_value)
            .bind(data.is_qualified)
            .bind(data.last_activity_at)
            .fetch_one(pool)
            .await?;

        Ok(lead)
    }

    /// Finds a lead by ID, scoped to its owner
    ///
    /// Returns `None` both when the id does not exist and when it belongs to
    /// a different owner — the two cases are indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 AND user_id = $2");

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await?;

        Ok(lead)
    }

    /// Replaces the mutable fields of an owner-scoped lead
    ///
    /// Bumps `updated_at`. Returns `None` when no lead with that id belongs
    /// to `owner`. Changing the email to one used elsewhere trips the unique
    /// index (updating a row to its own email does not).
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate email or when the store is
    /// unavailable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        data: UpdateLead,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE leads
            SET first_name = $3, last_name = $4, email = $5, phone = $6,
                company = $7, city = $8, state = $9, source = $10, status = $11,
                score = $12, lead_value = $13, is_qualified = $14,
                last_activity_at = $15, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {LEAD_COLUMNS}
            "#
        );

        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .bind(owner)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.email)
            .bind(data.phone)
            .bind(data.company)
            .bind(data.city)
            .bind(data.state)
            .bind(data.source)
            .bind(data.status)
            .bind(data.score)
            .bind(data.lead_value)
            .bind(data.is_qualified)
            .bind(data.last_activity_at)
            .fetch_optional(pool)
            .await?;

        Ok(lead)
    }

    /// Deletes an owner-scoped lead
    ///
    /// # Returns
    ///
    /// True if a lead was deleted, false when the id does not exist or
    /// belongs to a different owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn delete(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Runs the counted, filtered, paginated listing for one owner
    ///
    /// Compiles `filters`, conjoins the mandatory `user_id = owner`
    /// predicate, counts the matches, and fetches one page sorted newest
    /// `created_at` first (id as tie-break so paging is deterministic). The
    /// count and the fetch share the identical WHERE clause, which keeps
    /// `total`/`totalPages` consistent with the returned rows.
    ///
    /// # Errors
    ///
    /// Never fails on filter content (the compiler drops malformed input);
    /// only store unavailability propagates.
    pub async fn list(
        pool: &PgPool,
        owner: Uuid,
        filters: &FilterSpec,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<LeadPage, sqlx::Error> {
        let (page, limit) = normalize_paging(page, limit);
        let offset = page_offset(page, limit);

        let predicates = filter::compile(filters);
        // $1 is the owner; predicate placeholders start at $2.
        let (clause, binds) = render_predicates(&predicates, 2);

        let count_sql = format!("SELECT COUNT(*) FROM leads WHERE user_id = $1{clause}");
        let count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(owner);
        let (total,) = bind_filters(count_query, &binds).fetch_one(pool).await?;

        let fetch_sql = format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE user_id = $1{clause} \
             ORDER BY created_at DESC, id LIMIT ${} OFFSET ${}",
            binds.len() + 2,
            binds.len() + 3,
        );
        let fetch_query = sqlx::query_as::<_, Lead>(&fetch_sql).bind(owner);
        let data = bind_filters(fetch_query, &binds)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(LeadPage {
            data,
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        })
    }
}
