use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use validator::Validate;

use crate::common::MemberId;
use crate::domains::contacts::MemberContact;
use crate::domains::member::models::patch::MemberPatch;

/// Gender enum for type-safe input handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(anyhow::anyhow!("Invalid gender: {}", s)),
        }
    }
}

/// Member model - one row of `members`
///
/// Serialized with the same camelCase keys the API accepts on input.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub email: Option<String>,
    pub gender: String, // 'Male', 'Female', 'Other'
    pub is_active: bool,
    pub fide_rating: Option<i32>,
    pub profile_photo_url: Option<String>,
    pub lichess_profile: Option<String>,
    #[sqlx(rename = "chesscom_profile")]
    pub chess_com_profile: Option<String>,
    pub fide_profile: Option<String>,
    #[sqlx(rename = "overdue_subscription")]
    pub over_due_subscription: bool,
    pub joined_at: DateTime<Utc>,
}

/// Single-member projection returned by the fetch endpoint
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: MemberId,
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub gender: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub fide_rating: Option<i32>,
    #[sqlx(rename = "overdue_subscription")]
    pub over_due_subscription: bool,
    pub lichess_profile: Option<String>,
    #[sqlx(rename = "chesscom_profile")]
    pub chess_com_profile: Option<String>,
    pub fide_profile: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Input for creating a new member
///
/// Missing required keys, wrong JSON types and unknown genders fail during
/// deserialization; numeric bounds are checked by `validate()`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    pub firstname: String,
    pub lastname: String,
    #[serde(deserialize_with = "whole_number")]
    #[validate(range(min = 14, message = "age must be at least 14"))]
    pub age: i32,
    pub email: String,
    pub gender: Gender,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "optional_whole_number")]
    #[validate(range(min = 1, message = "fideRating must be at least 1"))]
    pub fide_rating: Option<i32>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
    #[serde(default)]
    pub lichess_profile: Option<String>,
    #[serde(default)]
    pub chess_com_profile: Option<String>,
    #[serde(default)]
    pub fide_profile: Option<String>,
    #[serde(default)]
    pub over_due_subscription: bool,
}

fn default_true() -> bool {
    true
}

/// `n` as an `i32` when it has no fractional part and fits
///
/// JSON clients may send `14.0` for an integer attribute.
pub(crate) fn whole_i32(n: f64) -> Option<i32> {
    let in_range = n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX);
    (n.fract() == 0.0 && in_range).then_some(n as i32)
}

fn whole_number<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    whole_i32(n).ok_or_else(|| serde::de::Error::custom(format!("expected a whole number, got {}", n)))
}

fn optional_whole_number<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(|n| {
            whole_i32(n)
                .ok_or_else(|| serde::de::Error::custom(format!("expected a whole number, got {}", n)))
        })
        .transpose()
}

/// Escape LIKE metacharacters so user input only ever matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the member listing query
///
/// With a non-empty `search`, matches firstname by case-insensitive prefix,
/// or lastname/email by case-insensitive equality. The term is always bound.
pub fn search_query(search: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT * FROM members WHERE 1=1");

    if let Some(term) = search.filter(|s| !s.is_empty()) {
        query
            .push(" AND (firstname ILIKE ")
            .push_bind(format!("{}%", escape_like(term)))
            .push(" OR lower(lastname) = lower(")
            .push_bind(term.to_string())
            .push(") OR lower(email) = lower(")
            .push_bind(term.to_string())
            .push("))");
    }

    query.push(" ORDER BY joined_at DESC");
    query
}

impl Member {
    /// Insert a new member, returning the store-assigned id
    pub async fn create(input: &CreateMember, pool: &PgPool) -> Result<MemberId> {
        let id = sqlx::query_scalar::<_, MemberId>(
            r#"
            INSERT INTO members (
                firstname, lastname, age, email, gender, is_active, fide_rating,
                profile_photo_url, lichess_profile, chesscom_profile, fide_profile,
                overdue_subscription
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&input.firstname)
        .bind(&input.lastname)
        .bind(input.age)
        .bind(&input.email)
        .bind(input.gender.to_string())
        .bind(input.is_active)
        .bind(input.fide_rating)
        .bind(&input.profile_photo_url)
        .bind(&input.lichess_profile)
        .bind(&input.chess_com_profile)
        .bind(&input.fide_profile)
        .bind(input.over_due_subscription)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }

    /// List members, most recently joined first, optionally filtered by `search`
    pub async fn search(search: Option<&str>, pool: &PgPool) -> Result<Vec<Self>> {
        let mut query = search_query(search);
        let members = query.build_query_as::<Self>().fetch_all(pool).await?;
        Ok(members)
    }

    /// Check whether a member with this id exists
    pub async fn exists(id: MemberId, pool: &PgPool) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Apply a validated patch as a single UPDATE
    ///
    /// Returns the number of rows updated (0 if the member is gone).
    pub async fn apply_patch(id: MemberId, patch: &MemberPatch, pool: &PgPool) -> Result<u64> {
        let mut query = patch.update_query(id);
        let result = query.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Delete a member and all of its contacts in one transaction
    ///
    /// Returns the deleted id, or `None` if no such member existed. Any
    /// failure rolls back both deletions.
    pub async fn delete_with_contacts(id: MemberId, pool: &PgPool) -> Result<Option<MemberId>> {
        let mut tx = pool.begin().await?;

        let contacts_removed = MemberContact::delete_for_member(id, &mut *tx).await?;

        let deleted = sqlx::query_scalar::<_, MemberId>(
            "DELETE FROM members WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match deleted {
            Some(deleted_id) => {
                tx.commit().await?;
                debug!(member_id = %deleted_id, contacts_removed, "Deleted member with contacts");
                Ok(Some(deleted_id))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}

impl MemberProfile {
    /// Find member by ID
    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, firstname, lastname, age, gender, email, is_active, fide_rating,
                   overdue_subscription, lichess_profile, chesscom_profile, fide_profile,
                   joined_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
