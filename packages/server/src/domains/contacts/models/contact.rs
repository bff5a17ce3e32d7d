use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{ContactId, MemberId};

/// Contact record owned by a member (phone, guardian email, ...)
///
/// Contacts never outlive their member: `Member::delete_with_contacts`
/// removes them in the same transaction as the member row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberContact {
    pub id: ContactId,
    pub member_id: MemberId,
    pub contact_type: String,          // 'phone', 'email', 'guardian', ...
    pub contact_value: String,
    pub contact_label: Option<String>, // 'Mobile', 'Mother', ...
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new contact
#[derive(Debug, Clone)]
pub struct CreateMemberContact {
    pub member_id: MemberId,
    pub contact_type: String,
    pub contact_value: String,
    pub contact_label: Option<String>,
}

impl MemberContact {
    /// Create a new contact for a member
    pub async fn create(input: CreateMemberContact, pool: &PgPool) -> Result<Self> {
        let contact = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO member_contacts (member_id, contact_type, contact_value, contact_label)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.member_id)
        .bind(&input.contact_type)
        .bind(&input.contact_value)
        .bind(&input.contact_label)
        .fetch_one(pool)
        .await?;
        Ok(contact)
    }

    /// Find all contacts for a member
    pub async fn find_for_member(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let contacts = sqlx::query_as::<_, Self>(
            r#"
            SELECT *
            FROM member_contacts
            WHERE member_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;
        Ok(contacts)
    }

    /// Delete all contacts for a member on the caller's connection
    ///
    /// Takes a connection rather than the pool so it can run inside the
    /// member delete transaction.
    pub async fn delete_for_member(member_id: MemberId, conn: &mut PgConnection) -> Result<u64> {
        let result = sqlx::query("DELETE FROM member_contacts WHERE member_id = $1")
            .bind(member_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
