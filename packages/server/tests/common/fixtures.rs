//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use club_core::common::MemberId;
use club_core::domains::contacts::{CreateMemberContact, MemberContact};
use club_core::domains::member::{CreateMember, Gender, Member};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

/// Short random tag to keep test data from different tests apart
pub fn unique_tag() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("T{}", &simple[..10])
}

/// A valid create-member request body
pub fn member_body(firstname: &str, lastname: &str, email: &str) -> Value {
    json!({
        "firstname": firstname,
        "lastname": lastname,
        "age": 25,
        "email": email,
        "gender": "Other"
    })
}

/// Create a test member with defaults for every optional field
pub async fn create_test_member(
    pool: &PgPool,
    firstname: &str,
    lastname: &str,
    email: &str,
) -> Result<MemberId> {
    let input = CreateMember {
        firstname: firstname.to_string(),
        lastname: lastname.to_string(),
        age: 30,
        email: email.to_string(),
        gender: Gender::Female,
        is_active: true,
        fide_rating: None,
        profile_photo_url: None,
        lichess_profile: None,
        chess_com_profile: None,
        fide_profile: None,
        over_due_subscription: false,
    };

    Member::create(&input, pool).await
}

/// Create a phone contact for a member
pub async fn create_test_contact(
    pool: &PgPool,
    member_id: MemberId,
    phone: &str,
) -> Result<MemberContact> {
    MemberContact::create(
        CreateMemberContact {
            member_id,
            contact_type: "phone".to_string(),
            contact_value: phone.to_string(),
            contact_label: Some("Mobile".to_string()),
        },
        pool,
    )
    .await
}

/// Count member rows with the given lastname
pub async fn count_members_with_lastname(pool: &PgPool, lastname: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members WHERE lastname = $1")
        .bind(lastname)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
