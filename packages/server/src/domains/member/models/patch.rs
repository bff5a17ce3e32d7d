//! Partial member updates.
//!
//! A PATCH body is an arbitrary JSON object. It is turned into a
//! [`MemberPatch`] by looking every key up in a closed field table; the
//! resulting `UPDATE` only ever contains column names from that table and
//! binds every value as a parameter.

use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};
use thiserror::Error;

use crate::common::MemberId;
use crate::domains::member::models::member::{whole_i32, Gender};

/// Every member attribute a PATCH may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    Firstname,
    Lastname,
    Age,
    Email,
    Gender,
    IsActive,
    FideRating,
    ProfilePhotoUrl,
    LichessProfile,
    ChessComProfile,
    FideProfile,
    OverDueSubscription,
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Gender,
    Integer { min: i32 },
    Boolean,
}

impl MemberField {
    pub const ALL: [MemberField; 12] = [
        MemberField::Firstname,
        MemberField::Lastname,
        MemberField::Age,
        MemberField::Email,
        MemberField::Gender,
        MemberField::IsActive,
        MemberField::FideRating,
        MemberField::ProfilePhotoUrl,
        MemberField::LichessProfile,
        MemberField::ChessComProfile,
        MemberField::FideProfile,
        MemberField::OverDueSubscription,
    ];

    /// Look up a field by its API key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// API (JSON) key
    pub fn key(self) -> &'static str {
        match self {
            MemberField::Firstname => "firstname",
            MemberField::Lastname => "lastname",
            MemberField::Age => "age",
            MemberField::Email => "email",
            MemberField::Gender => "gender",
            MemberField::IsActive => "isActive",
            MemberField::FideRating => "fideRating",
            MemberField::ProfilePhotoUrl => "profilePhotoUrl",
            MemberField::LichessProfile => "lichessProfile",
            MemberField::ChessComProfile => "chessComProfile",
            MemberField::FideProfile => "fideProfile",
            MemberField::OverDueSubscription => "overDueSubscription",
        }
    }

    /// Column in `members`
    pub fn column(self) -> &'static str {
        match self {
            MemberField::Firstname => "firstname",
            MemberField::Lastname => "lastname",
            MemberField::Age => "age",
            MemberField::Email => "email",
            MemberField::Gender => "gender",
            MemberField::IsActive => "is_active",
            MemberField::FideRating => "fide_rating",
            MemberField::ProfilePhotoUrl => "profile_photo_url",
            MemberField::LichessProfile => "lichess_profile",
            MemberField::ChessComProfile => "chesscom_profile",
            MemberField::FideProfile => "fide_profile",
            MemberField::OverDueSubscription => "overdue_subscription",
        }
    }

    /// Whether the column accepts NULL
    pub fn nullable(self) -> bool {
        matches!(
            self,
            MemberField::Email
                | MemberField::FideRating
                | MemberField::ProfilePhotoUrl
                | MemberField::LichessProfile
                | MemberField::ChessComProfile
                | MemberField::FideProfile
        )
    }

    fn kind(self) -> FieldKind {
        match self {
            MemberField::Age => FieldKind::Integer { min: 14 },
            MemberField::FideRating => FieldKind::Integer { min: 1 },
            MemberField::Gender => FieldKind::Gender,
            MemberField::IsActive | MemberField::OverDueSubscription => FieldKind::Boolean,
            _ => FieldKind::Text,
        }
    }
}

/// A typed value ready to be bound
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Integer(Option<i32>),
    Boolean(Option<bool>),
}

#[derive(Debug, Error, PartialEq)]
pub enum PatchError {
    #[error("No fields provided")]
    Empty,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {0} cannot be cleared")]
    NotNullable(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn invalid(field: MemberField, reason: impl Into<String>) -> PatchError {
    PatchError::InvalidValue {
        field: field.key(),
        reason: reason.into(),
    }
}

impl FieldValue {
    /// Convert a raw JSON value for `field`
    ///
    /// An empty string means "clear this field" and becomes NULL.
    fn from_json(field: MemberField, value: Value) -> Result<Self, PatchError> {
        let value = match value {
            Value::String(s) if s.is_empty() => Value::Null,
            other => other,
        };

        if value.is_null() {
            if !field.nullable() {
                return Err(PatchError::NotNullable(field.key()));
            }
            return Ok(match field.kind() {
                FieldKind::Text | FieldKind::Gender => FieldValue::Text(None),
                FieldKind::Integer { .. } => FieldValue::Integer(None),
                FieldKind::Boolean => FieldValue::Boolean(None),
            });
        }

        match field.kind() {
            FieldKind::Text => value
                .as_str()
                .map(|s| FieldValue::Text(Some(s.to_string())))
                .ok_or_else(|| invalid(field, "expected a string")),
            FieldKind::Gender => {
                let gender: Gender = value
                    .as_str()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| invalid(field, "expected one of Male, Female, Other"))?;
                Ok(FieldValue::Text(Some(gender.to_string())))
            }
            FieldKind::Integer { min } => {
                let n = value
                    .as_f64()
                    .and_then(whole_i32)
                    .ok_or_else(|| invalid(field, "expected a whole number"))?;
                if n < min {
                    return Err(invalid(field, format!("must be at least {}", min)));
                }
                Ok(FieldValue::Integer(Some(n)))
            }
            FieldKind::Boolean => value
                .as_bool()
                .map(|b| FieldValue::Boolean(Some(b)))
                .ok_or_else(|| invalid(field, "expected a boolean")),
        }
    }
}

/// Validated set of column assignments for one member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberPatch {
    assignments: Vec<(MemberField, FieldValue)>,
}

impl MemberPatch {
    /// Validate a PATCH body
    pub fn from_json(body: Map<String, Value>) -> Result<Self, PatchError> {
        if body.is_empty() {
            return Err(PatchError::Empty);
        }

        let mut assignments = body
            .into_iter()
            .map(|(key, value)| -> Result<(MemberField, FieldValue), PatchError> {
                let field =
                    MemberField::from_key(&key).ok_or(PatchError::UnknownField(key))?;
                Ok((field, FieldValue::from_json(field, value)?))
            })
            .collect::<Result<Vec<_>, PatchError>>()?;

        // Column order follows the field table, not the request body
        assignments.sort_by_key(|(field, _)| *field as u8);

        Ok(Self { assignments })
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Fields touched by this patch, in assignment order
    pub fn fields(&self) -> impl Iterator<Item = MemberField> + '_ {
        self.assignments.iter().map(|(field, _)| *field)
    }

    /// `UPDATE members SET col = $1, ... WHERE id = $n`
    pub fn update_query(&self, id: MemberId) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new("UPDATE members SET ");

        let mut assignments = query.separated(", ");
        for (field, value) in &self.assignments {
            assignments.push(field.column());
            assignments.push_unseparated(" = ");
            match value {
                FieldValue::Text(v) => assignments.push_bind_unseparated(v.clone()),
                FieldValue::Integer(v) => assignments.push_bind_unseparated(*v),
                FieldValue::Boolean(v) => assignments.push_bind_unseparated(*v),
            };
        }

        query.push(" WHERE id = ").push_bind(id);
        query
    }
}
