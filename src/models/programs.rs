use serde::{Deserialize, Serialize};

/// A referral campaign, one row of `programs`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub title: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewProgram {
    pub name: String,
    pub title: String,
    pub active: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProgramUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub active: Option<bool>,
}
