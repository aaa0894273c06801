use serde::{Deserialize, Serialize};

/// Status every referral starts in.
pub const STATUS_PENDING: &str = "pending";

/// A submitted lead. `program_id` and `member_id` are not stored on the
/// referral; they come from the member holding `referral_code`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct Referral {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub referral_code: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub program_id: String,
    pub member_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewReferral {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub referral_code: String,
}
