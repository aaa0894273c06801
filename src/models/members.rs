use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, sqlx::FromRow)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub program_id: String,
    pub referral_code: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub program_id: String,
    pub referral_code: Option<String>,
    pub is_active: Option<bool>,
}
