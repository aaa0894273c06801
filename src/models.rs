use serde::Deserialize;

pub mod members;
pub mod programs;
pub mod referrals;

/// Page selection for listing calls. Pages start at 1.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct Paging {
    pub page: Option<i64>,
    pub size: Option<i64>,
}
