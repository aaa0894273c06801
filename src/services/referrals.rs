use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{require, resolve_paging, respond, RequestHandler, Service, ServiceError};
use crate::models::{
    referrals::{NewReferral, Referral},
    Paging,
};
use crate::repositories::ReferralRepository;

pub enum ReferralRequest {
    AddReferral {
        referral: NewReferral,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    GetReferrals {
        paging: Paging,
        response: oneshot::Sender<Result<Vec<Referral>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ReferralRequestHandler {
    repository: Arc<dyn ReferralRepository>,
    deadline: Duration,
}

impl ReferralRequestHandler {
    pub fn new(repository: Arc<dyn ReferralRepository>, deadline: Duration) -> Self {
        ReferralRequestHandler {
            repository,
            deadline,
        }
    }

    pub async fn add_referral(&self, referral: &NewReferral) -> Result<String, ServiceError> {
        require("referral_code", &referral.referral_code)?;

        Ok(self.repository.add_referral(referral).await?)
    }

    pub async fn get_referrals(&self, paging: Paging) -> Result<Vec<Referral>, ServiceError> {
        let (page, size) = resolve_paging(paging)?;

        Ok(self.repository.get_referrals(page, size).await?)
    }
}

#[async_trait]
impl RequestHandler<ReferralRequest> for ReferralRequestHandler {
    async fn handle_request(&self, request: ReferralRequest) {
        match request {
            ReferralRequest::AddReferral { referral, response } => {
                respond(response, self.deadline, self.add_referral(&referral)).await;
            }
            ReferralRequest::GetReferrals { paging, response } => {
                respond(response, self.deadline, self.get_referrals(paging)).await;
            }
        }
    }
}

pub struct ReferralService;

impl ReferralService {
    pub fn new() -> Self {
        ReferralService {}
    }
}

#[async_trait]
impl Service<ReferralRequest, ReferralRequestHandler> for ReferralService {}
