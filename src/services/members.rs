use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{require, resolve_paging, respond, RequestHandler, Service, ServiceError};
use crate::models::{
    members::{Member, NewMember},
    Paging,
};
use crate::repositories::MemberRepository;

pub enum MemberRequest {
    AddMember {
        member: NewMember,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    GetMember {
        id: String,
        response: oneshot::Sender<Result<Member, ServiceError>>,
    },
    GetMembers {
        paging: Paging,
        response: oneshot::Sender<Result<Vec<Member>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct MemberRequestHandler {
    repository: Arc<dyn MemberRepository>,
    deadline: Duration,
}

impl MemberRequestHandler {
    pub fn new(repository: Arc<dyn MemberRepository>, deadline: Duration) -> Self {
        MemberRequestHandler {
            repository,
            deadline,
        }
    }

    /// New members are active unless told otherwise; a missing referral
    /// code is generated by the store.
    pub async fn add_member(&self, member: &NewMember) -> Result<String, ServiceError> {
        require("first_name", &member.first_name)?;
        require("email", &member.email)?;
        require("program_id", &member.program_id)?;
        if let Some(code) = &member.referral_code {
            require("referral_code", code)?;
        }

        Ok(self
            .repository
            .add_member(
                &member.first_name,
                member.last_name.as_deref(),
                &member.email,
                &member.program_id,
                member.referral_code.as_deref(),
                member.is_active.unwrap_or(true),
            )
            .await?)
    }

    pub async fn get_member(&self, id: &str) -> Result<Member, ServiceError> {
        Ok(self.repository.get_member(id).await?)
    }

    pub async fn get_members(&self, paging: Paging) -> Result<Vec<Member>, ServiceError> {
        let (page, size) = resolve_paging(paging)?;

        Ok(self.repository.get_members(page, size).await?)
    }
}

#[async_trait]
impl RequestHandler<MemberRequest> for MemberRequestHandler {
    async fn handle_request(&self, request: MemberRequest) {
        match request {
            MemberRequest::AddMember { member, response } => {
                respond(response, self.deadline, self.add_member(&member)).await;
            }
            MemberRequest::GetMember { id, response } => {
                respond(response, self.deadline, self.get_member(&id)).await;
            }
            MemberRequest::GetMembers { paging, response } => {
                respond(response, self.deadline, self.get_members(paging)).await;
            }
        }
    }
}

pub struct MemberService;

impl MemberService {
    pub fn new() -> Self {
        MemberService {}
    }
}

#[async_trait]
impl Service<MemberRequest, MemberRequestHandler> for MemberService {}
