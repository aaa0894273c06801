use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{require, resolve_paging, respond, RequestHandler, Service, ServiceError};
use crate::models::{
    programs::{NewProgram, Program, ProgramUpdate},
    Paging,
};
use crate::repositories::ProgramRepository;

pub enum ProgramRequest {
    AddProgram {
        program: NewProgram,
        response: oneshot::Sender<Result<String, ServiceError>>,
    },
    UpdateProgram {
        id: String,
        update: ProgramUpdate,
        response: oneshot::Sender<Result<Program, ServiceError>>,
    },
    GetProgram {
        id: String,
        response: oneshot::Sender<Result<Program, ServiceError>>,
    },
    GetPrograms {
        paging: Paging,
        response: oneshot::Sender<Result<Vec<Program>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ProgramRequestHandler {
    repository: Arc<dyn ProgramRepository>,
    deadline: Duration,
}

impl ProgramRequestHandler {
    pub fn new(repository: Arc<dyn ProgramRepository>, deadline: Duration) -> Self {
        ProgramRequestHandler {
            repository,
            deadline,
        }
    }

    pub async fn add_program(&self, program: &NewProgram) -> Result<String, ServiceError> {
        require("name", &program.name)?;
        require("title", &program.title)?;

        Ok(self
            .repository
            .add_program(&program.name, &program.title, program.active)
            .await?)
    }

    /// Applies the update, then reads the program back in a separate call.
    /// A concurrent writer may land between the two.
    pub async fn update_program(
        &self,
        id: &str,
        update: &ProgramUpdate,
    ) -> Result<Program, ServiceError> {
        require("id", id)?;
        if let Some(name) = &update.name {
            require("name", name)?;
        }

        self.repository.update_program(id, update).await?;
        Ok(self.repository.get_program(id).await?)
    }

    pub async fn get_program(&self, id: &str) -> Result<Program, ServiceError> {
        Ok(self.repository.get_program(id).await?)
    }

    pub async fn get_programs(&self, paging: Paging) -> Result<Vec<Program>, ServiceError> {
        let (page, size) = resolve_paging(paging)?;

        Ok(self.repository.get_programs(page, size).await?)
    }
}

#[async_trait]
impl RequestHandler<ProgramRequest> for ProgramRequestHandler {
    async fn handle_request(&self, request: ProgramRequest) {
        match request {
            ProgramRequest::AddProgram { program, response } => {
                respond(response, self.deadline, self.add_program(&program)).await;
            }
            ProgramRequest::UpdateProgram {
                id,
                update,
                response,
            } => {
                respond(response, self.deadline, self.update_program(&id, &update)).await;
            }
            ProgramRequest::GetProgram { id, response } => {
                respond(response, self.deadline, self.get_program(&id)).await;
            }
            ProgramRequest::GetPrograms { paging, response } => {
                respond(response, self.deadline, self.get_programs(paging)).await;
            }
        }
    }
}

pub struct ProgramService;

impl ProgramService {
    pub fn new() -> Self {
        ProgramService {}
    }
}

#[async_trait]
impl Service<ProgramRequest, ProgramRequestHandler> for ProgramService {}
