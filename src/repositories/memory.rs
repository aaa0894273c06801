//! In-process stand-in for [`PgRepository`](super::PgRepository) used by
//! service and HTTP tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    offset, MemberRepository, ProgramRepository, ReferralRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{
    members::Member,
    programs::{Program, ProgramUpdate},
    referrals::{NewReferral, Referral, STATUS_PENDING},
};
use crate::utils::{generate_code, REFERRAL_CODE_LENGTH};

#[derive(Default)]
struct Tables {
    programs: Vec<Program>,
    members: Vec<Member>,
    referrals: Vec<Referral>,
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(rows: &[T], page: i64, size: i64) -> RepositoryResult<Vec<T>> {
    let skip = offset(page, size);
    if skip < 0 || size < 0 {
        return Err(RepositoryError::Persistence {
            operation: "page",
            source: sqlx::Error::Protocol("negative LIMIT or OFFSET".to_string()),
        });
    }

    Ok(rows
        .iter()
        .skip(skip as usize)
        .take(size as usize)
        .cloned()
        .collect())
}

#[async_trait]
impl ProgramRepository for MemoryRepository {
    async fn add_program(
        &self,
        name: &str,
        title: &str,
        is_active: bool,
    ) -> RepositoryResult<String> {
        let now = Utc::now().timestamp();
        let program = Program {
            id: Uuid::new_v4().hyphenated().to_string(),
            name: name.to_string(),
            title: title.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
        };
        let id = program.id.clone();
        self.tables.lock().unwrap().programs.push(program);

        Ok(id)
    }

    async fn update_program(&self, id: &str, update: &ProgramUpdate) -> RepositoryResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(program) = tables.programs.iter_mut().find(|p| p.id == id) {
            if let Some(name) = &update.name {
                program.name = name.clone();
            }
            if let Some(title) = &update.title {
                program.title = title.clone();
            }
            if let Some(active) = update.active {
                program.is_active = active;
            }
            program.updated_at = program.updated_at.max(Utc::now().timestamp());
        }

        Ok(())
    }

    async fn get_program(&self, id: &str) -> RepositoryResult<Program> {
        self.tables
            .lock()
            .unwrap()
            .programs
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "program",
                id: id.to_string(),
            })
    }

    async fn get_programs(&self, page: i64, size: i64) -> RepositoryResult<Vec<Program>> {
        page_of(&self.tables.lock().unwrap().programs, page, size)
    }
}

#[async_trait]
impl MemberRepository for MemoryRepository {
    async fn add_member(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        program_id: &str,
        referral_code: Option<&str>,
        is_active: bool,
    ) -> RepositoryResult<String> {
        let now = Utc::now().timestamp();
        let member = Member {
            id: Uuid::new_v4().hyphenated().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            email: email.to_string(),
            program_id: program_id.to_string(),
            referral_code: referral_code
                .map(str::to_string)
                .unwrap_or_else(|| generate_code(REFERRAL_CODE_LENGTH)),
            is_active,
            created_at: now,
            updated_at: now,
        };
        let id = member.id.clone();
        self.tables.lock().unwrap().members.push(member);

        Ok(id)
    }

    async fn get_member(&self, id: &str) -> RepositoryResult<Member> {
        self.tables
            .lock()
            .unwrap()
            .members
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "member",
                id: id.to_string(),
            })
    }

    async fn get_members(&self, page: i64, size: i64) -> RepositoryResult<Vec<Member>> {
        page_of(&self.tables.lock().unwrap().members, page, size)
    }
}

#[async_trait]
impl ReferralRepository for MemoryRepository {
    async fn add_referral(&self, referral: &NewReferral) -> RepositoryResult<String> {
        let now = Utc::now().timestamp();
        let stored = Referral {
            id: Uuid::new_v4().hyphenated().to_string(),
            first_name: referral.first_name.clone(),
            last_name: referral.last_name.clone(),
            email: referral.email.clone(),
            phone: referral.phone.clone(),
            referral_code: referral.referral_code.clone(),
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
            program_id: String::new(),
            member_id: String::new(),
        };
        let id = stored.id.clone();
        self.tables.lock().unwrap().referrals.push(stored);

        Ok(id)
    }

    async fn get_referrals(&self, page: i64, size: i64) -> RepositoryResult<Vec<Referral>> {
        let tables = self.tables.lock().unwrap();
        let joined: Vec<Referral> = tables
            .referrals
            .iter()
            .filter_map(|referral| {
                tables
                    .members
                    .iter()
                    .find(|m| m.referral_code == referral.referral_code)
                    .map(|member| Referral {
                        program_id: member.program_id.clone(),
                        member_id: member.id.clone(),
                        ..referral.clone()
                    })
            })
            .collect();

        page_of(&joined, page, size)
    }
}
