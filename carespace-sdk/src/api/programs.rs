//! Program and exercise endpoints

use carespace_core::api::{
    CreateExerciseRequest, CreateProgramRequest, DuplicateProgramRequest, ExercisesListResponse,
    MessageResponse, PaginationParams, ProgramFilter, ProgramsListResponse, UpdateProgramRequest,
};
use carespace_core::{Exercise, Program, Result};
use std::sync::Arc;

use super::{decode, segment};
use crate::transport::HttpTransport;

/// Page size used when listing program exercises without explicit paging
pub const DEFAULT_EXERCISE_PAGE_LIMIT: u32 = 50;

/// Programs API client
#[derive(Debug, Clone)]
pub struct ProgramsApi {
    transport: Arc<HttpTransport>,
}

impl ProgramsApi {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// List programs matching `filter`
    pub async fn get_programs(&self, filter: &ProgramFilter) -> Result<ProgramsListResponse> {
        filter.pagination.validate()?;
        decode(self.transport.get("/programs", Some(&filter.to_query())).await?)
    }

    pub async fn get_program(&self, program_id: &str) -> Result<Program> {
        let path = format!("/programs/{}", segment(program_id)?);
        decode(self.transport.get(&path, None).await?)
    }

    pub async fn create_program(&self, request: &CreateProgramRequest) -> Result<Program> {
        decode(self.transport.post("/programs", Some(request), None).await?)
    }

    pub async fn update_program(
        &self,
        program_id: &str,
        request: &UpdateProgramRequest,
    ) -> Result<Program> {
        let path = format!("/programs/{}", segment(program_id)?);
        decode(self.transport.put(&path, Some(request), None).await?)
    }

    pub async fn delete_program(&self, program_id: &str) -> Result<MessageResponse> {
        let path = format!("/programs/{}", segment(program_id)?);
        decode(self.transport.delete(&path, None).await?)
    }

    /// Exercises of a program; `None` fetches the first page of 50
    pub async fn get_program_exercises(
        &self,
        program_id: &str,
        params: Option<&PaginationParams>,
    ) -> Result<ExercisesListResponse> {
        let default_params = PaginationParams::page(1, DEFAULT_EXERCISE_PAGE_LIMIT);
        let params = params.unwrap_or(&default_params);
        params.validate()?;

        let path = format!("/programs/{}/exercises", segment(program_id)?);
        decode(self.transport.get(&path, Some(&params.to_query())).await?)
    }

    pub async fn add_exercise_to_program(
        &self,
        program_id: &str,
        request: &CreateExerciseRequest,
    ) -> Result<Exercise> {
        let path = format!("/programs/{}/exercises", segment(program_id)?);
        decode(self.transport.post(&path, Some(request), None).await?)
    }

    pub async fn update_program_exercise(
        &self,
        program_id: &str,
        exercise_id: &str,
        request: &CreateExerciseRequest,
    ) -> Result<Exercise> {
        let path = format!(
            "/programs/{}/exercises/{}",
            segment(program_id)?,
            segment(exercise_id)?
        );
        decode(self.transport.put(&path, Some(request), None).await?)
    }

    pub async fn remove_program_exercise(
        &self,
        program_id: &str,
        exercise_id: &str,
    ) -> Result<MessageResponse> {
        let path = format!(
            "/programs/{}/exercises/{}",
            segment(program_id)?,
            segment(exercise_id)?
        );
        decode(self.transport.delete(&path, None).await?)
    }

    /// Copy a program. Without options the copy includes its exercises.
    pub async fn duplicate_program(
        &self,
        program_id: &str,
        options: Option<&DuplicateProgramRequest>,
    ) -> Result<Program> {
        let default_options = DuplicateProgramRequest::default();
        let options = options.unwrap_or(&default_options);

        let path = format!("/programs/{}/duplicate", segment(program_id)?);
        decode(self.transport.post(&path, Some(options), None).await?)
    }

    /// List reusable program templates
    pub async fn get_program_templates(
        &self,
        filter: &ProgramFilter,
    ) -> Result<ProgramsListResponse> {
        filter.pagination.validate()?;
        decode(
            self.transport
                .get("/programs/templates", Some(&filter.to_query()))
                .await?,
        )
    }
}
