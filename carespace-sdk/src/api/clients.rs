//! Client (patient) management endpoints

use carespace_core::api::{
    ClientsListResponse, CreateClientRequest, MessageResponse, PaginationParams,
    ProgramAssignment, ProgramsListResponse, SuccessResponse, UpdateClientRequest,
};
use carespace_core::{Client, ClientStats, Result};
use std::sync::Arc;

use super::{decode, segment};
use crate::transport::HttpTransport;

/// Clients API client
#[derive(Debug, Clone)]
pub struct ClientsApi {
    transport: Arc<HttpTransport>,
}

impl ClientsApi {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn get_clients(&self, params: &PaginationParams) -> Result<ClientsListResponse> {
        params.validate()?;
        decode(self.transport.get("/clients", Some(&params.to_query())).await?)
    }

    pub async fn get_client(&self, client_id: &str) -> Result<Client> {
        let path = format!("/clients/{}", segment(client_id)?);
        decode(self.transport.get(&path, None).await?)
    }

    pub async fn create_client(&self, request: &CreateClientRequest) -> Result<Client> {
        decode(self.transport.post("/clients", Some(request), None).await?)
    }

    pub async fn update_client(
        &self,
        client_id: &str,
        request: &UpdateClientRequest,
    ) -> Result<Client> {
        let path = format!("/clients/{}", segment(client_id)?);
        decode(self.transport.put(&path, Some(request), None).await?)
    }

    pub async fn delete_client(&self, client_id: &str) -> Result<MessageResponse> {
        let path = format!("/clients/{}", segment(client_id)?);
        decode(self.transport.delete(&path, None).await?)
    }

    /// Session and exercise statistics of a client
    pub async fn get_client_stats(&self, client_id: &str) -> Result<ClientStats> {
        let path = format!("/clients/{}/stats", segment(client_id)?);
        decode(self.transport.get(&path, None).await?)
    }

    /// Programs currently assigned to a client
    pub async fn get_client_programs(
        &self,
        client_id: &str,
        params: &PaginationParams,
    ) -> Result<ProgramsListResponse> {
        params.validate()?;
        let path = format!("/clients/{}/programs", segment(client_id)?);
        decode(self.transport.get(&path, Some(&params.to_query())).await?)
    }

    /// Assign a program to a client; empty assignment fields are not sent
    pub async fn assign_program_to_client(
        &self,
        client_id: &str,
        program_id: &str,
        assignment: &ProgramAssignment,
    ) -> Result<SuccessResponse> {
        let path = format!(
            "/clients/{}/programs/{}",
            segment(client_id)?,
            segment(program_id)?
        );
        let body = assignment.normalized();
        decode(self.transport.post(&path, Some(&body), None).await?)
    }

    pub async fn remove_client_program(
        &self,
        client_id: &str,
        program_id: &str,
    ) -> Result<MessageResponse> {
        let path = format!(
            "/clients/{}/programs/{}",
            segment(client_id)?,
            segment(program_id)?
        );
        decode(self.transport.delete(&path, None).await?)
    }
}
