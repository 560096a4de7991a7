//! API models for the Carespace REST API
//!
//! Request payloads, list envelopes and query-parameter sets used by the
//! resource sub-clients.

use crate::error::{CarespaceError, Result};
use crate::impl_payload;
use crate::payload::QueryParams;
use crate::types::{Address, Client, Exercise, Program, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest page size accepted by the API
pub const MAX_PAGE_LIMIT: u32 = 100;

// Authentication

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Check the credentials look sane before sending them
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(CarespaceError::validation(format!(
                    "Invalid email address: {}",
                    self.email
                )))
            }
        }
        if self.password.is_empty() {
            return Err(CarespaceError::validation("Password cannot be empty"));
        }
        Ok(())
    }
}

/// Successful login or token refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

// Users

/// Create user request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl CreateUserRequest {
    /// New user with the default `client` role
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            first_name: None,
            last_name: None,
            role: Some("client".to_string()),
            password: None,
        }
    }
}

/// Update user request; only present fields are changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// Clients

/// Create client request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateClientRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            medical_history: None,
            notes: None,
        }
    }
}

/// Update client request; only present fields are changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClientRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Assignment of a program to a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramAssignment {
    /// Start date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// End date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ProgramAssignment {
    /// Drop fields that were given as empty strings
    pub fn normalized(&self) -> Self {
        fn keep(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.is_empty()).cloned()
        }
        Self {
            start_date: keep(&self.start_date),
            end_date: keep(&self.end_date),
            notes: keep(&self.notes),
        }
    }
}

// Programs

/// Create program request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgramRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Duration in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub is_template: bool,
}

impl CreateProgramRequest {
    /// New non-template program at `beginner` difficulty
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            difficulty: Some("beginner".to_string()),
            duration: None,
            is_template: false,
        }
    }
}

/// Update program request; only present fields are changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProgramRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Create (or replace) exercise request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
    #[serde(default)]
    pub order: u32,
}

impl CreateExerciseRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            instructions: None,
            video_url: None,
            image_url: None,
            duration: None,
            repetitions: None,
            sets: None,
            rest_time: None,
            order: 0,
        }
    }
}

/// Options for duplicating a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateProgramRequest {
    /// Name of the copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub copy_exercises: bool,
}

impl Default for DuplicateProgramRequest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            copy_exercises: true,
        }
    }
}

impl_payload!(
    LoginRequest,
    RefreshTokenRequest,
    CreateUserRequest,
    UpdateUserRequest,
    CreateClientRequest,
    UpdateClientRequest,
    ProgramAssignment,
    CreateProgramRequest,
    UpdateProgramRequest,
    CreateExerciseRequest,
    DuplicateProgramRequest,
);

// Pagination

/// Paginated list envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    /// Total number of items
    pub total: u64,
    /// Current page (1-based)
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Total number of pages
    pub pages: u32,
}

pub type UsersListResponse = Paginated<User>;
pub type ClientsListResponse = Paginated<Client>;
pub type ProgramsListResponse = Paginated<Program>;
pub type ExercisesListResponse = Paginated<Exercise>;

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Pagination, search and sort parameters shared by list endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
            sort_by: None,
            sort_order: Some(SortOrder::Asc),
        }
    }
}

impl PaginationParams {
    /// Page/limit/search only, without sort parameters
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
            sort_by: None,
            sort_order: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(order);
        self
    }

    /// Validate page and limit ranges
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(CarespaceError::validation("page must be at least 1"));
        }
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT {
            return Err(CarespaceError::validation(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_LIMIT
            )));
        }
        Ok(())
    }

    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with("page", self.page)
            .with("limit", self.limit)
            .with_opt("search", self.search.as_deref())
            .with_opt("sort_by", self.sort_by.as_deref())
            .with_opt("sort_order", self.sort_order.map(|o| o.as_str()))
    }
}

/// Filters for program listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramFilter {
    pub pagination: PaginationParams,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub is_template: Option<bool>,
}

impl ProgramFilter {
    pub fn to_query(&self) -> QueryParams {
        self.pagination
            .to_query()
            .with_opt("category", self.category.as_deref())
            .with_opt("difficulty", self.difficulty.as_deref())
            .with_opt("is_template", self.is_template)
    }
}

// Common responses

/// Generic message response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Success flag with optional message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
