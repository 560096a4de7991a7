//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use carespace_core::api::{
    ClientsListResponse, ExercisesListResponse, LoginResponse, Paginated, ProgramsListResponse,
    UsersListResponse,
};
use carespace_core::{Client, ClientStats, Exercise, Program, User};
use colored::*;
use serde::Serialize;

use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn active_marker(active: bool) -> String {
    if active {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

/// Footer line shown under every paginated table
fn page_footer<T>(list: &Paginated<T>) -> String {
    format!(
        "Page {} of {} ({} total)",
        list.page,
        list.pages.max(1),
        list.total
    )
    .dimmed()
    .to_string()
}

fn titled_table<R: Tabled>(title: &str, rows: Vec<R>) -> String {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!("{}\n{}", title.bold(), table)
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format login response; the tokens themselves are only shown as JSON
pub fn format_login(response: &LoginResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(response),
        OutputFormat::Table => Ok(format!(
            "{}\nToken type: {}\nExpires in: {} seconds",
            "Logged in".bold(),
            response.token_type.cyan(),
            response.expires_in.to_string().yellow()
        )),
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.display_name().cyan().to_string(),
            email: user.email.clone(),
            role: or_dash(user.role.as_deref()),
            active: active_marker(user.is_active),
        }
    }
}

/// Format a page of users
pub fn format_users(users: &UsersListResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(users),
        OutputFormat::Table => {
            let rows: Vec<UserRow> = users.data.iter().map(UserRow::from).collect();
            Ok(format!(
                "{}\n{}",
                titled_table("Users:", rows),
                page_footer(users)
            ))
        }
    }
}

/// Format a single user
pub fn format_user(user: &User, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(user),
        OutputFormat::Table => Ok(titled_table("User:", vec![UserRow::from(user)])),
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.cyan().to_string(),
            email: or_dash(client.email.as_deref()),
            phone: or_dash(client.phone.as_deref()),
            active: active_marker(client.is_active),
        }
    }
}

/// Format a page of clients
pub fn format_clients(clients: &ClientsListResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(clients),
        OutputFormat::Table => {
            let rows: Vec<ClientRow> = clients.data.iter().map(ClientRow::from).collect();
            Ok(format!(
                "{}\n{}",
                titled_table("Clients:", rows),
                page_footer(clients)
            ))
        }
    }
}

/// Format a single client, including notes when present
pub fn format_client(client: &Client, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(client),
        OutputFormat::Table => {
            let mut output = titled_table("Client:", vec![ClientRow::from(client)]);
            if let Some(notes) = &client.notes {
                output.push_str(&format!("\nNotes: {}", notes));
            }
            Ok(output)
        }
    }
}

/// Format client statistics
pub fn format_client_stats(stats: &ClientStats, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(stats),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"Client Statistics".bold().to_string());
            output.push('\n');
            output.push_str(&format!(
                "Total sessions: {}",
                stats.total_sessions.to_string().yellow()
            ));
            output.push('\n');
            output.push_str(&format!(
                "Completed exercises: {}",
                stats.completed_exercises.to_string().yellow()
            ));
            output.push('\n');
            output.push_str(&format!(
                "Average score: {}",
                stats
                    .average_score
                    .map(|score| format!("{:.1}", score))
                    .unwrap_or_else(|| "-".to_string())
                    .cyan()
            ));
            output.push('\n');
            output.push_str(&format!(
                "Last session: {}",
                stats
                    .last_session_date
                    .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string())
            ));
            Ok(output)
        }
    }
}

#[derive(Tabled)]
struct ProgramRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Difficulty")]
    difficulty: String,
    #[tabled(rename = "Minutes")]
    duration: String,
    #[tabled(rename = "Template")]
    template: String,
}

impl From<&Program> for ProgramRow {
    fn from(program: &Program) -> Self {
        Self {
            id: program.id.clone(),
            name: program.name.cyan().to_string(),
            category: or_dash(program.category.as_deref()),
            difficulty: or_dash(program.difficulty.as_deref()).yellow().to_string(),
            duration: program
                .duration
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            template: if program.is_template {
                "yes".to_string()
            } else {
                "no".dimmed().to_string()
            },
        }
    }
}

/// Format a page of programs
pub fn format_programs(programs: &ProgramsListResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(programs),
        OutputFormat::Table => {
            let rows: Vec<ProgramRow> = programs.data.iter().map(ProgramRow::from).collect();
            Ok(format!(
                "{}\n{}",
                titled_table("Programs:", rows),
                page_footer(programs)
            ))
        }
    }
}

/// Format a single program followed by its exercises
pub fn format_program(program: &Program, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(program),
        OutputFormat::Table => {
            let mut output = titled_table("Program:", vec![ProgramRow::from(program)]);
            if let Some(description) = &program.description {
                output.push_str(&format!("\n{}", description));
            }
            if !program.exercises.is_empty() {
                output.push('\n');
                output.push_str(&exercise_table(&program.exercises));
            }
            Ok(output)
        }
    }
}

#[derive(Tabled)]
struct ExerciseRow {
    #[tabled(rename = "#")]
    order: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Sets x Reps")]
    volume: String,
    #[tabled(rename = "Rest (s)")]
    rest: String,
}

fn exercise_table(exercises: &[Exercise]) -> String {
    let mut sorted: Vec<&Exercise> = exercises.iter().collect();
    sorted.sort_by_key(|exercise| exercise.order);

    let rows: Vec<ExerciseRow> = sorted
        .into_iter()
        .map(|exercise| ExerciseRow {
            order: exercise.order,
            id: exercise.id.clone(),
            name: exercise.name.cyan().to_string(),
            volume: match (exercise.sets, exercise.repetitions) {
                (Some(sets), Some(reps)) => format!("{} x {}", sets, reps),
                (None, Some(reps)) => reps.to_string(),
                (Some(sets), None) => format!("{} sets", sets),
                (None, None) => "-".to_string(),
            },
            rest: exercise
                .rest_time
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    titled_table("Exercises:", rows)
}

/// Format a page of exercises
pub fn format_exercises(exercises: &ExercisesListResponse, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(exercises),
        OutputFormat::Table => Ok(format!(
            "{}\n{}",
            exercise_table(&exercises.data),
            page_footer(exercises)
        )),
    }
}

/// Format health check outcome
pub fn format_health(base_url: &str, healthy: bool, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(&serde_json::json!({
            "base_url": base_url,
            "healthy": healthy,
        })),
        OutputFormat::Table => Ok(format!(
            "API at {}: {}",
            base_url.cyan(),
            if healthy {
                "healthy".green().bold()
            } else {
                "unreachable".red().bold()
            }
        )),
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
