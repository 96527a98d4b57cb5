use agentmem_core::NewUserPrompt;
use agentmem_service::MemoryServices;
use anyhow::Result;
use clap::Subcommand;

use super::print_json;

#[derive(Subcommand)]
pub(crate) enum SessionCommand {
    /// Start a session, or return the existing one for this content id
    Start {
        content_session_id: String,
        #[arg(short, long)]
        project: String,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Show a session
    Get { content_session_id: String },
    /// Link the memory-side session id
    Link { content_session_id: String, memory_session_id: String },
    /// Mark an active session completed
    Complete { content_session_id: String },
    /// Mark an active session failed
    Fail { content_session_id: String },
    /// A session's observations in prompt order
    Observations { session_id: String },
}

#[derive(Subcommand)]
pub(crate) enum PromptCommand {
    /// Record a user prompt
    Record {
        #[arg(long)]
        session: String,
        #[arg(short, long)]
        project: String,
        #[arg(long)]
        number: u32,
        text: String,
    },
    /// Prompts of one session
    List { session_id: String },
    /// Number of prompts recorded for a session
    Count { session_id: String },
    /// Substring search over prompt text
    Search {
        query: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ProjectCommand {
    /// Set a project's display name
    Rename { project: String, display_name: String },
    /// Show one project's alias
    Alias { project: String },
    /// All display-name aliases
    Aliases,
    /// Recent summaries of a project
    Summaries {
        project: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

pub(crate) async fn run_session(services: &MemoryServices, cmd: SessionCommand) -> Result<()> {
    let sessions = &services.sessions;
    match cmd {
        SessionCommand::Start { content_session_id, project, prompt } => {
            let session =
                sessions.start_session(&content_session_id, &project, prompt.as_deref()).await?;
            print_json(&session)
        },
        SessionCommand::Get { content_session_id } => {
            print_json(&sessions.get_session(&content_session_id).await?)
        },
        SessionCommand::Link { content_session_id, memory_session_id } => {
            let updated =
                sessions.set_memory_session_id(&content_session_id, &memory_session_id).await?;
            print_json(&serde_json::json!({ "updated": updated }))
        },
        SessionCommand::Complete { content_session_id } => {
            let changed = sessions.complete_session(&content_session_id).await?;
            print_json(&serde_json::json!({ "changed": changed }))
        },
        SessionCommand::Fail { content_session_id } => {
            let changed = sessions.fail_session(&content_session_id).await?;
            print_json(&serde_json::json!({ "changed": changed }))
        },
        SessionCommand::Observations { session_id } => {
            print_json(&services.observations.get_session_observations(&session_id).await?)
        },
    }
}

pub(crate) async fn run_prompt(services: &MemoryServices, cmd: PromptCommand) -> Result<()> {
    let sessions = &services.sessions;
    match cmd {
        PromptCommand::Record { session, project, number, text } => {
            let id =
                sessions.record_prompt(&NewUserPrompt::new(session, project, number, text)).await?;
            print_json(&serde_json::json!({ "id": id }))
        },
        PromptCommand::List { session_id } => print_json(&sessions.list_prompts(&session_id).await?),
        PromptCommand::Count { session_id } => {
            let count = sessions.count_prompts(&session_id).await?;
            print_json(&serde_json::json!({ "count": count }))
        },
        PromptCommand::Search { query, project, limit } => {
            print_json(&sessions.search_prompts(&query, project.as_deref(), limit).await?)
        },
    }
}

pub(crate) async fn run_project(services: &MemoryServices, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::Rename { project, display_name } => {
            services.sessions.rename_project(&project, &display_name).await?;
            print_json(&services.sessions.get_project_alias(&project).await?)
        },
        ProjectCommand::Alias { project } => {
            print_json(&services.sessions.get_project_alias(&project).await?)
        },
        ProjectCommand::Aliases => print_json(&services.sessions.list_project_aliases().await?),
        ProjectCommand::Summaries { project, limit } => {
            print_json(&services.sessions.list_project_summaries(&project, limit).await?)
        },
    }
}
