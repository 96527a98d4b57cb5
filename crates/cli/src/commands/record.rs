use agentmem_core::{NewObservation, NewSummary, ObservationType};
use agentmem_service::MemoryServices;
use anyhow::Result;
use clap::Args;

use super::print_json;

#[derive(Args)]
pub(crate) struct ObserveArgs {
    #[arg(long)]
    session: String,
    #[arg(short, long)]
    project: String,
    #[arg(short = 't', long = "type")]
    obs_type: ObservationType,
    #[arg(long)]
    title: String,
    #[arg(long)]
    subtitle: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    narrative: Option<String>,
    /// Repeatable
    #[arg(long = "fact")]
    facts: Vec<String>,
    /// Repeatable
    #[arg(long = "concept")]
    concepts: Vec<String>,
    /// Repeatable
    #[arg(long = "file-read")]
    files_read: Vec<String>,
    /// Repeatable
    #[arg(long = "file-modified")]
    files_modified: Vec<String>,
    #[arg(long, default_value = "0")]
    prompt_number: u32,
}

#[derive(Args)]
pub(crate) struct SummarizeArgs {
    #[arg(long)]
    session: String,
    #[arg(short, long)]
    project: String,
    #[arg(long)]
    request: Option<String>,
    #[arg(long)]
    investigated: Option<String>,
    #[arg(long)]
    learned: Option<String>,
    #[arg(long)]
    completed: Option<String>,
    #[arg(long)]
    next_steps: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    prompt_number: Option<u32>,
}

pub(crate) async fn run_observe(services: &MemoryServices, args: ObserveArgs) -> Result<()> {
    let obs = NewObservation::builder(args.session, args.project, args.obs_type, args.title)
        .maybe_subtitle(args.subtitle)
        .maybe_text(args.text)
        .maybe_narrative(args.narrative)
        .facts(args.facts)
        .concepts(args.concepts)
        .files_read(args.files_read)
        .files_modified(args.files_modified)
        .prompt_number(args.prompt_number)
        .build();
    let (id, embedding) = services.observations.create_observation_tracked(&obs).await?;
    // The process exits right after printing; let the embedding land first.
    let embedded = embedding.await.unwrap_or(false);
    print_json(&serde_json::json!({ "id": id, "embedded": embedded }))
}

pub(crate) async fn run_summarize(services: &MemoryServices, args: SummarizeArgs) -> Result<()> {
    let summary = NewSummary {
        request: args.request,
        investigated: args.investigated,
        learned: args.learned,
        completed: args.completed,
        next_steps: args.next_steps,
        notes: args.notes,
        prompt_number: args.prompt_number,
        ..NewSummary::new(args.session, args.project)
    };
    let id = services.sessions.create_summary(&summary).await?;
    print_json(&serde_json::json!({ "id": id }))
}
