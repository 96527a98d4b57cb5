pub(crate) mod maintenance;
pub(crate) mod query;
pub(crate) mod record;
pub(crate) mod session;

use agentmem_core::MemoryConfig;
use agentmem_service::MemoryServices;
use anyhow::Result;
use serde::Serialize;

use crate::Commands;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run(command: Commands, config: &MemoryConfig) -> Result<()> {
    if matches!(command, Commands::Migrate) {
        return maintenance::run_migrate(config);
    }
    let services = MemoryServices::open(config)?;

    match command {
        Commands::Observe(args) => record::run_observe(&services, args).await,
        Commands::Summarize(args) => record::run_summarize(&services, args).await,
        Commands::Session(cmd) => session::run_session(&services, cmd).await,
        Commands::Prompt(cmd) => session::run_prompt(&services, cmd).await,
        Commands::Project(cmd) => session::run_project(&services, cmd).await,
        Commands::Search { query, project, obs_type, since, until, limit } => {
            let filters = query::filters(project, obs_type, since, until, limit);
            print_json(&services.search.lexical_search(&query, &filters).await?)
        },
        Commands::Hybrid { query, project, limit } => {
            let hits = services.search.hybrid_search(&query, project.as_deref(), limit).await?;
            services.search.flush_access_updates().await;
            print_json(&hits)
        },
        Commands::Semantic { query, project, limit } => {
            let hits = services.search.semantic_search(&query, project.as_deref(), limit).await?;
            services.search.flush_access_updates().await;
            print_json(&hits)
        },
        Commands::Context { project, limit } => {
            let bundle = services.search.get_context(&project, limit).await?;
            services.search.flush_access_updates().await;
            print_json(&bundle)
        },
        Commands::Recent { project, obs_type, since, until, limit } => {
            let filters = query::filters(project, obs_type, since, until, limit);
            print_json(&services.search.filter_observations(&filters).await?)
        },
        Commands::Get { ids } => print_json(&services.search.get_by_ids(&ids).await?),
        Commands::Timeline { anchor, before, after } => {
            print_json(&services.search.timeline(anchor, before, after).await?)
        },
        Commands::ByFile { path, project, limit } => {
            print_json(&services.search.search_by_file(&path, project.as_deref(), limit).await?)
        },
        Commands::List { project, offset, limit } => {
            print_json(&services.search.list_observations(project.as_deref(), offset, limit).await?)
        },
        Commands::Projects => print_json(&services.search.list_projects().await?),
        Commands::Stats { project: Some(project) } => {
            print_json(&services.search.project_stats(&project).await?)
        },
        Commands::Stats { project: None } => print_json(&services.search.stats().await?),
        Commands::Backfill { batch } => {
            let generated = services.maintenance.backfill_embeddings(batch).await?;
            print_json(&serde_json::json!({ "generated": generated }))
        },
        Commands::EmbeddingStats => print_json(&services.maintenance.embedding_stats().await?),
        Commands::ClearEmbeddings => {
            let cleared = services.maintenance.clear_embeddings().await?;
            print_json(&serde_json::json!({ "cleared": cleared }))
        },
        Commands::Consolidate { min_group, dry_run } => {
            print_json(&services.maintenance.consolidate(min_group, dry_run).await?)
        },
        Commands::DetectStale { root } => {
            print_json(&services.maintenance.detect_staleness(root.as_deref()).await?)
        },
        Commands::Migrate => maintenance::run_migrate(config),
    }
}
