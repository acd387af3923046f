//! Drive a scripted showcase session against the in-memory backend.
//!
//! The script registers an account, publishes a project, stars another
//! member's project and logs the filtered, sorted project view. Session
//! settings come from `SHOWCASE_*` variables and the configuration file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::collections::BTreeSet;
use std::ffi::OsString;

use clap::Parser;
use client::domain::{ProjectDraft, ProjectView, SortKey};
use client::outbound::MemoryBackend;
use client::{ClientContext, ClientPorts, ClientSettings};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `showcase-demo` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "showcase-demo",
    about = "Run a scripted showcase session against an in-memory backend",
    version
)]
struct CliArgs {
    /// Display name for the demo account.
    #[arg(long, default_value = "Ada Lovelace")]
    name: String,
    /// Email for the demo account.
    #[arg(long, default_value = "ada@example.com")]
    email: String,
    /// Password for the demo account.
    #[arg(long, default_value = "analytical-engine")]
    password: String,
    /// Title of the project the demo account publishes.
    #[arg(long, default_value = "Difference Engine")]
    title: String,
    /// Search query applied to the final project view.
    #[arg(long, default_value = "")]
    query: String,
    /// Sort applied to the final project view: a-z, z-a or most-votes.
    #[arg(long, default_value = "most-votes")]
    sort: SortKey,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse()?;
    let settings = ClientSettings::load_from_iter([OsString::from("showcase-demo")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build demo runtime")?;
    runtime.block_on(run(args, settings))
}

async fn run(args: CliArgs, settings: ClientSettings) -> Result<()> {
    let backend = MemoryBackend::new();
    seed_community(&backend)?;

    let mut ctx = ClientContext::from_settings(&settings, ClientPorts::in_memory(&backend))
        .wrap_err("invalid client settings")?;
    ctx.start()?.ready().await;

    ctx.session()
        .sign_up(&args.name, &args.email, &args.password, &args.password)
        .await?;
    ctx.projects().refresh_listing().await?;

    let published = ctx.projects().save_project(demo_draft(&args.title)).await?;
    info!(project_id = ?published.id, title = %published.title, "published demo project");

    let favourite = ctx
        .store()
        .select(|state| {
            state
                .projects
                .listing
                .iter()
                .find(|project| project.id != published.id)
                .cloned()
        })
        .ok_or_else(|| eyre!("seeded listing is empty"))?;
    let star = ctx.likes().track(&favourite)?;
    let starred = star.toggle().await?;
    info!(
        project_id = %starred.project_id,
        liked = starred.liked,
        count = starred.count,
        "starred project"
    );

    let mut view = ProjectView::new();
    let slice = ctx.store().select(|state| state.projects.clone());
    for project in view.compute(&slice, &args.query, args.sort).iter() {
        info!(
            title = %project.title,
            likes = project.like_count(),
            owner = %project.owner,
            "project"
        );
    }

    ctx.session().sign_out();
    ctx.stop();
    Ok(())
}

fn seed_community(backend: &MemoryBackend) -> Result<()> {
    let grace = backend
        .seed_account("grace@example.com", "cobol", "Grace Hopper")
        .wrap_err("failed to seed community account")?;
    let linus = backend
        .seed_account("linus@example.com", "tux", "Linus")
        .wrap_err("failed to seed community account")?;

    let drafts = [
        ("Compiler Bootstrap", vec![grace.clone(), linus.clone()]),
        ("Bug Tracker", vec![linus]),
    ];
    for (title, likers) in drafts {
        let mut draft = demo_draft(title);
        draft.likers = likers.into_iter().collect::<BTreeSet<_>>();
        let project = draft
            .validate(grace.clone())
            .wrap_err("seed project is invalid")?;
        backend
            .seed_project(project)
            .wrap_err("failed to seed project")?;
    }
    Ok(())
}

fn demo_draft(title: &str) -> ProjectDraft {
    let slug = title.to_lowercase().replace(' ', "-");
    ProjectDraft {
        thumbnail: format!("memory://assets/{slug}.png"),
        title: title.to_owned(),
        overview: format!("{title}, built for the showcase demo."),
        github: format!("https://github.com/example/{slug}"),
        points: vec![
            "Runs entirely in memory".to_owned(),
            "Exercises the session core".to_owned(),
        ],
        ..ProjectDraft::default()
    }
}
