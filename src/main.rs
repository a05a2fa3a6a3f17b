//! dyncall CLI - tools for working with interceptor manifests
//!
//! Commands:
//!   dyncall inspect <manifest>                      - List registered scopes
//!   dyncall resolve <manifest> --kind K --name N    - Show how a call would dispatch

use clap::{Parser, Subcommand};
use dyncall::registry::{Action, LoadedManifest, ManifestEntry};
use dyncall::{CallScope, CallSite, Manifest, ScopeKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dyncall")]
#[command(about = "Tools for working with dyncall interceptor manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scopes a manifest registers
    Inspect {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which path a call would take through the dispatch protocol
    Resolve {
        /// Path to the manifest JSON file
        manifest: PathBuf,

        /// Call kind: property-read, property-write or method-call
        #[arg(long, short = 'k')]
        kind: ScopeKind,

        /// Property or method name
        #[arg(long, short = 'n')]
        name: String,

        /// Method arity
        #[arg(long, short = 'a')]
        arity: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { manifest, json } => inspect_command(&manifest, json),
        Commands::Resolve {
            manifest,
            kind,
            name,
            arity,
        } => resolve_command(&manifest, CallScope::new(kind, name, arity)),
    }
}

fn load(path: &PathBuf) -> anyhow::Result<(Manifest, LoadedManifest)> {
    let manifest = Manifest::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))?;
    let loaded = manifest
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build resolver: {}", e))?;
    Ok((manifest, loaded))
}

fn inspect_command(path: &PathBuf, json: bool) -> anyhow::Result<()> {
    let (manifest, loaded) = load(path)?;

    if json {
        let output = serde_json::json!({
            "duplicates": manifest.duplicates,
            "scopes": loaded.resolver.scopes().iter().map(|scope| serde_json::json!({
                "scope": scope,
                "interceptor": loaded.resolver
                    .resolve_call_interceptor(scope)
                    .map(|i| i.name()),
            })).collect::<Vec<_>>(),
            "names": loaded.resolver.names(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("scopes:");
    for scope in loaded.resolver.scopes() {
        // With last-wins, the effective entry is the last one for the scope
        let entry = manifest.interceptors.iter().rev().find(|e| &e.scope() == scope);
        println!("  {}: {}", scope, format_entry(entry));
    }
    println!("names: {}", loaded.resolver.names().join(", "));
    Ok(())
}

fn resolve_command(path: &PathBuf, scope: CallScope) -> anyhow::Result<()> {
    let (_, loaded) = load(path)?;
    let site = CallSite::new(&loaded.resolver, scope, "cli");
    println!("{}: {}", site.scope(), site.classify());
    Ok(())
}

fn format_entry(entry: Option<&ManifestEntry>) -> String {
    let Some(entry) = entry else {
        return "unknown".to_string();
    };
    let action = match &entry.action {
        Action::Passthrough => "passthrough".to_string(),
        Action::Record => "record".to_string(),
        Action::Substitute(value) => format!("substitute {}", value),
    };
    if entry.track {
        format!("{} (tracked)", action)
    } else {
        action
    }
}
