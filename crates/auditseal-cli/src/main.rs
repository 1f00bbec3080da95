//! AuditSeal CLI - demo wiring and offline bundle verification.

use anyhow::Context;
use auditseal_bundle::{BundleBuilder, BundleVerifier, ComplianceProofBundle};
use auditseal_intercept::{ComplianceEvent, EventInterceptor, EventType};
use auditseal_ledger::AuditLedger;
use auditseal_pipeline::{AdaptiveAuditPipeline, AuditFidelity};
use auditseal_policy::{Policy, PolicyAction, PolicyCompiler, PolicyEffect, PolicyStatement};
use chrono::Utc;
use clap::Parser;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "auditseal")]
#[command(about = "AuditSeal - Tamper-Evident Compliance Audit Ledger")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the end-to-end demo pipeline and verify the resulting bundle
    Demo {
        /// Number of events to run through the pipeline
        #[arg(short, long, default_value_t = 10)]
        events: usize,
        /// Merkle batch size for the demo ledger
        #[arg(short, long, default_value_t = 5)]
        batch_size: usize,
    },
    /// Verify a serialized proof bundle offline
    Verify {
        /// Path to a bundle JSON file
        bundle: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Demo { events, batch_size }) => run_demo(events, batch_size),
        Some(Commands::Verify { bundle }) => verify_file(&bundle),
        None => {
            println!("AuditSeal v0.1.0 - Use --help for commands");
            Ok(())
        }
    }
}

fn run_demo(events: usize, batch_size: usize) -> anyhow::Result<()> {
    let mut compiler = PolicyCompiler::new();
    let policy = Policy::new("pol-retention", "1.0", "object-retention").with_statement(
        PolicyStatement::new(
            "stmt-write",
            PolicyEffect::Allow,
            vec![PolicyAction::Write, PolicyAction::Read],
            vec!["demo-bucket/*".to_string()],
        ),
    );
    let canonical = compiler.compile(&policy)?;
    info!(commitment = %canonical.commitment_hash, "compiled demo policy");

    let interceptor = EventInterceptor::new();
    let ledger = Arc::new(RwLock::new(AuditLedger::with_batch_size(batch_size)));
    let pipeline = AdaptiveAuditPipeline::new(Arc::clone(&ledger));
    pipeline.set_tenant_fidelity("tenant-demo", AuditFidelity::MerkleProof);

    for i in 0..events {
        let event = ComplianceEvent::new(
            format!("evt-{i}"),
            EventType::ObjectCreate,
            Utc::now(),
            "tenant-demo",
            "demo-bucket",
        )
        .with_object_key(format!("objects/{i}"))
        .with_principal("demo-operator");

        anyhow::ensure!(interceptor.intercept(event), "event queue rejected event {i}");
    }

    while let Some(drained) = interceptor.get_event(None) {
        pipeline.process_event(drained, Some(&canonical), None)?;
    }

    {
        let guard = ledger.read();
        info!(
            records = guard.record_count(),
            sealed_batches = guard.sealed_tree_count(),
            chain_ok = guard.verify_chain_integrity(),
            "pipeline drained"
        );
    }

    let builder = BundleBuilder::new(Arc::clone(&ledger));
    let bundle = builder.tenant_scope("tenant-demo", true);
    println!("{}", bundle.to_json()?);

    let verifier = BundleVerifier::new().with_known_roots(ledger.read().sealed_roots());
    let report = verifier.verify(&bundle);
    println!("{}", serde_json::to_string_pretty(&report)?);

    anyhow::ensure!(report.overall_ok, "demo bundle failed verification");
    Ok(())
}

fn verify_file(path: &PathBuf) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading bundle file {}", path.display()))?;
    let bundle: ComplianceProofBundle =
        serde_json::from_str(&raw).context("parsing bundle JSON")?;

    let report = auditseal_bundle::verify_bundle(&bundle);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.overall_ok {
        std::process::exit(1);
    }
    Ok(())
}
