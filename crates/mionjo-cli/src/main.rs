//! mionjo - operational command line for the activity tracker
//!
//! Usage:
//!   mionjo list [--filter en_cours|termine|en_retard]
//!   mionjo upload <record_id> <file_path>
//!   mionjo delete <record_id>
//!
//! Configuration comes from the environment (`.env` supported):
//! `MIONJO_API_BASE`, `MIONJO_API_TOKEN` (optional), `MIONJO_SUPABASE_URL`,
//! `MIONJO_SUPABASE_KEY`, `MIONJO_BUCKET` (optional).

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mionjo_attachments::AttachmentManager;
use mionjo_core::{
    derive_status, ActivityRecord, EffectiveStatus, FilePayload, RecordStore, StatusCounts,
};
use mionjo_records::HttpRecordStore;
use mionjo_storage::SupabaseStorage;

#[derive(Debug)]
enum Command {
    List { filter: Option<String> },
    Upload { record_id: i64, path: PathBuf },
    Delete { record_id: i64 },
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  mionjo list [--filter en_cours|termine|en_retard]");
    eprintln!("  mionjo upload <record_id> <file_path>");
    eprintln!("  mionjo delete <record_id>");
}

fn parse_args() -> anyhow::Result<Command> {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("list") => {
            let mut filter = None;
            let mut i = 1;
            while i < args.len() {
                match args[i].as_str() {
                    "--filter" | "-f" => {
                        i += 1;
                        filter = args.get(i).cloned();
                    }
                    other => bail!("unknown argument: {}", other),
                }
                i += 1;
            }
            Ok(Command::List { filter })
        }
        Some("upload") => {
            let record_id = args
                .get(1)
                .context("upload requires <record_id>")?
                .parse::<i64>()
                .context("record_id must be an integer")?;
            let path = PathBuf::from(args.get(2).context("upload requires <file_path>")?);
            Ok(Command::Upload { record_id, path })
        }
        Some("delete") => {
            let record_id = args
                .get(1)
                .context("delete requires <record_id>")?
                .parse::<i64>()
                .context("record_id must be an integer")?;
            Ok(Command::Delete { record_id })
        }
        _ => {
            print_usage();
            bail!("no command given");
        }
    }
}

async fn find_record(records: &HttpRecordStore, record_id: i64) -> anyhow::Result<ActivityRecord> {
    use mionjo_core::RecordStore;
    let all = records.fetch_records().await?;
    all.into_iter()
        .find(|r| r.id == record_id)
        .with_context(|| format!("no record with id {}", record_id))
}

fn parse_filter(raw: &str) -> anyhow::Result<EffectiveStatus> {
    match raw {
        "en_cours" | "en cours" => Ok(EffectiveStatus::InProgress),
        "termine" => Ok(EffectiveStatus::Completed),
        "en_retard" => Ok(EffectiveStatus::Overdue),
        other => bail!("unknown filter: {} (expected en_cours, termine or en_retard)", other),
    }
}

async fn cmd_list(records: &HttpRecordStore, filter: Option<String>) -> anyhow::Result<()> {
    use mionjo_core::RecordStore;
    let filter = filter.as_deref().map(parse_filter).transpose()?;
    let all = records.fetch_records().await?;
    let now = Utc::now();
    let counts = StatusCounts::tally(&all, now);

    println!(
        "{:>5}  {:<10}  {:>6}  {:<20}  {:<30}  {}",
        "ID", "STATUT", "RETARD", "DEADLINE", "RESPONSABLE", "ACTIVITE"
    );
    for rec in &all {
        let report = derive_status(&rec.status, rec.deadline, now);
        if let Some(wanted) = &filter {
            if report.effective != *wanted {
                continue;
            }
        }
        let retard = if report.effective == EffectiveStatus::Overdue {
            format!("{}j", report.overdue_days)
        } else {
            "-".to_string()
        };
        println!(
            "{:>5}  {:<10}  {:>6}  {:<20}  {:<30}  {}",
            rec.id,
            report.effective,
            retard,
            rec.deadline.format("%d-%m-%Y %H:%M"),
            rec.responsible_name,
            rec.description
        );
    }
    println!(
        "\n{} activites: {} en cours, {} terminees, {} en retard",
        counts.total, counts.in_progress, counts.completed, counts.overdue
    );
    Ok(())
}

async fn cmd_upload(
    manager: &AttachmentManager,
    records: &HttpRecordStore,
    record_id: i64,
    path: PathBuf,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("file path has no usable filename")?
        .to_string();

    let record = find_record(records, record_id).await?;
    let payload = FilePayload::new(name, bytes);
    let update = manager
        .replace_attachment(record_id, record.attachment_ref.as_deref(), &payload)
        .await?;

    info!(record_id, object_key = %update.key, "upload complete");
    println!("Rapport importe: {}", update.public_url);
    if update.old_removed {
        println!("Ancien fichier supprime.");
    }
    Ok(())
}

async fn cmd_delete(
    manager: &AttachmentManager,
    records: &HttpRecordStore,
    record_id: i64,
) -> anyhow::Result<()> {
    let record = find_record(records, record_id).await?;
    let outcome = manager
        .delete_activity(record_id, record.attachment_ref.as_deref())
        .await?;

    match (outcome.existed, outcome.file_removed) {
        (true, true) => println!("Activite {} et son rapport supprimes.", record_id),
        (true, false) => println!(
            "Activite {} supprimee; le fichier n'a pas pu etre supprime.",
            record_id
        ),
        _ => println!("Activite {} supprimee (aucun fichier).", record_id),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let command = parse_args()?;

    let records = Arc::new(HttpRecordStore::from_env()?);
    match command {
        Command::List { filter } => cmd_list(&records, filter).await,
        Command::Upload { record_id, path } => {
            let storage = SupabaseStorage::from_env()?;
            let manager = AttachmentManager::new(Arc::new(storage), Arc::clone(&records) as Arc<dyn RecordStore>);
            cmd_upload(&manager, &records, record_id, path).await
        }
        Command::Delete { record_id } => {
            let storage = SupabaseStorage::from_env()?;
            let manager = AttachmentManager::new(Arc::new(storage), Arc::clone(&records) as Arc<dyn RecordStore>);
            cmd_delete(&manager, &records, record_id).await
        }
    }
}
