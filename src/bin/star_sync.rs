use clap::Parser;
use gitgatgotya::{app, LogContext, SyncArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = SyncArgs::parse();

    let dirs = args
        .config_dir()
        .and_then(|config_dir| args.cache_dir().map(|cache_dir| (config_dir, cache_dir)));
    let (config_dir, cache_dir) = match dirs {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let logs = match LogContext::init(&cache_dir, "star_sync", args.verbose) {
        Ok(logs) => logs,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };
    tracing::info!("🚀 Starting star-sync");
    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be starred");
    }

    let exit_code = match app::sync::run(&args, &config_dir).await {
        Ok(report) => {
            let verb = if report.dry_run { "Would star" } else { "Starred" };
            for repo in &report.starred {
                println!("⭐ {} {}", verb, repo);
            }
            for (repo, reason) in &report.failed {
                eprintln!("⚠️  Skipped {}: {}", repo, reason);
            }
            tracing::info!(
                "✅ {} {} repositories ({} already starred, {} failed)",
                verb,
                report.count(),
                report.already_starred,
                report.failed.len()
            );
            println!("✅ {} {} repositories", verb, report.count());
            0
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    logs.close();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
