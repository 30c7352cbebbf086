use clap::Parser;
use gitgatgotya::{app, LogContext, NotifyArgs, NotifyResult, SkipReason};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = NotifyArgs::parse();

    let dirs = args
        .config_dir()
        .and_then(|config_dir| args.cache_dir().map(|cache_dir| (config_dir, cache_dir)));
    let (config_dir, cache_dir) = match dirs {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let logs = match LogContext::init(&cache_dir, "steam", args.verbose) {
        Ok(logs) => logs,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };
    tracing::info!("🚀 Starting gitgatgotya");
    tracing::debug!(
        "Config dir: {}, cache dir: {}",
        config_dir.display(),
        cache_dir.display()
    );

    let exit_code = match app::notify::run(&args, &config_dir, &cache_dir).await {
        Ok(NotifyResult::Sent {
            message,
            recipients,
        }) => {
            tracing::info!("✅ Notification sent to {} recipients", recipients);
            println!("✅ Sent \"{}\" to {} recipients", message, recipients);
            0
        }
        Ok(NotifyResult::Skipped(SkipReason::NotPlaying)) => {
            println!("Not gaming at the moment.");
            0
        }
        Ok(NotifyResult::Skipped(SkipReason::StatusUnavailable)) => {
            println!("Player status unavailable, nothing sent.");
            0
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            eprintln!("📁 Log file: {}", logs.log_file().display());
            e.exit_code()
        }
    };

    logs.close();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
