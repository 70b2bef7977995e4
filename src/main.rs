use clap::Parser;
use material_sync::backend::HttpBackend;
use material_sync::cli::{Cli, Commands};
use material_sync::config::Config;
use material_sync::error::{MaterialSyncError, Result};
use material_sync::notify::{AssumeYes, Confirmer, DialoguerConfirmer, TracingNotifier};
use material_sync::session::{CancelOutcome, ExportDecision, Session};
use material_sync::common::Navigation;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let directive = format!("material_sync={level},material_sync_common={level}");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load()?;

    if let Commands::Config { set_token, base_url, show } = &cli.command {
        if let Some(token) = set_token {
            config.set_token(token.clone())?;
            println!("✔ 認証トークンを設定しました");
        }
        if let Some(url) = base_url {
            config.api_base_url = url.clone();
            config.save()?;
            println!("✔ APIのベースURLを設定しました");
        }
        if *show {
            println!("設定:");
            println!("  ベースURL: {}", config.api_base_url);
            println!("  タイムアウト: {}秒", config.timeout_seconds);
            println!("  トークン: {}", if config.get_token().is_ok() { "設定済み" } else { "未設定" });
        }
        return Ok(());
    }

    let backend = Arc::new(HttpBackend::new(&config, Some(config.get_token()?))?);
    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(DialoguerConfirmer)
    };
    let session = Session::new(backend, Arc::new(TracingNotifier), confirmer);

    let client = match &cli.command {
        Commands::List { client, .. }
        | Commands::Translate { client }
        | Commands::Export { client }
        | Commands::Delete { client, .. }
        | Commands::Rollback { client, .. } => client.clone(),
        Commands::Config { .. } => {
            return Err(MaterialSyncError::CliExecution("config は顧客を指定しません".into()))
        }
    };

    if !session.load_clients().await {
        return Err(MaterialSyncError::CliExecution("顧客一覧を取得できません".into()));
    }
    let client_name = match session.navigate(&client).await {
        Navigation::Translation(c) => c.name,
        Navigation::Dashboard => return Err(MaterialSyncError::ClientNotFound(client.clone())),
    };
    if !session.refresh(&client).await {
        return Err(MaterialSyncError::CliExecution("資料一覧を取得できません".into()));
    }

    match cli.command {
        Commands::List { json, .. } => {
            let materials = session.displayed(&client).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&materials)?);
            } else {
                println!("📄 {} の資料 ({}件)\n", client_name, materials.len());
                for m in &materials {
                    println!(
                        "  {} {:<32} {:<6} {}",
                        if m.confirmed { "✓" } else { " " },
                        m.name,
                        m.status.as_str(),
                        m.id
                    );
                }
            }
        }

        Commands::Translate { .. } => {
            println!("🌐 {} の資料を翻訳中...\n", client_name);
            match session.translate(&client).await {
                Some(report) => {
                    println!(
                        "✔ 翻訳完了: 成功 {}件 / 失敗 {}件",
                        report.counts.translated, report.counts.failed
                    );
                }
                None => println!("✘ 翻訳に失敗しました"),
            }
        }

        Commands::Export { .. } => match session.prepare_export(&client).await {
            ExportDecision::Proceed { materials, summary } => {
                println!("📦 エクスポート対象: {}件（未確認 {}件は除外）", summary.eligible_count, summary.ineligible_count);
                for m in &materials {
                    println!("  - {} ({})", m.name, m.id);
                }
            }
            ExportDecision::Aborted => println!("エクスポートを中止しました"),
            ExportDecision::NothingToExport => println!("確認済みの資料がありません"),
        },

        Commands::Delete { material, .. } => {
            if session.delete_material(&material).await? {
                println!("✔ 削除しました: {}", material);
            }
        }

        Commands::Rollback { ids, .. } => {
            // 指定IDを完了済みバッチとして扱い、取り消しフローに乗せる
            let store = session.store();
            let targets: Vec<_> = {
                let guard = store.read().await;
                let found: Vec<_> = ids.iter().filter_map(|id| guard.get(id).cloned()).collect();
                found
            };
            if targets.is_empty() {
                return Err(MaterialSyncError::MaterialNotFound(ids.join(", ")));
            }

            session.start_upload(targets.len()).await?;
            session.record_upload(targets).await?;
            match session.cancel_upload(&client).await {
                CancelOutcome::RolledBack(n) => println!("✔ {}件を取り消しました", n),
                CancelOutcome::Declined => println!("取り消しを中止しました"),
                other => println!("✘ 取り消しできませんでした: {:?}", other),
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
