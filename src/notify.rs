//! 通知と確認ダイアログの受け口
//!
//! 通知は投げっぱなし（コアの処理を止めない）。確認は破壊的操作の前にだけ呼ばれる。

use async_trait::async_trait;
use dialoguer::Confirm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, severity: Severity);
}

/// 確認ダイアログの内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    /// 取り消せない操作（削除など）
    pub danger: bool,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            danger: false,
        }
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }
}

#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// 通知をtracingのログへ流す
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => tracing::info!(%title, "{}", message),
            Severity::Warning => tracing::warn!(%title, "{}", message),
            Severity::Error => tracing::error!(%title, "{}", message),
        }
    }
}

/// 端末で y/N を尋ねる
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerConfirmer;

#[async_trait]
impl Confirmer for DialoguerConfirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        let text = if prompt.danger {
            format!("⚠ {}: {}", prompt.title, prompt.message)
        } else {
            format!("{}: {}", prompt.title, prompt.message)
        };

        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new()
                .with_prompt(text)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "confirmation prompt failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation task failed");
                false
            }
        }
    }
}

/// 常に承認する（`--yes` 指定時）
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}
