//! 翻訳の起動と結果の突き合わせ
//!
//! 1. サーバーに翻訳を依頼する（ストアのロックは保持しない）
//! 2. 結果が直接返れば、ストアにあるIDだけへ成功結果をマージする
//! 3. 返らなければ一覧を再取得して全件置き換える
//! 4. 通信・サーバーエラー時はストアに触れない（自動リトライなし）
//!
//! 同じ顧客への翻訳が並行しても、マージはID単位で冪等なので
//! 後から適用された結果が残るだけで状態は壊れない。

use crate::backend::{MaterialBackend, TranslationCounts, TranslationReply};
use crate::error::Result;
use material_sync_common::{MaterialPatch, MaterialStore, TranslatedMaterial, UpsertOutcome};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// セッション内で共有される資料ストア
pub type SharedStore = Arc<RwLock<MaterialStore>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePath {
    Direct,
    Refetched,
}

/// マージ件数の内訳
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub applied: usize,
    pub unchanged: usize,
    /// ストアにないID（応答待ちの間に削除されたもの）
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationReport {
    pub path: MergePath,
    pub counts: TranslationCounts,
    pub stats: MergeStats,
}

pub struct TranslationCoordinator<B> {
    backend: Arc<B>,
}

impl<B: MaterialBackend> TranslationCoordinator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn translate(&self, store: &SharedStore, client_id: &str) -> Result<TranslationReport> {
        info!(client_id, "starting translation");
        let reply = self.backend.start_translation(client_id).await?;

        match reply {
            TranslationReply::Direct { outcomes, counts } => {
                // 応答到着時点のストアに対して適用する
                let mut guard = store.write().await;
                let stats = merge_outcomes(&mut guard, &outcomes)?;
                info!(
                    client_id,
                    translated = counts.translated,
                    failed = counts.failed,
                    applied = stats.applied,
                    skipped = stats.skipped,
                    "translation results merged"
                );
                Ok(TranslationReport {
                    path: MergePath::Direct,
                    counts,
                    stats,
                })
            }
            TranslationReply::NeedsRefetch { counts } => {
                let materials = self.backend.fetch_materials(client_id).await?;
                let total = materials.len();
                store.write().await.set_all(materials);
                info!(client_id, total, "material list refetched after translation");
                Ok(TranslationReport {
                    path: MergePath::Refetched,
                    counts,
                    stats: MergeStats {
                        applied: total,
                        ..Default::default()
                    },
                })
            }
        }
    }
}

/// 翻訳成功の結果をストアへマージする。未知のIDは黙って読み飛ばす。
pub fn merge_outcomes(store: &mut MaterialStore, outcomes: &[TranslatedMaterial]) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    for outcome in outcomes {
        if !store.contains(&outcome.id) {
            debug!(material_id = %outcome.id, "translation result for unknown material ignored");
            stats.skipped += 1;
            continue;
        }

        match store.upsert(MaterialPatch::translated(outcome))? {
            UpsertOutcome::Unchanged => stats.unchanged += 1,
            UpsertOutcome::Updated | UpsertOutcome::Inserted => stats.applied += 1,
        }
    }

    Ok(stats)
}
