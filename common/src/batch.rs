//! アップロードバッチの進捗管理
//!
//! 1回のアップロード〜翻訳サイクルの状態を追跡する。
//! - 進行中: キャンセル可能（進行中のリクエストを中断させる）
//! - 完了後: キャンセルではなくロールバック（サーバー側に既にファイルがあるため）

use crate::error::{Error, Result};
use crate::store::MaterialStore;
use crate::types::MaterialId;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// バッチの状態（表示用のスナップショット）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatch {
    pub total: usize,
    pub current: usize,
    /// このバッチで作成された資料ID（ロールバック用、順序付き・重複なし）
    pub uploaded_material_ids: Vec<MaterialId>,
    pub can_cancel: bool,
    pub show_modal: bool,
}

impl UploadBatch {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.current == self.total
    }

    pub fn is_active(&self) -> bool {
        self.total > 0
    }

    /// 進捗率（0-100）
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current * 100 + self.total / 2) / self.total) as u8
    }
}

#[derive(Debug, Default)]
pub struct UploadBatchTracker {
    batch: UploadBatch,
    abort: Option<CancellationToken>,
}

impl UploadBatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しいバッチを開始する。進行中のバッチがあれば状態を破棄する。
    ///
    /// 返したトークンはアップロード処理側が監視し、キャンセルで中断する。
    pub fn start(&mut self, total: usize) -> Result<CancellationToken> {
        if total == 0 {
            return Err(Error::InvalidBatchSize(total));
        }

        if self.batch.is_active() {
            tracing::debug!(
                previous_total = self.batch.total,
                previous_current = self.batch.current,
                "resetting previous upload batch"
            );
        }

        let token = CancellationToken::new();
        self.batch = UploadBatch {
            total,
            current: 0,
            uploaded_material_ids: Vec::new(),
            can_cancel: true,
            show_modal: true,
        };
        self.abort = Some(token.clone());

        tracing::info!(total, "upload batch started");
        Ok(token)
    }

    /// 進捗を進める。`total` を超えず、減ることもない。
    pub fn advance(&mut self, n: usize) -> usize {
        if !self.batch.is_active() {
            return 0;
        }

        self.batch.current = self.batch.total.min(self.batch.current.saturating_add(n));
        if self.batch.is_complete() {
            self.batch.can_cancel = false;
        }
        self.batch.current
    }

    /// バッチで作成された資料IDを記録する
    pub fn record_uploaded<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = MaterialId>,
    {
        for id in ids {
            if !self.batch.uploaded_material_ids.contains(&id) {
                self.batch.uploaded_material_ids.push(id);
            }
        }
    }

    /// 進行中のバッチをキャンセルする（完了後は不可）
    pub fn cancel(&mut self) -> Result<()> {
        if !self.batch.is_active() {
            return Err(Error::BatchNotActive);
        }
        if self.batch.is_complete() {
            return Err(Error::BatchAlreadyComplete);
        }

        if let Some(token) = self.abort.take() {
            token.cancel();
        }
        tracing::info!(
            current = self.batch.current,
            total = self.batch.total,
            "upload batch cancelled"
        );
        self.reset();
        Ok(())
    }

    /// 完了済みバッチのロールバック。
    ///
    /// サーバー側の削除は呼び出し側の責務。ここではローカルのストアから
    /// 削除し、バッチ状態をクリアする。
    pub fn rollback(&mut self, store: &mut MaterialStore, ids: &[MaterialId]) -> Result<usize> {
        if !self.batch.is_active() {
            return Err(Error::BatchNotActive);
        }
        if !self.batch.is_complete() {
            return Err(Error::BatchIncomplete {
                current: self.batch.current,
                total: self.batch.total,
            });
        }

        let removed = store.remove(ids);
        tracing::info!(removed, "upload batch rolled back");
        self.reset();
        Ok(removed)
    }

    /// 完了済みバッチを閉じる（資料は残す）
    pub fn close(&mut self) -> Result<()> {
        if !self.batch.is_complete() {
            return Err(Error::BatchIncomplete {
                current: self.batch.current,
                total: self.batch.total,
            });
        }
        self.reset();
        Ok(())
    }

    pub fn batch(&self) -> &UploadBatch {
        &self.batch
    }

    pub fn is_complete(&self) -> bool {
        self.batch.is_complete()
    }

    pub fn uploaded_ids(&self) -> &[MaterialId] {
        &self.batch.uploaded_material_ids
    }

    fn reset(&mut self) {
        self.batch = UploadBatch::default();
        self.abort = None;
    }
}
