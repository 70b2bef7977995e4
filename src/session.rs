//! ダッシュボードのセッション
//!
//! 資料ストア・アップロードバッチ・翻訳コーディネータを束ね、
//! ユーザー操作を1つずつ処理する。通信エラーはここで通知に変換し、
//! 呼び出し元（描画側）へは伝播させない。
//!
//! 確認ダイアログの待ち時間中に状態が変わりうるため、確認後は必ず
//! 現在のバッチ・ストアを読み直してから操作する。

use crate::backend::MaterialBackend;
use crate::coordinator::{MergePath, SharedStore, TranslationCoordinator, TranslationReport};
use crate::error::{MaterialSyncError, Result};
use crate::notify::{ConfirmPrompt, Confirmer, Notifier, Severity};
use material_sync_common::{
    eligible_for_export, export_summary, resolve, ClientDirectory, Error as CommonError, ExportSummary,
    Material, MaterialPatch, MaterialStatus, MaterialStore, Navigation, SelectedResult, UploadBatch,
    UploadBatchTracker,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// アップロード取り消しの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// 進行中のアップロードを中断した
    Cancelled,
    /// 完了済みのアップロードを削除した（削除件数）
    RolledBack(usize),
    /// ユーザーが確認で拒否した
    Declined,
    /// 取り消せる状態ではなかった
    Rejected,
    /// サーバー側の削除に失敗した（状態は変更なし）
    Failed,
}

/// エクスポート可否の判定結果
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecision {
    Proceed {
        materials: Vec<Material>,
        summary: ExportSummary,
    },
    Aborted,
    NothingToExport,
}

pub struct Session<B> {
    backend: Arc<B>,
    store: SharedStore,
    tracker: Mutex<UploadBatchTracker>,
    clients: RwLock<ClientDirectory>,
    coordinator: TranslationCoordinator<B>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
}

impl<B: MaterialBackend> Session<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self {
            coordinator: TranslationCoordinator::new(backend.clone()),
            backend,
            store: Arc::new(RwLock::new(MaterialStore::new())),
            tracker: Mutex::new(UploadBatchTracker::new()),
            clients: RwLock::new(ClientDirectory::default()),
            notifier,
            confirmer,
        }
    }

    /// ビューが購読・参照するためのストア
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub async fn batch(&self) -> UploadBatch {
        self.tracker.lock().await.batch().clone()
    }

    // ========== 顧客 ==========

    pub async fn load_clients(&self) -> bool {
        match self.backend.fetch_clients().await {
            Ok(clients) => {
                self.clients.write().await.replace(clients);
                true
            }
            Err(e) => {
                self.report_failure("読み込み失敗", "顧客一覧を読み込めませんでした", &e);
                false
            }
        }
    }

    /// 一覧にない顧客IDはダッシュボードへ戻す
    pub async fn navigate(&self, client_id: &str) -> Navigation {
        self.clients.read().await.navigate(client_id)
    }

    // ========== 一覧 ==========

    pub async fn refresh(&self, client_id: &str) -> bool {
        match self.backend.fetch_materials(client_id).await {
            Ok(materials) => {
                self.store.write().await.set_all(materials);
                true
            }
            Err(e) => {
                self.report_failure("読み込み失敗", "資料一覧を読み込めませんでした", &e);
                false
            }
        }
    }

    /// 表示用の一覧（同名資料は1件に畳み込む）
    pub async fn displayed(&self, client_id: &str) -> Vec<Material> {
        let store = self.store.read().await;
        let materials: Vec<Material> = resolve(store.iter(), client_id).into_iter().cloned().collect();
        materials
    }

    pub async fn select(&self, material_id: Option<&str>) -> bool {
        self.store.write().await.select(material_id)
    }

    /// 選択中の資料。常にストアの最新値を返す
    pub async fn current(&self) -> Option<Material> {
        self.store.read().await.current().cloned()
    }

    // ========== アップロード ==========

    pub async fn start_upload(&self, total: usize) -> Result<CancellationToken> {
        Ok(self.tracker.lock().await.start(total)?)
    }

    /// アップロードで作成された資料を仮登録し、進捗を進める。
    /// 途中で登録に失敗しても、それまでに登録できた分はバッチに記録する。
    pub async fn record_upload(&self, materials: Vec<Material>) -> Result<usize> {
        let mut ids = Vec::with_capacity(materials.len());
        let mut failure = None;
        {
            let mut store = self.store.write().await;
            for material in materials {
                let id = material.id.clone();
                match store.upsert_material(material) {
                    Ok(_) => ids.push(id),
                    Err(e) => {
                        warn!(material_id = %id, error = %e, "uploaded material rejected by store");
                        failure = Some(e);
                        break;
                    }
                }
            }
        }

        let mut tracker = self.tracker.lock().await;
        let count = ids.len();
        tracker.record_uploaded(ids);
        let current = tracker.advance(count);
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(current),
        }
    }

    pub async fn advance_upload(&self, n: usize) -> usize {
        self.tracker.lock().await.advance(n)
    }

    /// 取り消し操作。進行中ならキャンセル、完了済みならロールバック削除。
    pub async fn cancel_upload(&self, client_id: &str) -> CancelOutcome {
        let complete = self.tracker.lock().await.is_complete();
        if complete {
            self.rollback_upload(client_id).await
        } else {
            self.abort_upload().await
        }
    }

    async fn abort_upload(&self) -> CancelOutcome {
        let prompt = ConfirmPrompt::new("アップロード中止", "アップロードを中止しますか？");
        if !self.confirmer.confirm(&prompt).await {
            return CancelOutcome::Declined;
        }

        match self.tracker.lock().await.cancel() {
            Ok(()) => CancelOutcome::Cancelled,
            Err(e) => {
                warn!(error = %e, "upload cancel rejected");
                self.notifier.notify("中止できません", &e.to_string(), Severity::Warning);
                CancelOutcome::Rejected
            }
        }
    }

    /// 完了済みバッチの資料をサーバーとストアから削除する
    pub async fn rollback_upload(&self, client_id: &str) -> CancelOutcome {
        let prompt = ConfirmPrompt::new(
            "アップロード取り消し",
            "今回アップロードしたファイルをすべて削除しますか？",
        )
        .danger();
        if !self.confirmer.confirm(&prompt).await {
            return CancelOutcome::Declined;
        }

        let ids = {
            let tracker = self.tracker.lock().await;
            if !tracker.is_complete() {
                let e = CommonError::BatchIncomplete {
                    current: tracker.batch().current,
                    total: tracker.batch().total,
                };
                self.notifier.notify("取り消しできません", &e.to_string(), Severity::Warning);
                return CancelOutcome::Rejected;
            }
            tracker.uploaded_ids().to_vec()
        };

        // サーバーの応答待ちの間はロックを持たない
        if !ids.is_empty() {
            if let Err(e) = self.backend.delete_materials(client_id, &ids).await {
                self.report_failure("取り消し失敗", "ファイルの削除中にエラーが発生しました", &e);
                return CancelOutcome::Failed;
            }
        }

        let mut tracker = self.tracker.lock().await;
        let mut store = self.store.write().await;
        let removed = if tracker.is_complete() && tracker.uploaded_ids() == ids.as_slice() {
            match tracker.rollback(&mut store, &ids) {
                Ok(removed) => removed,
                Err(e) => {
                    warn!(error = %e, "rollback rejected");
                    return CancelOutcome::Rejected;
                }
            }
        } else {
            // 削除中に別のバッチが始まった。新しいバッチには触れず、削除済みの資料だけ外す
            warn!(client_id, "upload batch replaced during rollback");
            store.remove(&ids)
        };

        self.notifier.notify(
            "取り消し完了",
            &format!("アップロードした{}件のファイルを削除しました", removed),
            Severity::Success,
        );
        CancelOutcome::RolledBack(removed)
    }

    /// 完了済みバッチを閉じる（資料は残る）
    pub async fn close_upload(&self) -> Result<()> {
        Ok(self.tracker.lock().await.close()?)
    }

    /// 完了したアップロードを閉じ、続けて翻訳を実行する。未完了のバッチはエラー
    pub async fn complete_upload(&self, client_id: &str) -> Result<Option<TranslationReport>> {
        self.tracker.lock().await.close()?;
        info!(client_id, "upload batch completed, starting translation");
        Ok(self.translate(client_id).await)
    }

    // ========== 翻訳 ==========

    /// 翻訳を実行して結果をストアへ反映する。失敗時は通知のみでストアは不変
    pub async fn translate(&self, client_id: &str) -> Option<TranslationReport> {
        self.notifier
            .notify("翻訳開始", "画像を翻訳しています。しばらくお待ちください", Severity::Info);

        match self.coordinator.translate(&self.store, client_id).await {
            Ok(report) => {
                match report.path {
                    MergePath::Direct => self.notifier.notify(
                        "翻訳完了",
                        &format!(
                            "{}件翻訳しました（失敗 {}件）",
                            report.counts.translated, report.counts.failed
                        ),
                        Severity::Success,
                    ),
                    MergePath::Refetched => self.notifier.notify(
                        "翻訳完了",
                        "翻訳結果を更新しました。プレビューを確認してください",
                        Severity::Info,
                    ),
                }
                Some(report)
            }
            Err(e) => {
                self.report_failure("翻訳失敗", "翻訳の開始時にエラーが発生しました", &e);
                None
            }
        }
    }

    // ========== 資料の操作 ==========

    pub async fn delete_material(&self, material_id: &str) -> Result<bool> {
        let name = self
            .store
            .read()
            .await
            .get(material_id)
            .map(|m| m.name.clone())
            .ok_or_else(|| MaterialSyncError::MaterialNotFound(material_id.to_string()))?;

        let prompt = ConfirmPrompt::new("資料削除", format!("資料「{}」を削除しますか？", name)).danger();
        if !self.confirmer.confirm(&prompt).await {
            return Ok(false);
        }

        if let Err(e) = self.backend.delete_material(material_id).await {
            self.report_failure("削除失敗", "資料の削除中にエラーが発生しました", &e);
            return Ok(false);
        }

        self.store.write().await.remove(&[material_id.to_string()]);
        self.notifier
            .notify("削除完了", &format!("資料「{}」を削除しました", name), Severity::Success);
        Ok(true)
    }

    /// 確認済みフラグを反転する。確認時は「已确认」、解除時は「翻译完成」に戻す
    pub async fn toggle_confirmed(&self, material_id: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        let material = store
            .get(material_id)
            .ok_or_else(|| MaterialSyncError::MaterialNotFound(material_id.to_string()))?;

        let confirmed = !material.confirmed;
        let name = material.name.clone();

        let mut patch = MaterialPatch::new(material_id);
        patch.confirmed = Some(confirmed);
        patch.status = Some(if confirmed {
            MaterialStatus::Confirmed
        } else {
            MaterialStatus::Translated
        });
        store.upsert(patch)?;

        let (title, message) = if confirmed {
            ("確認完了", format!("{} を確認済みにしました", name))
        } else {
            ("確認取り消し", format!("{} の確認を取り消しました", name))
        };
        self.notifier.notify(title, &message, Severity::Success);
        Ok(confirmed)
    }

    /// 正とする翻訳結果を選ぶ。既に同じ選択なら何もしない
    pub async fn select_result(&self, material_id: &str, kind: SelectedResult) -> Result<bool> {
        let mut store = self.store.write().await;
        let material = store
            .get(material_id)
            .ok_or_else(|| MaterialSyncError::MaterialNotFound(material_id.to_string()))?;

        if material.selected_result == Some(kind) {
            return Ok(false);
        }

        let mut patch = MaterialPatch::new(material_id);
        patch.selected_result = Some(Some(kind));
        store.upsert(patch)?;

        self.notifier
            .notify("選択完了", &format!("{} の翻訳結果を選択しました", kind), Severity::Success);
        Ok(true)
    }

    // ========== エクスポート ==========

    /// エクスポート対象を決める。パッケージングは外部サービスの責務
    ///
    /// 件数は表示上の統合前、顧客の全資料で数える（隠れた同名資料も未確認に含む）。
    pub async fn prepare_export(&self, client_id: &str) -> ExportDecision {
        let summary = self.export_candidates(client_id).await.1;

        if summary.needs_confirmation() {
            let prompt = ConfirmPrompt::new(
                "未確認の資料",
                format!(
                    "{}件の資料が未確認です。今回のエクスポートには含まれません。続行しますか？",
                    summary.ineligible_count
                ),
            );
            if !self.confirmer.confirm(&prompt).await {
                return ExportDecision::Aborted;
            }
        }

        // 確認待ちの間の変更を反映する
        let (materials, summary) = self.export_candidates(client_id).await;
        if summary.eligible_count == 0 {
            self.notifier
                .notify("エクスポート失敗", "確認済みの資料がありません", Severity::Error);
            return ExportDecision::NothingToExport;
        }

        info!(client_id, eligible = summary.eligible_count, "export prepared");
        ExportDecision::Proceed { materials, summary }
    }

    async fn export_candidates(&self, client_id: &str) -> (Vec<Material>, ExportSummary) {
        let store = self.store.read().await;
        let all = store.list_by_client(client_id);
        let summary = export_summary(all.iter().copied());
        let materials: Vec<Material> = eligible_for_export(all.iter().copied()).into_iter().cloned().collect();
        (materials, summary)
    }

    fn report_failure(&self, title: &str, fallback: &str, error: &MaterialSyncError) {
        warn!(error = %error, "{}", title);
        let message = if error.is_transport() {
            error.user_message()
        } else {
            fallback.to_string()
        };
        self.notifier.notify(title, &message, Severity::Error);
    }
}
