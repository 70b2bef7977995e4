//! バックエンド連携
//!
//! 同期エンジンが依存する外部API（一覧取得・翻訳開始・削除）の抽象。
//! 実装は `HttpBackend`（reqwest）。テストではインメモリの偽実装を差し込む。

mod http;

pub use http::HttpBackend;

use crate::error::Result;
use async_trait::async_trait;
use material_sync_common::{Client, Material, MaterialId, TranslatedMaterial};
use serde::Deserialize;

/// 翻訳APIの件数サマリ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationCounts {
    pub translated: usize,
    pub failed: usize,
}

/// 翻訳APIの応答
///
/// 結果が直接返る場合と、一覧の再取得が必要な場合がある。
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationReply {
    Direct {
        outcomes: Vec<TranslatedMaterial>,
        counts: TranslationCounts,
    },
    NeedsRefetch {
        counts: TranslationCounts,
    },
}

impl TranslationReply {
    pub fn counts(&self) -> TranslationCounts {
        match self {
            TranslationReply::Direct { counts, .. } | TranslationReply::NeedsRefetch { counts } => *counts,
        }
    }
}

/// `POST /api/clients/{cid}/materials/translate` のレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub translated_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(default)]
    pub translated_materials: Option<Vec<TranslatedMaterial>>,
}

impl From<TranslationResponse> for TranslationReply {
    fn from(response: TranslationResponse) -> Self {
        let counts = TranslationCounts {
            translated: response.translated_count,
            failed: response.failed_count,
        };
        match response.translated_materials {
            Some(outcomes) if !outcomes.is_empty() => TranslationReply::Direct { outcomes, counts },
            _ => TranslationReply::NeedsRefetch { counts },
        }
    }
}

#[async_trait]
pub trait MaterialBackend: Send + Sync {
    async fn fetch_clients(&self) -> Result<Vec<Client>>;

    async fn fetch_materials(&self, client_id: &str) -> Result<Vec<Material>>;

    async fn start_translation(&self, client_id: &str) -> Result<TranslationReply>;

    /// アップロード取り消し用の一括削除。削除件数を返す
    async fn delete_materials(&self, client_id: &str, ids: &[MaterialId]) -> Result<usize>;

    async fn delete_material(&self, id: &str) -> Result<()>;
}
