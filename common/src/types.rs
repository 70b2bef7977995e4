//! 資料（Material）の型定義
//!
//! バックエンドとCLIで共有される型:
//! - Material: 顧客が提出した1件の資料（サーバーのcamelCase JSONと互換）
//! - MaterialPatch: ストアへの部分更新（浅いマージ）
//! - TranslatedMaterial: 翻訳APIが直接返す1件分の翻訳結果
//! - Client: 顧客

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// バックエンドが採番する資料ID
pub type MaterialId = String;

/// 資料の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Pdf,
    #[default]
    Image,
    Webpage,
    Document,
}

/// 資料のステータス
///
/// ワイヤ上の値はサーバーが保存している文字列そのもの。
/// `Pending` / `Translating` は旧サーバーが返す値で、同期ロジック上は未翻訳扱い。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialStatus {
    #[serde(rename = "待处理")]
    Pending,
    #[serde(rename = "翻译中")]
    Translating,
    #[default]
    #[serde(rename = "已上传")]
    Uploaded,
    #[serde(rename = "翻译完成")]
    Translated,
    #[serde(rename = "翻译失败")]
    Failed,
    #[serde(rename = "已确认")]
    Confirmed,
}

impl MaterialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialStatus::Pending => "待处理",
            MaterialStatus::Translating => "翻译中",
            MaterialStatus::Uploaded => "已上传",
            MaterialStatus::Translated => "翻译完成",
            MaterialStatus::Failed => "翻译失败",
            MaterialStatus::Confirmed => "已确认",
        }
    }
}

impl std::fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正とする翻訳パイプライン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedResult {
    Latex,
    Api,
}

impl std::fmt::Display for SelectedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectedResult::Latex => write!(f, "latex"),
            SelectedResult::Api => write!(f, "api"),
        }
    }
}

impl std::str::FromStr for SelectedResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latex" => Ok(SelectedResult::Latex),
            "api" => Ok(SelectedResult::Api),
            _ => Err(format!("Unknown result: {}. Use latex or api", s)),
        }
    }
}

/// 資料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,

    pub client_id: String,

    /// 表示名（重複排除のキー）
    pub name: String,

    #[serde(rename = "type", default)]
    pub material_type: MaterialType,

    #[serde(default)]
    pub status: MaterialStatus,

    /// 翻訳済み画像のパス（翻訳成功時のみ）
    #[serde(default)]
    pub translated_image_path: Option<String>,

    #[serde(default)]
    pub translation_text_info: Option<Value>,

    #[serde(default)]
    pub translation_error: Option<String>,

    #[serde(default)]
    pub selected_result: Option<SelectedResult>,

    #[serde(default)]
    pub confirmed: bool,

    /// 最終更新時刻（重複排除のタイブレーク）
    #[serde(default, with = "timestamp")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,

    /// ウェブページ資料のURL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex_translation_result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex_translation_error: Option<String>,
}

impl Material {
    pub fn is_translated(&self) -> bool {
        self.status == MaterialStatus::Translated
    }

    pub fn has_artifact(&self) -> bool {
        self.translated_image_path.is_some()
    }
}

/// 翻訳APIが直接返す翻訳結果（snake_case）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatedMaterial {
    pub id: MaterialId,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub translated_image_path: Option<String>,

    #[serde(default)]
    pub translation_text_info: Option<Value>,
}

/// ストアへの部分更新
///
/// `None` のフィールドは既存値を保持する。
/// `Option<Option<T>>` は `Some(None)` で明示的にクリアする。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPatch {
    pub id: MaterialId,
    pub client_id: Option<String>,
    pub name: Option<String>,
    pub material_type: Option<MaterialType>,
    pub status: Option<MaterialStatus>,
    pub translated_image_path: Option<Option<String>>,
    pub translation_text_info: Option<Option<Value>>,
    pub translation_error: Option<Option<String>>,
    pub selected_result: Option<Option<SelectedResult>>,
    pub confirmed: Option<bool>,
}

impl MaterialPatch {
    pub fn new(id: impl Into<MaterialId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 翻訳成功の結果を反映するパッチ
    pub fn translated(outcome: &TranslatedMaterial) -> Self {
        Self {
            id: outcome.id.clone(),
            status: Some(MaterialStatus::Translated),
            translated_image_path: Some(outcome.translated_image_path.clone()),
            translation_text_info: Some(outcome.translation_text_info.clone()),
            translation_error: Some(None),
            ..Default::default()
        }
    }
}

impl From<Material> for MaterialPatch {
    fn from(m: Material) -> Self {
        Self {
            id: m.id,
            client_id: Some(m.client_id),
            name: Some(m.name),
            material_type: Some(m.material_type),
            status: Some(m.status),
            translated_image_path: Some(m.translated_image_path),
            translation_text_info: Some(m.translation_text_info),
            translation_error: Some(m.translation_error),
            selected_result: Some(m.selected_result),
            confirmed: Some(m.confirmed),
        }
    }
}

/// 顧客
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub cid: String,
    pub name: String,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub case_date: Option<String>,
}

/// サーバーの `isoformat()` はタイムゾーンなしで返るため、UTCとして解釈する
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(DateTime::<Utc>::default());
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
