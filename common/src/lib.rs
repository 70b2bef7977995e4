//! Material Sync Common Library
//!
//! 資料の状態管理と翻訳結果の突き合わせ（ネットワーク・ファイルI/Oなし）

pub mod types;
pub mod error;
pub mod store;
pub mod batch;
pub mod dedup;
pub mod gate;
pub mod clients;

pub use types::{Client, Material, MaterialId, MaterialPatch, MaterialStatus, MaterialType, SelectedResult, TranslatedMaterial};
pub use error::{Error, Result};
pub use store::{MaterialStore, UpsertOutcome};
pub use batch::{UploadBatch, UploadBatchTracker};
pub use dedup::resolve;
pub use gate::{eligible_for_export, export_summary, ExportSummary};
pub use clients::{ClientDirectory, Navigation};
