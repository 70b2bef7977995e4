//! エクスポート可否の判定
//!
//! 確認済み（`confirmed == true`）の資料のみエクスポート対象。

use crate::types::Material;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub eligible_count: usize,
    pub ineligible_count: usize,
}

impl ExportSummary {
    /// 未確認の資料がありユーザー確認が必要か
    pub fn needs_confirmation(&self) -> bool {
        self.ineligible_count > 0
    }
}

pub fn eligible_for_export<'a, I>(materials: I) -> Vec<&'a Material>
where
    I: IntoIterator<Item = &'a Material>,
{
    materials.into_iter().filter(|m| m.confirmed).collect()
}

pub fn export_summary<'a, I>(materials: I) -> ExportSummary
where
    I: IntoIterator<Item = &'a Material>,
{
    materials
        .into_iter()
        .fold(ExportSummary::default(), |mut summary, m| {
            if m.confirmed {
                summary.eligible_count += 1;
            } else {
                summary.ineligible_count += 1;
            }
            summary
        })
}
