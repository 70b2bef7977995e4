//! 同名資料の重複排除（表示用）
//!
//! ストアには仮登録のレコードと翻訳済みのレコードが同名で並ぶことがある。
//! 表示時にのみ、顧客ごと・名前ごとに1件へ畳み込む（ストアは変更しない）。
//!
//! 置き換え判定（上から順に評価し、最初に該当した規則で決まる）:
//! 1. 新しい方が翻訳完了で、既存が翻訳完了でない
//! 2. ステータスが同じで、新しい方の `updated_at` が厳密に新しい
//! 3. 新しい方に翻訳画像があり、既存にない

use crate::types::Material;
use std::collections::HashMap;

/// 顧客の資料を名前ごとに1件へ畳み込む。出現順は最初に現れた位置を保つ。
pub fn resolve<'a, I>(materials: I, client_id: &str) -> Vec<&'a Material>
where
    I: IntoIterator<Item = &'a Material>,
{
    let mut unique: Vec<&'a Material> = Vec::new();
    let mut index_by_name: HashMap<&'a str, usize> = HashMap::new();

    for material in materials.into_iter().filter(|m| m.client_id == client_id) {
        match index_by_name.get(material.name.as_str()) {
            None => {
                index_by_name.insert(material.name.as_str(), unique.len());
                unique.push(material);
            }
            Some(&index) => {
                if should_replace(unique[index], material) {
                    tracing::debug!(
                        name = %material.name,
                        old_id = %unique[index].id,
                        new_id = %material.id,
                        "duplicate material replaced"
                    );
                    unique[index] = material;
                }
            }
        }
    }

    unique
}

/// `candidate` が `existing` を置き換えるべきか
pub fn should_replace(existing: &Material, candidate: &Material) -> bool {
    if candidate.is_translated() && !existing.is_translated() {
        return true;
    }
    if candidate.status == existing.status && candidate.updated_at > existing.updated_at {
        return true;
    }
    candidate.has_artifact() && !existing.has_artifact()
}
