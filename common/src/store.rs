//! 資料ストア
//!
//! セッション中の資料を id → Material で保持する唯一の可変状態。
//! 全ての変更はこのモジュールのAPIを経由し、変更ごとにリビジョンを
//! `watch` チャンネルへ発行する（ビューはこれを購読して再描画する）。

use crate::error::{Error, Result};
use crate::types::{Material, MaterialId, MaterialPatch};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::watch;

/// upsertの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// 既存値と同一のため何も変わらなかった
    Unchanged,
}

#[derive(Debug)]
pub struct MaterialStore {
    /// 挿入順（一覧表示と重複排除の走査順）
    order: Vec<MaterialId>,
    records: HashMap<MaterialId, Material>,
    /// 選択中の資料。コピーではなくIDで持ち、読むたびにストアから引く
    current: Option<MaterialId>,
    revision: watch::Sender<u64>,
}

impl Default for MaterialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            order: Vec::new(),
            records: HashMap::new(),
            current: None,
            revision,
        }
    }

    /// 全件置き換え（一覧の再取得後に使用）
    pub fn set_all(&mut self, materials: Vec<Material>) {
        self.order.clear();
        self.records.clear();

        for material in materials {
            if !self.records.contains_key(&material.id) {
                self.order.push(material.id.clone());
            }
            self.records.insert(material.id.clone(), material);
        }

        if let Some(id) = &self.current {
            if !self.records.contains_key(id) {
                self.current = None;
            }
        }

        tracing::debug!(count = self.order.len(), "material store replaced");
        self.notify();
    }

    /// パッチを浅くマージする。IDがなければ挿入する。
    ///
    /// 値が変わらない場合は `updated_at` もリビジョンも進めないため、
    /// 同じパッチを何度適用しても結果は変わらない。
    pub fn upsert(&mut self, patch: MaterialPatch) -> Result<UpsertOutcome> {
        match self.records.get_mut(&patch.id) {
            Some(existing) => {
                if let Some(client_id) = &patch.client_id {
                    if client_id != &existing.client_id {
                        return Err(Error::ClientMismatch {
                            id: patch.id.clone(),
                            expected: existing.client_id.clone(),
                            got: client_id.clone(),
                        });
                    }
                }

                if !apply_patch(existing, patch) {
                    return Ok(UpsertOutcome::Unchanged);
                }
                existing.updated_at = Utc::now();
                self.notify();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let (Some(client_id), Some(name)) = (patch.client_id.clone(), patch.name.clone())
                else {
                    return Err(Error::IncompleteMaterial(patch.id));
                };

                let mut material = Material {
                    id: patch.id.clone(),
                    client_id,
                    name,
                    ..Default::default()
                };
                apply_patch(&mut material, patch);
                self.insert_new(material);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// 完全なレコードでupsertする。新規ならサーバー由来の付帯情報も含めて保持する。
    pub fn upsert_material(&mut self, material: Material) -> Result<UpsertOutcome> {
        if self.records.contains_key(&material.id) {
            return self.upsert(material.into());
        }
        self.insert_new(material);
        Ok(UpsertOutcome::Inserted)
    }

    /// IDで削除。未知のIDは無視する。削除件数を返す
    pub fn remove(&mut self, ids: &[MaterialId]) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.records.remove(id).is_some() {
                removed += 1;
            }
        }

        if removed == 0 {
            return 0;
        }

        self.order.retain(|id| self.records.contains_key(id));
        if let Some(id) = &self.current {
            if !self.records.contains_key(id) {
                self.current = None;
            }
        }

        self.notify();
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// 全資料を挿入順に返す
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn list_by_client(&self, client_id: &str) -> Vec<&Material> {
        self.iter().filter(|m| m.client_id == client_id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 資料を選択する。ストアにないIDなら選択しない
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let next = match id {
            Some(id) if self.records.contains_key(id) => Some(id.to_string()),
            Some(_) => return false,
            None => None,
        };
        if next != self.current {
            self.current = next;
            self.notify();
        }
        true
    }

    /// 選択中の資料（常に最新のレコード）
    pub fn current(&self) -> Option<&Material> {
        self.current.as_deref().and_then(|id| self.records.get(id))
    }

    /// 現在のリビジョン
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// 変更通知を購読する
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn insert_new(&mut self, mut material: Material) {
        material.updated_at = Utc::now();
        self.order.push(material.id.clone());
        self.records.insert(material.id.clone(), material);
        self.notify();
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// パッチを適用し、値が変わったかどうかを返す
fn apply_patch(target: &mut Material, patch: MaterialPatch) -> bool {
    let mut changed = false;

    fn set<T: PartialEq>(slot: &mut T, value: Option<T>, changed: &mut bool) {
        if let Some(value) = value {
            if *slot != value {
                *slot = value;
                *changed = true;
            }
        }
    }

    set(&mut target.name, patch.name, &mut changed);
    set(&mut target.material_type, patch.material_type, &mut changed);
    set(&mut target.status, patch.status, &mut changed);
    set(&mut target.translated_image_path, patch.translated_image_path, &mut changed);
    set(&mut target.translation_text_info, patch.translation_text_info, &mut changed);
    set(&mut target.translation_error, patch.translation_error, &mut changed);
    set(&mut target.selected_result, patch.selected_result, &mut changed);
    set(&mut target.confirmed, patch.confirmed, &mut changed);

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MaterialStatus, TranslatedMaterial};

    fn material(id: &str, client_id: &str, name: &str) -> Material {
        Material {
            id: id.to_string(),
            client_id: client_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_all_replaces_everything() {
        let mut store = MaterialStore::new();
        store.set_all(vec![material("m1", "c1", "a.png")]);
        store.set_all(vec![material("m2", "c1", "b.png"), material("m3", "c2", "c.png")]);

        assert_eq!(store.len(), 2);
        assert!(store.get("m1").is_none());
        assert_eq!(store.list_by_client("c1").len(), 1);
    }

    #[test]
    fn test_upsert_inserts_when_absent() {
        let mut store = MaterialStore::new();
        let mut patch = MaterialPatch::new("m1");
        patch.client_id = Some("c1".to_string());
        patch.name = Some("a.png".to_string());

        assert_eq!(store.upsert(patch).unwrap(), UpsertOutcome::Inserted);
        let stored = store.get("m1").expect("挿入されていない");
        assert_eq!(stored.status, MaterialStatus::Uploaded);
    }

    #[test]
    fn test_upsert_requires_client_and_name_for_insert() {
        let mut store = MaterialStore::new();
        let result = store.upsert(MaterialPatch::new("ghost"));
        assert!(matches!(result, Err(Error::IncompleteMaterial(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_upsert_shallow_merge_keeps_absent_fields() {
        let mut store = MaterialStore::new();
        let mut original = material("m1", "c1", "a.png");
        original.confirmed = true;
        store.set_all(vec![original]);

        let mut patch = MaterialPatch::new("m1");
        patch.status = Some(MaterialStatus::Failed);
        patch.translation_error = Some(Some("timeout".to_string()));
        assert_eq!(store.upsert(patch).unwrap(), UpsertOutcome::Updated);

        let stored = store.get("m1").unwrap();
        assert_eq!(stored.status, MaterialStatus::Failed);
        assert_eq!(stored.translation_error.as_deref(), Some("timeout"));
        assert!(stored.confirmed);
        assert_eq!(stored.name, "a.png");
    }

    #[test]
    fn test_upsert_rejects_client_change() {
        let mut store = MaterialStore::new();
        store.set_all(vec![material("m1", "c1", "a.png")]);

        let mut patch = MaterialPatch::new("m1");
        patch.client_id = Some("c2".to_string());
        assert!(matches!(store.upsert(patch), Err(Error::ClientMismatch { .. })));
        assert_eq!(store.get("m1").unwrap().client_id, "c1");
    }

    #[test]
    fn test_same_outcome_twice_is_idempotent() {
        let mut store = MaterialStore::new();
        store.set_all(vec![material("m1", "c1", "a.png")]);
        let outcome = TranslatedMaterial {
            id: "m1".to_string(),
            translated_image_path: Some("p.png".to_string()),
            ..Default::default()
        };

        store.upsert(MaterialPatch::translated(&outcome)).unwrap();
        let once = store.get("m1").cloned().unwrap();
        let revision = store.revision();

        assert_eq!(
            store.upsert(MaterialPatch::translated(&outcome)).unwrap(),
            UpsertOutcome::Unchanged
        );
        assert_eq!(store.get("m1").unwrap(), &once);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_remove_ignores_unknown_ids() {
        let mut store = MaterialStore::new();
        store.set_all(vec![material("m1", "c1", "a.png"), material("m2", "c1", "b.png")]);

        let removed = store.remove(&["m1".to_string(), "nope".to_string()]);
        assert_eq!(removed, 1);
        assert_eq!(store.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["m2"]);
        assert_eq!(store.remove(&["nope".to_string()]), 0);
    }

    #[test]
    fn test_mutations_bump_revision() {
        let mut store = MaterialStore::new();
        let rx = store.subscribe();
        let start = *rx.borrow();

        store.set_all(vec![material("m1", "c1", "a.png")]);
        store.remove(&["m1".to_string()]);

        assert_eq!(*rx.borrow(), start + 2);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_current_follows_store() {
        let mut store = MaterialStore::new();
        store.set_all(vec![material("m1", "c1", "a.png")]);
        assert!(store.select(Some("m1")));
        assert!(!store.select(Some("missing")));

        let mut patch = MaterialPatch::new("m1");
        patch.status = Some(MaterialStatus::Translated);
        store.upsert(patch).unwrap();
        assert_eq!(store.current().unwrap().status, MaterialStatus::Translated);

        store.remove(&["m1".to_string()]);
        assert!(store.current().is_none());
    }
}
