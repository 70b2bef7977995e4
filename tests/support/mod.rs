//! 結合テスト用のインメモリ実装

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use material_sync::backend::{MaterialBackend, TranslationCounts, TranslationReply};
use material_sync::error::{MaterialSyncError, Result};
use material_sync::notify::{ConfirmPrompt, Confirmer, Notifier, Severity};
use material_sync::common::{Client, Material, MaterialId, MaterialStatus, TranslatedMaterial};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
}

pub fn material(id: &str, client_id: &str, name: &str, status: MaterialStatus) -> Material {
    Material {
        id: id.to_string(),
        client_id: client_id.to_string(),
        name: name.to_string(),
        status,
        updated_at: at(0),
        ..Default::default()
    }
}

pub fn outcome(id: &str, path: &str) -> TranslatedMaterial {
    TranslatedMaterial {
        id: id.to_string(),
        name: None,
        translated_image_path: Some(path.to_string()),
        translation_text_info: Some(serde_json::json!({})),
    }
}

pub fn direct(outcomes: Vec<TranslatedMaterial>, failed: usize) -> TranslationReply {
    TranslationReply::Direct {
        counts: TranslationCounts {
            translated: outcomes.len(),
            failed,
        },
        outcomes,
    }
}

/// 翻訳APIの振る舞い
#[derive(Debug, Clone)]
pub enum FakeReply {
    Reply(TranslationReply),
    Fail { status: u16, message: String },
}

pub struct FakeBackend {
    pub clients: Vec<Client>,
    pub materials: Mutex<Vec<Material>>,
    pub reply: Mutex<FakeReply>,
    pub fail_fetch: AtomicBool,
    pub fail_delete: AtomicBool,
    pub deleted: Mutex<Vec<MaterialId>>,
    pub translate_calls: AtomicUsize,
    /// 設定されていれば一括削除はこの合図まで応答しない
    pub delete_gate: Mutex<Option<Arc<Notify>>>,
    pub delete_started: Notify,
}

impl FakeBackend {
    pub fn new(materials: Vec<Material>) -> Self {
        Self {
            clients: vec![Client {
                cid: "c1".to_string(),
                name: "テスト顧客".to_string(),
                ..Default::default()
            }],
            materials: Mutex::new(materials),
            reply: Mutex::new(FakeReply::Reply(TranslationReply::NeedsRefetch {
                counts: TranslationCounts::default(),
            })),
            fail_fetch: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            deleted: Mutex::new(Vec::new()),
            translate_calls: AtomicUsize::new(0),
            delete_gate: Mutex::new(None),
            delete_started: Notify::new(),
        }
    }

    pub fn with_reply(self, reply: FakeReply) -> Self {
        *self.reply.lock().unwrap() = reply;
        self
    }

    pub fn hold_deletes(&self, gate: Arc<Notify>) {
        *self.delete_gate.lock().unwrap() = Some(gate);
    }

    pub fn set_server_materials(&self, materials: Vec<Material>) {
        *self.materials.lock().unwrap() = materials;
    }
}

#[async_trait]
impl MaterialBackend for FakeBackend {
    async fn fetch_clients(&self) -> Result<Vec<Client>> {
        Ok(self.clients.clone())
    }

    async fn fetch_materials(&self, client_id: &str) -> Result<Vec<Material>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(MaterialSyncError::Transport("connection refused".to_string()));
        }
        let materials = self.materials.lock().unwrap();
        Ok(materials.iter().filter(|m| m.client_id == client_id).cloned().collect())
    }

    async fn start_translation(&self, _client_id: &str) -> Result<TranslationReply> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            FakeReply::Reply(reply) => Ok(reply),
            FakeReply::Fail { status, message } => Err(MaterialSyncError::Server { status, message }),
        }
    }

    async fn delete_materials(&self, _client_id: &str, ids: &[MaterialId]) -> Result<usize> {
        self.delete_started.notify_one();
        let gate = self.delete_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(MaterialSyncError::Server {
                status: 500,
                message: "取消上传失败".to_string(),
            });
        }
        let mut materials = self.materials.lock().unwrap();
        let before = materials.len();
        materials.retain(|m| !ids.contains(&m.id));
        self.deleted.lock().unwrap().extend(ids.iter().cloned());
        Ok(before - materials.len())
    }

    async fn delete_material(&self, id: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(MaterialSyncError::Transport("timeout".to_string()));
        }
        self.materials.lock().unwrap().retain(|m| m.id != id);
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(String, String, Severity)>>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<(String, String, Severity)> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.events.lock().unwrap().iter().filter(|(_, _, s)| *s == severity).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        self.events
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string(), severity));
    }
}

pub struct ScriptedConfirmer {
    pub answer: AtomicBool,
    pub prompts: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answer.load(Ordering::SeqCst)
    }
}
