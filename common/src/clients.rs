//! 顧客一覧と画面遷移先の解決
//!
//! 読み込み済みの一覧にない顧客IDはエラーにせずダッシュボードへ戻す。

use crate::types::Client;

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Translation(Client),
    Dashboard,
}

#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<Client>,
}

impl ClientDirectory {
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    pub fn replace(&mut self, clients: Vec<Client>) {
        self.clients = clients;
    }

    pub fn get(&self, cid: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.cid == cid)
    }

    pub fn navigate(&self, cid: &str) -> Navigation {
        match self.get(cid) {
            Some(client) => Navigation::Translation(client.clone()),
            None => {
                tracing::warn!(client_id = cid, "unknown client, redirecting to dashboard");
                Navigation::Dashboard
            }
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }
}
