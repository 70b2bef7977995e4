use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaterialSyncError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("認証トークンが設定されていません。`material-sync config --set-token TOKEN` で設定してください")]
    MissingToken,

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("サーバーエラー ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("レスポンスの解析に失敗: {0}")]
    Decode(String),

    #[error("顧客が見つかりません: {0}")]
    ClientNotFound(String),

    #[error("資料が見つかりません: {0}")]
    MaterialNotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] material_sync_common::Error),
}

impl MaterialSyncError {
    /// ネットワーク・サーバー由来のエラーか（通知に変換される対象）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MaterialSyncError::Transport(_)
                | MaterialSyncError::Server { .. }
                | MaterialSyncError::Decode(_)
                | MaterialSyncError::Http(_)
        )
    }

    /// ユーザーに見せるメッセージ。サーバーの生メッセージがあればそれを使う
    pub fn user_message(&self) -> String {
        match self {
            MaterialSyncError::Server { message, .. } if !message.is_empty() => message.clone(),
            MaterialSyncError::Server { status, .. } => format!("サーバーエラー ({})", status),
            MaterialSyncError::Http(e) if e.is_timeout() => "サーバーが応答しません".to_string(),
            MaterialSyncError::Http(_) | MaterialSyncError::Transport(_) => {
                "サーバーに接続できません".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MaterialSyncError>;
