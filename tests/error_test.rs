//! エラーケーステスト
//!
//! エラー型の表示・変換と、通知用メッセージの選び方を検証

use material_sync::common::Error as CommonError;
use material_sync::error::MaterialSyncError;

/// MaterialSyncErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        MaterialSyncError::Config("テスト設定エラー".to_string()),
        MaterialSyncError::MissingToken,
        MaterialSyncError::Transport("connection refused".to_string()),
        MaterialSyncError::Server {
            status: 500,
            message: "批量翻译失败".to_string(),
        },
        MaterialSyncError::Decode("missing field".to_string()),
        MaterialSyncError::ClientNotFound("c9".to_string()),
        MaterialSyncError::MaterialNotFound("m9".to_string()),
        MaterialSyncError::CliExecution("失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingTokenエラーのメッセージ確認
#[test]
fn test_missing_token_message() {
    let display = MaterialSyncError::MissingToken.to_string();

    assert!(display.contains("トークン"));
    assert!(display.contains("material-sync config"));
}

/// サーバーのメッセージがあればそのまま通知に使う
#[test]
fn test_user_message_prefers_server_message() {
    let err = MaterialSyncError::Server {
        status: 400,
        message: "没有需要翻译的图片材料".to_string(),
    };
    assert_eq!(err.user_message(), "没有需要翻译的图片材料");

    let err = MaterialSyncError::Server {
        status: 502,
        message: String::new(),
    };
    assert_eq!(err.user_message(), "サーバーエラー (502)");

    let err = MaterialSyncError::Transport("refused".to_string());
    assert_eq!(err.user_message(), "サーバーに接続できません");
}

/// 通信系のエラーだけが通知対象
#[test]
fn test_is_transport() {
    assert!(MaterialSyncError::Transport("x".to_string()).is_transport());
    assert!(MaterialSyncError::Decode("x".to_string()).is_transport());
    assert!(MaterialSyncError::Server {
        status: 500,
        message: String::new()
    }
    .is_transport());
    assert!(!MaterialSyncError::MissingToken.is_transport());
    assert!(!MaterialSyncError::MaterialNotFound("m1".to_string()).is_transport());
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: MaterialSyncError = io_err.into();

    assert!(matches!(err, MaterialSyncError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: MaterialSyncError = json_err.into();

    assert!(matches!(err, MaterialSyncError::JsonParse(_)));
}

/// common::Errorは透過的に表示される
#[test]
fn test_common_error_transparent() {
    let err: MaterialSyncError = CommonError::BatchIncomplete { current: 1, total: 3 }.into();

    assert!(matches!(err, MaterialSyncError::Common(_)));
    assert_eq!(
        err.to_string(),
        CommonError::BatchIncomplete { current: 1, total: 3 }.to_string()
    );
}
