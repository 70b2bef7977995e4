use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "material-sync")]
#[command(about = "顧客資料の翻訳状況を同期・確認するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 確認をすべて承認する
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 顧客の資料一覧（同名資料は1件に統合）
    List {
        /// 顧客ID
        #[arg(required = true)]
        client: String,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 未翻訳の資料を翻訳して結果を反映
    Translate {
        /// 顧客ID
        #[arg(required = true)]
        client: String,
    },

    /// エクスポート対象（確認済み資料）を表示
    Export {
        /// 顧客ID
        #[arg(required = true)]
        client: String,
    },

    /// 資料を削除
    Delete {
        /// 顧客ID
        #[arg(required = true)]
        client: String,

        /// 資料ID
        #[arg(required = true)]
        material: String,
    },

    /// アップロード済みの資料をまとめて取り消す
    Rollback {
        /// 顧客ID
        #[arg(required = true)]
        client: String,

        /// 取り消す資料ID
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 認証トークンを設定
        #[arg(long)]
        set_token: Option<String>,

        /// APIのベースURLを設定
        #[arg(long)]
        base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
