/// アカウント単位の実行結果
///
/// 1回の実行ごとにアカウント単位で生成され、呼び出し元にそのまま返される。
/// 永続化はしない。
use serde::{Deserialize, Serialize};

/// デフォルトビューの構成結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultViewStatus {
    /// 作成してデフォルトビューに設定した
    Created,
    /// 既に存在していた
    AlreadyExists,
}

/// デフォルトビューの情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultViewInfo {
    /// ビューが存在するリージョン（アグリゲーターのリージョン）
    pub region: String,
    /// ビューARN（既存ビューのARNが特定できなかった場合はNone）
    pub view_arn: Option<String>,
    /// 構成結果
    pub status: DefaultViewStatus,
}

/// セットアップ結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// アカウントID
    pub account_id: String,
    /// 処理対象リージョン
    pub regions: Vec<String>,
    /// インデックスが配置されたリージョン
    pub deployed_indexes: Vec<String>,
    /// アグリゲーターのリージョン
    pub aggregator_region: Option<String>,
    /// デフォルトビュー
    pub default_view: Option<DefaultViewInfo>,
    /// 処理を継続したエラーのメッセージ（発生順）
    pub errors: Vec<String>,
}

impl RunSummary {
    /// 空の結果を作成
    pub fn new(account_id: impl Into<String>, regions: Vec<String>) -> Self {
        Self {
            account_id: account_id.into(),
            regions,
            deployed_indexes: Vec::new(),
            aggregator_region: None,
            default_view: None,
            errors: Vec::new(),
        }
    }

    /// インデックスを配置済みとして記録（重複は無視）
    pub fn record_deployed(&mut self, region: &str) {
        if !self.deployed_indexes.iter().any(|r| r == region) {
            self.deployed_indexes.push(region.to_string());
        }
    }

    /// 継続可能なエラーを記録
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// 削除結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownSummary {
    /// アカウントID
    pub account_id: String,
    /// 処理対象リージョン
    pub regions: Vec<String>,
    /// 削除したビューのARN
    pub deleted_views: Vec<String>,
    /// インデックスを削除したリージョン
    pub removed_indexes: Vec<String>,
    /// 処理を継続したエラーのメッセージ（発生順）
    pub errors: Vec<String>,
}

impl TeardownSummary {
    pub fn new(account_id: impl Into<String>, regions: Vec<String>) -> Self {
        Self {
            account_id: account_id.into(),
            regions,
            deleted_views: Vec::new(),
            removed_indexes: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// アカウント処理の失敗記録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFailure {
    /// アカウントID
    pub account_id: String,
    /// 固定値 "failed"
    pub status: String,
    /// エラーメッセージ
    pub error: String,
}

impl AccountFailure {
    pub fn new(account_id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            account_id: account_id.into(),
            status: "failed".to_string(),
            error: error.to_string(),
        }
    }
}

/// アカウント単位の結果（成功時の結果または失敗記録）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountOutcome<T> {
    /// 処理完了
    Completed(T),
    /// 致命的エラーで中断
    Failed(AccountFailure),
}

impl<T> AccountOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, AccountOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deployed_ignores_duplicates() {
        let mut summary = RunSummary::new("A1", vec!["us-west-2".to_string()]);
        summary.record_deployed("us-west-2");
        summary.record_deployed("us-west-2");

        assert_eq!(summary.deployed_indexes, vec!["us-west-2"]);
    }

    #[test]
    fn test_run_summary_serializes_camel_case() {
        let mut summary = RunSummary::new(
            "123456789012",
            vec!["us-west-2".to_string(), "eu-west-1".to_string()],
        );
        summary.record_deployed("us-west-2");
        summary.aggregator_region = Some("us-west-2".to_string());
        summary.default_view = Some(DefaultViewInfo {
            region: "us-west-2".to_string(),
            view_arn: None,
            status: DefaultViewStatus::AlreadyExists,
        });

        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(
            value,
            json!({
                "accountId": "123456789012",
                "regions": ["us-west-2", "eu-west-1"],
                "deployedIndexes": ["us-west-2"],
                "aggregatorRegion": "us-west-2",
                "defaultView": {
                    "region": "us-west-2",
                    "viewArn": null,
                    "status": "already-exists"
                },
                "errors": []
            })
        );
    }

    #[test]
    fn test_account_outcome_untagged_serialization() {
        let failed: AccountOutcome<RunSummary> =
            AccountOutcome::Failed(AccountFailure::new("A9", "AssumeRole 失敗"));

        let value = serde_json::to_value(&failed).unwrap();

        assert_eq!(
            value,
            json!({"accountId": "A9", "status": "failed", "error": "AssumeRole 失敗"})
        );
        assert!(failed.is_failed());
    }

    #[test]
    fn test_teardown_summary_serialization() {
        let mut summary = TeardownSummary::new("A1", vec!["us-west-2".to_string()]);
        summary.removed_indexes.push("us-west-2".to_string());
        summary.record_error("us-west-2: DeleteView 失敗");

        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["accountId"], "A1");
        assert_eq!(value["removedIndexes"], json!(["us-west-2"]));
        assert_eq!(value["deletedViews"], json!([]));
        assert_eq!(value["errors"].as_array().unwrap().len(), 1);
    }
}
