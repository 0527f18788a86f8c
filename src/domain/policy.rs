//! リソース一覧用ロールのポリシー文書
//!
//! - インラインポリシー: テンプレートのアカウントIDプレースホルダーを置換して生成
//! - 信頼ポリシー: Web ID連携（audience条件付き）でのAssumeRoleを許可

use serde_json::{json, Value};

/// ポリシーテンプレート中のアカウントIDプレースホルダー
pub const ACCOUNT_ID_PLACEHOLDER: &str = "${account_id}";

/// インラインポリシーのテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTemplate {
    body: String,
}

impl PolicyTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// プレースホルダーを全てアカウントIDに置換したポリシー文書を返す
    pub fn render(&self, account_id: &str) -> String {
        self.body.replace(ACCOUNT_ID_PLACEHOLDER, account_id)
    }
}

/// Web ID連携でのAssumeRoleを許可する信頼ポリシーを生成する
///
/// # 引数
/// * `provider` - 連携先のIDプロバイダー（例: accounts.google.com）
/// * `audience` - 信頼するaudienceクレーム
pub fn federated_trust_policy(provider: &str, audience: &str) -> Value {
    let audience_key = format!("{}:aud", provider);
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {
                "Federated": provider
            },
            "Action": "sts:AssumeRoleWithWebIdentity",
            "Condition": {
                "StringEquals": {
                    (audience_key): audience
                }
            }
        }]
    })
}
