//! Organizations操作モジュール
//!
//! 組織のメンバーアカウント一覧をページ単位で取得する。

use async_trait::async_trait;
use aws_sdk_organizations::Client as OrganizationsClient;
use tracing::{info, warn};

use super::aws_error::from_sdk_error;
use crate::domain::{AccountStatus, RemoteError};

/// ListAccountsの1ページ分のアカウント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// アカウントID
    pub id: String,
    /// アカウントの状態
    pub status: AccountStatus,
}

/// ListAccountsの1ページ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPage {
    /// このページのアカウント
    pub accounts: Vec<AccountRecord>,
    /// 次ページの継続トークン（最終ページならNone）
    pub next_token: Option<String>,
}

/// Organizations操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait OrganizationsOps: Send + Sync {
    /// メンバーアカウント一覧を1ページ取得する
    ///
    /// # 引数
    /// * `next_token` - 前ページの継続トークン（先頭ページはNone）
    async fn list_accounts_page(&self, next_token: Option<&str>)
        -> Result<AccountPage, RemoteError>;
}

/// 実際のAWS Organizations SDKを使用した実装
pub struct AwsOrganizationsOps {
    client: OrganizationsClient,
}

impl AwsOrganizationsOps {
    /// 新しいAwsOrganizationsOpsを作成
    pub fn new(client: OrganizationsClient) -> Self {
        Self { client }
    }

    /// AWS設定からクライアントを作成
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(OrganizationsClient::new(config))
    }
}

#[async_trait]
impl OrganizationsOps for AwsOrganizationsOps {
    async fn list_accounts_page(
        &self,
        next_token: Option<&str>,
    ) -> Result<AccountPage, RemoteError> {
        let response = self
            .client
            .list_accounts()
            .set_next_token(next_token.map(str::to_string))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "ListAccountsエラー");
                from_sdk_error("ListAccounts", &err)
            })?;

        #[allow(deprecated)]
        let accounts: Vec<AccountRecord> = response
            .accounts()
            .iter()
            .filter_map(|account| {
                let id = account.id()?;
                let status = account
                    .status()
                    .map(|s| AccountStatus::from(s.as_str()))
                    .unwrap_or_else(|| AccountStatus::Other("unknown".to_string()));
                Some(AccountRecord {
                    id: id.to_string(),
                    status,
                })
            })
            .collect();

        info!(
            account_count = accounts.len(),
            has_next_token = response.next_token().is_some(),
            "ListAccounts成功"
        );

        Ok(AccountPage {
            accounts,
            next_token: response.next_token().map(str::to_string),
        })
    }
}
