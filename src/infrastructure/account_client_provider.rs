//! アカウント別クライアント生成モジュール
//!
//! メンバーアカウントはSTS AssumeRoleで得た一時認証情報で、
//! 管理アカウントはLambda自身の認証情報でIAM/Resource Explorerクライアントを作成する。

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::config::Credentials;
use aws_sdk_sts::Client as StsClient;
use tracing::{info, warn};

use super::aws_error::from_sdk_error;
use super::iam_ops::{AwsIamOps, IamOps};
use super::resource_explorer_ops::{AwsResourceExplorerOps, ResourceExplorerOps};
use crate::domain::RemoteError;

/// AssumeRoleのセッション名
pub const ROLE_SESSION_NAME: &str = "ResourceExplorerSetup";

/// IAM/STSの呼び出しに使用するリージョン
const IDENTITY_REGION: &str = "us-east-1";

/// 1アカウント分のクライアント
pub struct AccountClients<I, E> {
    /// IAM操作
    pub iam: I,
    /// Resource Explorer操作
    pub explorer: E,
}

/// アカウント別クライアント生成トレイト（テスト用の抽象化）
#[async_trait]
pub trait AccountClientProvider: Send + Sync {
    type Iam: IamOps;
    type Explorer: ResourceExplorerOps;

    /// クロスアカウントロールを引き受け、そのアカウント向けのクライアントを作成する
    async fn assume_account(
        &self,
        account_id: &str,
    ) -> Result<AccountClients<Self::Iam, Self::Explorer>, RemoteError>;

    /// 実行中の認証情報（管理アカウント）でクライアントを作成する
    fn management_clients(&self) -> AccountClients<Self::Iam, Self::Explorer>;
}

/// 実際のAWS SDKを使用した実装
pub struct AwsAccountClientProvider {
    base_config: aws_config::SdkConfig,
    sts: StsClient,
    access_role_name: String,
}

impl AwsAccountClientProvider {
    /// 新しいAwsAccountClientProviderを作成
    ///
    /// # 引数
    /// * `base_config` - Lambda自身の認証情報を持つAWS設定
    /// * `access_role_name` - メンバーアカウントで引き受けるロール名
    pub fn new(base_config: &aws_config::SdkConfig, access_role_name: impl Into<String>) -> Self {
        let sts_config = aws_sdk_sts::config::Builder::from(base_config)
            .region(Region::new(IDENTITY_REGION))
            .build();
        Self {
            base_config: base_config.clone(),
            sts: StsClient::from_conf(sts_config),
            access_role_name: access_role_name.into(),
        }
    }

    fn role_arn(&self, account_id: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", account_id, self.access_role_name)
    }
}

#[async_trait]
impl AccountClientProvider for AwsAccountClientProvider {
    type Iam = AwsIamOps;
    type Explorer = AwsResourceExplorerOps;

    async fn assume_account(
        &self,
        account_id: &str,
    ) -> Result<AccountClients<AwsIamOps, AwsResourceExplorerOps>, RemoteError> {
        if account_id.is_empty() {
            return Err(RemoteError::other("AssumeRole", "アカウントIDが空です"));
        }

        let role_arn = self.role_arn(account_id);
        info!(account_id = %account_id, role_arn = %role_arn, "クロスアカウントロールを引き受け");

        let response = self
            .sts
            .assume_role()
            .role_arn(&role_arn)
            .role_session_name(ROLE_SESSION_NAME)
            .send()
            .await
            .map_err(|err| {
                warn!(account_id = %account_id, error = %err, "AssumeRoleエラー");
                from_sdk_error("AssumeRole", &err)
            })?;

        let credentials = response.credentials().ok_or_else(|| {
            RemoteError::other("AssumeRole", "応答に認証情報が含まれていません")
        })?;

        let expiry = SystemTime::try_from(*credentials.expiration()).ok();
        let credentials = Credentials::new(
            credentials.access_key_id(),
            credentials.secret_access_key(),
            Some(credentials.session_token().to_string()),
            expiry,
            "AssumeRole",
        );

        let account_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(IDENTITY_REGION))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok(AccountClients {
            iam: AwsIamOps::from_sdk_config(&account_config),
            explorer: AwsResourceExplorerOps::from_sdk_config(&account_config),
        })
    }

    fn management_clients(&self) -> AccountClients<AwsIamOps, AwsResourceExplorerOps> {
        AccountClients {
            iam: AwsIamOps::from_sdk_config(&self.base_config),
            explorer: AwsResourceExplorerOps::from_sdk_config(&self.base_config),
        }
    }
}
