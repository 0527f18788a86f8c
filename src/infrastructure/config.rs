/// セットアップLambda設定
///
/// 連携先audience、管理アカウントID、ポリシーテンプレートなど、
/// 実行全体で共有する設定を環境変数から読み込む。
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::PolicyTemplate;

/// ポリシーテンプレートのデフォルトパス（LAMBDA_TASK_ROOTからの相対パス）
pub const DEFAULT_POLICY_TEMPLATE_PATH: &str = "policies/resource_lister_policy.json";

/// メンバーアカウントで引き受けるロールのデフォルト名
pub const DEFAULT_ACCESS_ROLE_NAME: &str = "OrganizationAccountAccessRole";

/// リソース一覧用ロールのデフォルト名
pub const DEFAULT_LISTER_ROLE_NAME: &str = "P0RoleIamResourceLister";

/// リソース一覧用ロールのインラインポリシーのデフォルト名
pub const DEFAULT_LISTER_POLICY_NAME: &str = "P0RoleIamResourceListerPolicy";

/// Web ID連携のデフォルトプロバイダー
pub const DEFAULT_FEDERATION_PROVIDER: &str = "accounts.google.com";

/// セットアップ設定のエラー型
#[derive(Debug, Error)]
pub enum SetupConfigError {
    #[error("環境変数が設定されていません: {0}")]
    MissingEnvVar(String),

    #[error("ポリシーテンプレートを読み込めません: {path}: {message}")]
    PolicyTemplateRead { path: String, message: String },

    #[error("MEMBER_ACCOUNTSの形式が不正です: {0}")]
    InvalidMemberAccounts(String),
}

/// セットアップLambda設定
///
/// 以下の環境変数から読み込む:
/// - FEDERATION_AUDIENCE: リソース一覧用ロールが信頼するaudience（必須）
/// - ROOT_ACCOUNT_ID: 管理アカウントID（必須）
/// - FEDERATION_PROVIDER: Web ID連携のプロバイダー（デフォルト: accounts.google.com）
/// - POLICY_TEMPLATE_PATH: ポリシーテンプレートのパス
/// - ACCESS_ROLE_NAME: メンバーアカウントで引き受けるロール名
/// - LISTER_ROLE_NAME: リソース一覧用ロール名
/// - LISTER_POLICY_NAME: インラインポリシー名
/// - MEMBER_ACCOUNTS: ペイロードにアカウントがない場合の対象アカウント（JSON配列）
#[derive(Debug, Clone)]
pub struct SetupConfig {
    federation_audience: String,
    federation_provider: String,
    root_account_id: String,
    policy_template: PolicyTemplate,
    access_role_name: String,
    lister_role_name: String,
    lister_policy_name: String,
    member_accounts: Vec<String>,
}

impl SetupConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # エラー
    /// 必須の環境変数がない場合、テンプレートが読めない場合はエラーを返す
    pub fn from_env() -> Result<Self, SetupConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// キー参照関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SetupConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SetupConfigError::MissingEnvVar(key.to_string()))
        };
        let optional = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let federation_audience = required("FEDERATION_AUDIENCE")?;
        let root_account_id = required("ROOT_ACCOUNT_ID")?;

        let template_path = resolve_template_path(
            &optional("POLICY_TEMPLATE_PATH", DEFAULT_POLICY_TEMPLATE_PATH),
            lookup("LAMBDA_TASK_ROOT").as_deref(),
        );
        let policy_template = load_policy_template(&template_path)?;

        let member_accounts = match lookup("MEMBER_ACCOUNTS") {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<String>>(&raw)
                .map_err(|e| SetupConfigError::InvalidMemberAccounts(e.to_string()))?,
            _ => Vec::new(),
        };

        Ok(Self {
            federation_audience,
            federation_provider: optional("FEDERATION_PROVIDER", DEFAULT_FEDERATION_PROVIDER),
            root_account_id,
            policy_template,
            access_role_name: optional("ACCESS_ROLE_NAME", DEFAULT_ACCESS_ROLE_NAME),
            lister_role_name: optional("LISTER_ROLE_NAME", DEFAULT_LISTER_ROLE_NAME),
            lister_policy_name: optional("LISTER_POLICY_NAME", DEFAULT_LISTER_POLICY_NAME),
            member_accounts,
        })
    }

    /// 明示的な値で設定を作成（他の項目はデフォルト値）
    pub fn new(
        federation_audience: impl Into<String>,
        root_account_id: impl Into<String>,
        policy_template: PolicyTemplate,
    ) -> Self {
        Self {
            federation_audience: federation_audience.into(),
            federation_provider: DEFAULT_FEDERATION_PROVIDER.to_string(),
            root_account_id: root_account_id.into(),
            policy_template,
            access_role_name: DEFAULT_ACCESS_ROLE_NAME.to_string(),
            lister_role_name: DEFAULT_LISTER_ROLE_NAME.to_string(),
            lister_policy_name: DEFAULT_LISTER_POLICY_NAME.to_string(),
            member_accounts: Vec::new(),
        }
    }

    /// ペイロードにアカウントがない場合の対象アカウントを設定
    pub fn with_member_accounts(mut self, member_accounts: Vec<String>) -> Self {
        self.member_accounts = member_accounts;
        self
    }

    pub fn federation_audience(&self) -> &str {
        &self.federation_audience
    }

    pub fn federation_provider(&self) -> &str {
        &self.federation_provider
    }

    pub fn root_account_id(&self) -> &str {
        &self.root_account_id
    }

    pub fn policy_template(&self) -> &PolicyTemplate {
        &self.policy_template
    }

    pub fn access_role_name(&self) -> &str {
        &self.access_role_name
    }

    pub fn lister_role_name(&self) -> &str {
        &self.lister_role_name
    }

    pub fn lister_policy_name(&self) -> &str {
        &self.lister_policy_name
    }

    pub fn member_accounts(&self) -> &[String] {
        &self.member_accounts
    }

    /// 管理（ルート）アカウントかどうか
    pub fn is_root_account(&self, account_id: &str) -> bool {
        self.root_account_id == account_id
    }
}

/// テンプレートパスを解決する（相対パスはタスクルート、なければカレントディレクトリ基準）
fn resolve_template_path(path: &str, task_root: Option<&str>) -> PathBuf {
    let path = Path::new(path);
    match task_root {
        Some(root) if path.is_relative() => Path::new(root).join(path),
        _ => path.to_path_buf(),
    }
}

fn load_policy_template(path: &Path) -> Result<PolicyTemplate, SetupConfigError> {
    std::fs::read_to_string(path)
        .map(PolicyTemplate::new)
        .map_err(|e| SetupConfigError::PolicyTemplateRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}
