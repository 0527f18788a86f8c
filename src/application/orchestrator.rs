/// 呼び出しの振り分けとアカウント単位の実行
///
/// ペイロードのactionに応じてdiscover/setup/destroyを実行し、
/// アカウントごとの結果または失敗記録をまとめて返す。
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::access_provisioner::{AccessProvisionError, AccessProvisioner};
use super::account_discoverer::{AccountDiscoverer, AccountDiscoveryError};
use super::index_reconciler::{IndexReconcileError, IndexTopologyReconciler, ReconcileOptions};
use super::region_resolver::RegionResolver;
use super::teardown_reconciler::TeardownReconciler;
use crate::domain::{
    AccountFailure, AccountOutcome, RegionSet, RemoteError, RunSummary, TeardownSummary,
};
use crate::infrastructure::{
    AccountClientProvider, AccountClients, OrganizationsOps, RegionCatalogOps, SetupConfig,
};

/// setup完了時のメッセージ
pub const SETUP_COMPLETED_MESSAGE: &str = "Resource Explorer setup completed";

/// destroy完了時のメッセージ
pub const DESTROY_COMPLETED_MESSAGE: &str = "Resource Explorer teardown completed";

/// 呼び出しペイロード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvocationRequest {
    /// discover / setup / destroy（未指定・その他はsetup）
    pub action: Option<String>,
    /// 処理対象のアカウントID（空の場合は設定のメンバーアカウント）
    pub accounts: Vec<String>,
    pub skip_aggregator: bool,
    pub skip_default_view: bool,
    /// アカウントの致命的エラー後も残りのアカウントを処理する
    pub continue_on_error: bool,
}

impl InvocationRequest {
    pub fn action(&self) -> Action {
        self.action.as_deref().map(Action::from).unwrap_or_default()
    }

    fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            skip_aggregator: self.skip_aggregator,
            skip_default_view: self.skip_default_view,
        }
    }
}

/// 実行する操作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Action {
    Discover,
    #[default]
    Setup,
    Destroy,
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s {
            "discover" => Action::Discover,
            "destroy" => Action::Destroy,
            _ => Action::Setup,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Discover => write!(f, "discover"),
            Action::Setup => write!(f, "setup"),
            Action::Destroy => write!(f, "destroy"),
        }
    }
}

/// discoverの応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverResponse {
    pub accounts: Vec<String>,
}

/// setupの応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupResponse {
    pub message: String,
    /// RFC 3339形式の完了時刻
    pub timestamp: String,
    pub results: Vec<AccountOutcome<RunSummary>>,
}

/// destroyの応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyResponse {
    pub status_code: u16,
    pub body: DestroyBody,
}

/// destroyの応答本体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyBody {
    pub message: String,
    pub timestamp: String,
    pub processed_accounts: Vec<AccountOutcome<TeardownSummary>>,
}

/// 呼び出しの応答
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InvocationResponse {
    Discover(DiscoverResponse),
    Setup(SetupResponse),
    Destroy(DestroyResponse),
}

/// アカウント単位の致命的エラー
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Access(#[from] AccessProvisionError),

    #[error(transparent)]
    Reconcile(#[from] IndexReconcileError),

    #[error("ロールの引き受けに失敗しました: {0}")]
    Connect(#[source] RemoteError),
}

/// オーケストレーターのエラー型
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Discovery(#[from] AccountDiscoveryError),

    #[error("リージョンの解決に失敗しました: {0}")]
    RegionResolution(#[source] RemoteError),

    #[error("アカウント {account_id} の処理に失敗しました: {source}")]
    Account {
        account_id: String,
        #[source]
        source: AccountError,
    },
}

/// オーケストレーター
///
/// 設定とリモート操作を保持し、1回の呼び出しを実行する。
/// アカウントとリージョンは逐次処理する。
pub struct Orchestrator<P, O, C>
where
    P: AccountClientProvider,
    O: OrganizationsOps,
    C: RegionCatalogOps,
{
    config: SetupConfig,
    provider: P,
    organizations: O,
    catalog: C,
}

impl<P, O, C> Orchestrator<P, O, C>
where
    P: AccountClientProvider,
    O: OrganizationsOps,
    C: RegionCatalogOps,
{
    /// 新しいOrchestratorを作成
    ///
    /// # 引数
    /// * `config` - セットアップ設定
    /// * `provider` - アカウント別クライアント生成
    /// * `organizations` - Organizations操作（discover用）
    /// * `catalog` - リージョンカタログ操作
    pub fn new(config: SetupConfig, provider: P, organizations: O, catalog: C) -> Self {
        Self {
            config,
            provider,
            organizations,
            catalog,
        }
    }

    /// ペイロードのactionに応じて処理を実行する
    pub async fn run(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationResponse, OrchestratorError> {
        let action = request.action();
        info!(
            action = %action,
            skip_aggregator = request.skip_aggregator,
            skip_default_view = request.skip_default_view,
            continue_on_error = request.continue_on_error,
            "呼び出し開始"
        );

        match action {
            Action::Discover => self.discover().await.map(InvocationResponse::Discover),
            Action::Setup => self.setup(request).await.map(InvocationResponse::Setup),
            Action::Destroy => self.destroy(request).await.map(InvocationResponse::Destroy),
        }
    }

    /// 管理対象のアカウントを列挙する（変更は行わない）
    pub async fn discover(&self) -> Result<DiscoverResponse, OrchestratorError> {
        let accounts =
            AccountDiscoverer::new(&self.organizations, self.config.root_account_id())
                .discover()
                .await?;
        Ok(DiscoverResponse { accounts })
    }

    /// 各アカウントのアクセス準備とインデックス構成の収束処理を行う
    pub async fn setup(
        &self,
        request: &InvocationRequest,
    ) -> Result<SetupResponse, OrchestratorError> {
        let regions = self.resolve_regions().await?;
        let accounts = self.target_accounts(request);
        let options = request.reconcile_options();
        let mut results = Vec::with_capacity(accounts.len());

        for account_id in &accounts {
            info!(account_id = %account_id, "アカウントのセットアップ開始");
            match self.setup_account(account_id, &regions, options).await {
                Ok(summary) => results.push(AccountOutcome::Completed(summary)),
                Err(err) => {
                    error!(account_id = %account_id, error = %err, "アカウントのセットアップに失敗");
                    results.push(AccountOutcome::Failed(AccountFailure::new(
                        account_id.as_str(),
                        &err,
                    )));
                    if !request.continue_on_error {
                        log_partial_results(&results);
                        return Err(OrchestratorError::Account {
                            account_id: account_id.clone(),
                            source: err,
                        });
                    }
                }
            }
        }

        info!(
            account_count = results.len(),
            failed_count = results.iter().filter(|r| r.is_failed()).count(),
            "セットアップ完了"
        );
        Ok(SetupResponse {
            message: SETUP_COMPLETED_MESSAGE.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            results,
        })
    }

    /// 各アカウントのインデックス構成を削除する
    pub async fn destroy(
        &self,
        request: &InvocationRequest,
    ) -> Result<DestroyResponse, OrchestratorError> {
        let regions = self.resolve_regions().await?;
        let accounts = self.target_accounts(request);
        let mut processed = Vec::with_capacity(accounts.len());

        for account_id in &accounts {
            info!(account_id = %account_id, "アカウントの削除処理開始");
            match self.connect(account_id).await {
                Ok(clients) => {
                    let summary = TeardownReconciler::new(&clients.explorer)
                        .teardown(account_id, &regions)
                        .await;
                    processed.push(AccountOutcome::Completed(summary));
                }
                Err(err) => {
                    error!(account_id = %account_id, error = %err, "アカウントの削除処理に失敗");
                    processed.push(AccountOutcome::Failed(AccountFailure::new(
                        account_id.as_str(),
                        &err,
                    )));
                    if !request.continue_on_error {
                        log_partial_results(&processed);
                        return Err(OrchestratorError::Account {
                            account_id: account_id.clone(),
                            source: err,
                        });
                    }
                }
            }
        }

        info!(account_count = processed.len(), "削除処理完了");
        Ok(DestroyResponse {
            status_code: 200,
            body: DestroyBody {
                message: DESTROY_COMPLETED_MESSAGE.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                processed_accounts: processed,
            },
        })
    }

    async fn resolve_regions(&self) -> Result<RegionSet, OrchestratorError> {
        RegionResolver::new(&self.catalog)
            .resolve()
            .await
            .map_err(OrchestratorError::RegionResolution)
    }

    /// ペイロードのアカウント、なければ設定のメンバーアカウント
    fn target_accounts(&self, request: &InvocationRequest) -> Vec<String> {
        let accounts = if request.accounts.is_empty() {
            self.config.member_accounts().to_vec()
        } else {
            request.accounts.clone()
        };
        if accounts.is_empty() {
            warn!("処理対象のアカウントがありません");
        }
        accounts
    }

    async fn setup_account(
        &self,
        account_id: &str,
        regions: &RegionSet,
        options: ReconcileOptions,
    ) -> Result<RunSummary, AccountError> {
        let clients = if self.config.is_root_account(account_id) {
            info!(account_id = %account_id, "管理アカウントのためアクセス準備をスキップ");
            self.provider.management_clients()
        } else {
            AccessProvisioner::new(&self.provider, &self.config)
                .provision(account_id)
                .await?
        };

        let summary = IndexTopologyReconciler::new(&clients.explorer, options)
            .reconcile(account_id, regions)
            .await?;
        Ok(summary)
    }

    /// アクセス準備を行わずにアカウントのクライアントを取得する
    async fn connect(
        &self,
        account_id: &str,
    ) -> Result<AccountClients<P::Iam, P::Explorer>, AccountError> {
        if self.config.is_root_account(account_id) {
            return Ok(self.provider.management_clients());
        }
        self.provider
            .assume_account(account_id)
            .await
            .map_err(AccountError::Connect)
    }
}

/// 中断時に、それまでの結果をログに残す
fn log_partial_results<T: Serialize>(results: &[AccountOutcome<T>]) {
    match serde_json::to_string(results) {
        Ok(json) => info!(results = %json, "中断までの処理結果"),
        Err(e) => warn!(error = %e, "処理結果のシリアライズに失敗"),
    }
}
