/// Resource Explorerセットアップ Lambda関数
///
/// 組織のメンバーアカウントにResource Explorerのインデックス、アグリゲーター、
/// デフォルトビューを構成する（destroyで削除、discoverで対象アカウントを列挙）。
/// Lambda関数としても、ローカルスクリプトとしても実行可能。
///
/// # 環境変数
/// - FEDERATION_AUDIENCE: リソース一覧用ロールが信頼するaudience（必須）
/// - ROOT_ACCOUNT_ID: 管理アカウントID（必須）
/// - POLICY_TEMPLATE_PATH: ポリシーテンプレートのパス（デフォルト: policies/resource_lister_policy.json）
/// - MEMBER_ACCOUNTS: ペイロードにアカウントがない場合の対象アカウント（JSON配列）
///
/// # Lambda実行
/// ```json
/// {"action": "setup", "accounts": ["222222222222"], "skipAggregator": false}
/// ```
///
/// # ローカル実行
/// ```bash
/// export FEDERATION_AUDIENCE=...
/// export ROOT_ACCOUNT_ID=111111111111
/// cargo run --bin setup -- --action setup --accounts 222222222222,333333333333
/// ```
use clap::Parser;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use resource_explorer_setup::application::{InvocationRequest, InvocationResponse, Orchestrator};
use resource_explorer_setup::infrastructure::{
    init_logging, AwsAccountClientProvider, AwsOrganizationsOps, AwsRegionCatalogOps, SetupConfig,
};
use tracing::{error, info};

/// コマンドライン引数（ローカル実行時のみ使用）
#[derive(Parser, Debug)]
#[command(name = "setup")]
#[command(about = "メンバーアカウントのResource Explorerを構成・削除")]
struct CliArgs {
    /// discover / setup / destroy
    #[arg(long, short = 'a', default_value = "setup")]
    action: String,

    /// 処理対象のアカウントID（カンマ区切り）
    /// 省略時は環境変数MEMBER_ACCOUNTS
    #[arg(long, value_delimiter = ',')]
    accounts: Vec<String>,

    /// アグリゲーターへの昇格を行わない
    #[arg(long)]
    skip_aggregator: bool,

    /// デフォルトビューの設定を行わない
    #[arg(long)]
    skip_default_view: bool,

    /// アカウントの致命的エラー後も残りのアカウントを処理する
    #[arg(long)]
    continue_on_error: bool,
}

impl From<CliArgs> for InvocationRequest {
    fn from(args: CliArgs) -> Self {
        Self {
            action: Some(args.action),
            accounts: args.accounts,
            skip_aggregator: args.skip_aggregator,
            skip_default_view: args.skip_default_view,
            continue_on_error: args.continue_on_error,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // Lambda環境かどうかを判定
    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        info!("Lambda関数として起動");
        let func = service_fn(handler);
        lambda_runtime::run(func).await?;
    } else {
        info!("ローカルスクリプトとして起動");
        run_local().await?;
    }

    Ok(())
}

/// Lambda関数のメインハンドラー
async fn handler(event: LambdaEvent<InvocationRequest>) -> Result<InvocationResponse, Error> {
    run_invocation(&event.payload).await
}

/// ローカル実行用関数
async fn run_local() -> Result<(), Error> {
    let request = InvocationRequest::from(CliArgs::parse());
    let response = run_invocation(&request).await?;

    let output = serde_json::to_string_pretty(&response)?;
    println!("{}", output);
    Ok(())
}

/// 設定とAWSクライアントを用意して1回の呼び出しを実行
async fn run_invocation(request: &InvocationRequest) -> Result<InvocationResponse, Error> {
    let config = SetupConfig::from_env().map_err(|e| {
        error!(error = %e, "設定読み込み失敗");
        Error::from(e.to_string())
    })?;

    info!(
        root_account_id = %config.root_account_id(),
        lister_role_name = %config.lister_role_name(),
        member_account_count = config.member_accounts().len(),
        "設定読み込み完了"
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let provider = AwsAccountClientProvider::new(&aws_config, config.access_role_name());
    let orchestrator = Orchestrator::new(
        config,
        provider,
        AwsOrganizationsOps::from_sdk_config(&aws_config),
        AwsRegionCatalogOps::from_sdk_config(&aws_config),
    );

    orchestrator.run(request).await.map_err(|e| {
        error!(error = %e, "呼び出しの処理に失敗");
        Error::from(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_to_request() {
        let args = CliArgs::parse_from([
            "setup",
            "--action",
            "destroy",
            "--accounts",
            "222222222222,333333333333",
            "--continue-on-error",
        ]);

        let request = InvocationRequest::from(args);

        assert_eq!(request.action.as_deref(), Some("destroy"));
        assert_eq!(
            request.accounts,
            vec!["222222222222".to_string(), "333333333333".to_string()]
        );
        assert!(request.continue_on_error);
        assert!(!request.skip_aggregator);
    }

    #[test]
    fn test_cli_args_defaults() {
        let args = CliArgs::parse_from(["setup"]);

        let request = InvocationRequest::from(args);

        assert_eq!(request.action.as_deref(), Some("setup"));
        assert!(request.accounts.is_empty());
        assert!(!request.skip_default_view);
    }
}
