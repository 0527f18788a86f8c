/// アクセス準備
///
/// メンバーアカウントのクロスアカウントロールを引き受け、
/// Web ID連携で引き受け可能なリソース一覧用ロールとインラインポリシーを用意する。
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{federated_trust_policy, RemoteError};
use crate::infrastructure::{AccountClientProvider, AccountClients, IamOps, RoleTag, SetupConfig};

/// 作成したロールに付与するタグのキー
pub const MANAGED_TAG_KEY: &str = "P0Security";

/// 作成したロールに付与するタグの値
pub const MANAGED_TAG_VALUE: &str = "Managed by Lambda";

/// アクセス準備のエラー型
#[derive(Debug, Error)]
pub enum AccessProvisionError {
    #[error("ロールの引き受けに失敗しました: {0}")]
    AssumeRole(#[source] RemoteError),

    #[error("ロールの確認に失敗しました: {0}")]
    RoleLookup(#[source] RemoteError),

    #[error("ロールの作成に失敗しました: {0}")]
    RoleCreation(#[source] RemoteError),

    #[error("ポリシーの登録に失敗しました: {0}")]
    PolicyUpsert(#[source] RemoteError),

    #[error("信頼ポリシーの生成に失敗しました: {0}")]
    TrustPolicy(#[from] serde_json::Error),
}

/// アクセス準備
pub struct AccessProvisioner<'a, P>
where
    P: AccountClientProvider,
{
    provider: &'a P,
    config: &'a SetupConfig,
}

impl<'a, P> AccessProvisioner<'a, P>
where
    P: AccountClientProvider,
{
    pub fn new(provider: &'a P, config: &'a SetupConfig) -> Self {
        Self { provider, config }
    }

    /// アカウントへのアクセスを準備し、そのアカウント向けのクライアントを返す
    ///
    /// # 処理フロー
    /// 1. クロスアカウントロールを引き受ける
    /// 2. リソース一覧用ロールを確認し、存在しなければ作成する
    /// 3. ポリシーテンプレートを展開してインラインポリシーを登録する（常に実行）
    pub async fn provision(
        &self,
        account_id: &str,
    ) -> Result<AccountClients<P::Iam, P::Explorer>, AccessProvisionError> {
        let clients = self
            .provider
            .assume_account(account_id)
            .await
            .map_err(|err| {
                error!(account_id = %account_id, error = %err, "ロールの引き受けに失敗");
                AccessProvisionError::AssumeRole(err)
            })?;

        self.ensure_lister_role(account_id, &clients.iam).await?;
        self.upsert_lister_policy(account_id, &clients.iam).await?;

        Ok(clients)
    }

    async fn ensure_lister_role(
        &self,
        account_id: &str,
        iam: &P::Iam,
    ) -> Result<(), AccessProvisionError> {
        let role_name = self.config.lister_role_name();

        match iam.get_role(role_name).await {
            Ok(()) => {
                info!(account_id = %account_id, role_name = %role_name, "ロールは既に存在");
                return Ok(());
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                error!(account_id = %account_id, role_name = %role_name, error = %err, "ロールの確認に失敗");
                return Err(AccessProvisionError::RoleLookup(err));
            }
        }

        let trust_policy = serde_json::to_string(&federated_trust_policy(
            self.config.federation_provider(),
            self.config.federation_audience(),
        ))?;
        let tags = [RoleTag::new(MANAGED_TAG_KEY, MANAGED_TAG_VALUE)];

        iam.create_role(role_name, &trust_policy, &tags)
            .await
            .map_err(|err| {
                error!(account_id = %account_id, role_name = %role_name, error = %err, "ロールの作成に失敗");
                AccessProvisionError::RoleCreation(err)
            })?;

        info!(account_id = %account_id, role_name = %role_name, "ロールを作成");
        Ok(())
    }

    async fn upsert_lister_policy(
        &self,
        account_id: &str,
        iam: &P::Iam,
    ) -> Result<(), AccessProvisionError> {
        let document = self.config.policy_template().render(account_id);

        iam.put_role_policy(
            self.config.lister_role_name(),
            self.config.lister_policy_name(),
            &document,
        )
        .await
        .map_err(|err| {
            error!(account_id = %account_id, error = %err, "ポリシーの登録に失敗");
            AccessProvisionError::PolicyUpsert(err)
        })?;

        info!(
            account_id = %account_id,
            policy_name = %self.config.lister_policy_name(),
            "ポリシーを登録"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PolicyTemplate;
    use crate::infrastructure::account_client_provider::tests::MockAccountClientProvider;
    use crate::infrastructure::iam_ops::tests::MockIamOps;
    use crate::infrastructure::resource_explorer_ops::tests::MockResourceExplorerOps;

    const ROOT: &str = "111111111111";
    const MEMBER: &str = "222222222222";

    fn test_config() -> SetupConfig {
        SetupConfig::new(
            "test-audience",
            ROOT,
            PolicyTemplate::new(r#"{"Resource":"arn:aws:iam::${account_id}:role/*"}"#),
        )
    }

    #[tokio::test]
    async fn test_provision_creates_missing_role_with_tag_and_policy() {
        let provider = MockAccountClientProvider::new(ROOT);
        let config = test_config();
        let provisioner = AccessProvisioner::new(&provider, &config);

        provisioner.provision(MEMBER).await.unwrap();

        let (iam, _) = provider.clients_for(MEMBER);
        let role = iam.role(config.lister_role_name()).unwrap();
        assert_eq!(
            role.tags,
            vec![RoleTag::new("P0Security", "Managed by Lambda")]
        );
        let trust: serde_json::Value = serde_json::from_str(&role.trust_policy).unwrap();
        assert_eq!(
            trust["Statement"][0]["Condition"]["StringEquals"]["accounts.google.com:aud"],
            "test-audience"
        );
        assert_eq!(
            role.policies.get(config.lister_policy_name()).unwrap(),
            r#"{"Resource":"arn:aws:iam::222222222222:role/*"}"#
        );
        assert_eq!(provider.assumed_accounts(), vec![MEMBER.to_string()]);
    }

    #[tokio::test]
    async fn test_provision_existing_role_still_rewrites_policy() {
        let config = test_config();
        let iam = MockIamOps::new().with_role(config.lister_role_name());
        let provider = MockAccountClientProvider::new(ROOT).with_account(
            MEMBER,
            iam.clone(),
            MockResourceExplorerOps::new(MEMBER),
        );
        let provisioner = AccessProvisioner::new(&provider, &config);

        provisioner.provision(MEMBER).await.unwrap();

        assert_eq!(iam.create_call_count(), 0);
        assert_eq!(iam.put_policy_call_count(), 1);
        let role = iam.role(config.lister_role_name()).unwrap();
        assert!(role
            .policies
            .get(config.lister_policy_name())
            .unwrap()
            .contains(MEMBER));
    }

    #[tokio::test]
    async fn test_provision_lookup_error_other_than_not_found_is_fatal() {
        let config = test_config();
        let iam = MockIamOps::new().failing("GetRole", RemoteError::other("GetRole", "AccessDenied"));
        let provider = MockAccountClientProvider::new(ROOT).with_account(
            MEMBER,
            iam.clone(),
            MockResourceExplorerOps::new(MEMBER),
        );
        let provisioner = AccessProvisioner::new(&provider, &config);

        let result = provisioner.provision(MEMBER).await;

        assert!(matches!(result, Err(AccessProvisionError::RoleLookup(_))));
        assert_eq!(iam.create_call_count(), 0);
        assert_eq!(iam.put_policy_call_count(), 0);
    }

    #[tokio::test]
    async fn test_provision_assume_failure_is_fatal() {
        let provider = MockAccountClientProvider::new(ROOT).failing_assume(MEMBER);
        let config = test_config();
        let provisioner = AccessProvisioner::new(&provider, &config);

        let result = provisioner.provision(MEMBER).await;

        assert!(matches!(result, Err(AccessProvisionError::AssumeRole(_))));
    }

    #[tokio::test]
    async fn test_provision_policy_failure_is_fatal() {
        let config = test_config();
        let iam = MockIamOps::new()
            .with_role(config.lister_role_name())
            .failing("PutRolePolicy", RemoteError::other("PutRolePolicy", "MalformedPolicyDocument"));
        let provider = MockAccountClientProvider::new(ROOT).with_account(
            MEMBER,
            iam,
            MockResourceExplorerOps::new(MEMBER),
        );
        let provisioner = AccessProvisioner::new(&provider, &config);

        let result = provisioner.provision(MEMBER).await;

        assert!(matches!(result, Err(AccessProvisionError::PolicyUpsert(_))));
    }
}
