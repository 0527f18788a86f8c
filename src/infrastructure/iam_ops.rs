//! IAM操作モジュール
//!
//! メンバーアカウント内のリソース一覧用ロールの確認・作成と、
//! インラインポリシーの登録を提供する。

use async_trait::async_trait;
use aws_sdk_iam::types::Tag;
use aws_sdk_iam::Client as IamClient;
use tracing::{info, warn};

use super::aws_error::from_sdk_error;
use crate::domain::RemoteError;

/// ロールに付与するタグ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTag {
    pub key: String,
    pub value: String,
}

impl RoleTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// IAM操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait IamOps: Send + Sync {
    /// ロールの存在を確認する
    ///
    /// # 戻り値
    /// * `Ok(())` - ロールが存在する
    /// * `Err(RemoteError)` - 存在しない場合は種別NotFound
    async fn get_role(&self, role_name: &str) -> Result<(), RemoteError>;

    /// ロールを作成する
    ///
    /// # 引数
    /// * `role_name` - ロール名
    /// * `trust_policy` - 信頼ポリシー（JSON文字列）
    /// * `tags` - ロールに付与するタグ
    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &str,
        tags: &[RoleTag],
    ) -> Result<(), RemoteError>;

    /// インラインポリシーを登録（上書き）する
    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RemoteError>;
}

/// 実際のAWS IAM SDKを使用した実装
pub struct AwsIamOps {
    client: IamClient,
}

impl AwsIamOps {
    /// 新しいAwsIamOpsを作成
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// AWS設定からクライアントを作成
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(IamClient::new(config))
    }
}

#[async_trait]
impl IamOps for AwsIamOps {
    async fn get_role(&self, role_name: &str) -> Result<(), RemoteError> {
        self.client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|err| from_sdk_error("GetRole", &err))?;

        info!(role_name = %role_name, "GetRole成功");
        Ok(())
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &str,
        tags: &[RoleTag],
    ) -> Result<(), RemoteError> {
        let mut request = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_policy);

        for tag in tags {
            let tag = Tag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
                .map_err(|err| RemoteError::other("CreateRole", err.to_string()))?;
            request = request.tags(tag);
        }

        request.send().await.map_err(|err| {
            warn!(role_name = %role_name, error = %err, "CreateRoleエラー");
            from_sdk_error("CreateRole", &err)
        })?;

        info!(role_name = %role_name, "CreateRole成功");
        Ok(())
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(policy_document)
            .send()
            .await
            .map_err(|err| {
                warn!(role_name = %role_name, error = %err, "PutRolePolicyエラー");
                from_sdk_error("PutRolePolicy", &err)
            })?;

        info!(
            role_name = %role_name,
            policy_name = %policy_name,
            "PutRolePolicy成功"
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// 作成されたロール
    #[derive(Debug, Clone)]
    pub struct MockRole {
        pub trust_policy: String,
        pub tags: Vec<RoleTag>,
        /// policy_name -> policy_document
        pub policies: HashMap<String, String>,
    }

    /// テスト用のモックIAM操作
    #[derive(Clone, Default)]
    pub struct MockIamOps {
        roles: Arc<Mutex<HashMap<String, MockRole>>>,
        /// 操作名 -> 返すエラー
        errors: Arc<Mutex<HashMap<&'static str, RemoteError>>>,
        create_call_count: Arc<Mutex<usize>>,
        put_policy_call_count: Arc<Mutex<usize>>,
    }

    impl MockIamOps {
        pub fn new() -> Self {
            Self::default()
        }

        /// 既存ロールを登録
        pub fn with_role(self, role_name: &str) -> Self {
            self.roles.lock().unwrap().insert(
                role_name.to_string(),
                MockRole {
                    trust_policy: "{}".to_string(),
                    tags: Vec::new(),
                    policies: HashMap::new(),
                },
            );
            self
        }

        /// 指定操作（GetRole/CreateRole/PutRolePolicy）でエラーを返す
        pub fn failing(self, operation: &'static str, error: RemoteError) -> Self {
            self.errors.lock().unwrap().insert(operation, error);
            self
        }

        pub fn role(&self, role_name: &str) -> Option<MockRole> {
            self.roles.lock().unwrap().get(role_name).cloned()
        }

        pub fn create_call_count(&self) -> usize {
            *self.create_call_count.lock().unwrap()
        }

        pub fn put_policy_call_count(&self) -> usize {
            *self.put_policy_call_count.lock().unwrap()
        }

        fn error_for(&self, operation: &str) -> Option<RemoteError> {
            self.errors.lock().unwrap().get(operation).cloned()
        }
    }

    #[async_trait]
    impl IamOps for MockIamOps {
        async fn get_role(&self, role_name: &str) -> Result<(), RemoteError> {
            if let Some(error) = self.error_for("GetRole") {
                return Err(error);
            }
            if self.roles.lock().unwrap().contains_key(role_name) {
                Ok(())
            } else {
                Err(RemoteError::not_found(
                    "GetRole",
                    format!("The role with name {} cannot be found.", role_name),
                ))
            }
        }

        async fn create_role(
            &self,
            role_name: &str,
            trust_policy: &str,
            tags: &[RoleTag],
        ) -> Result<(), RemoteError> {
            *self.create_call_count.lock().unwrap() += 1;
            if let Some(error) = self.error_for("CreateRole") {
                return Err(error);
            }
            self.roles.lock().unwrap().insert(
                role_name.to_string(),
                MockRole {
                    trust_policy: trust_policy.to_string(),
                    tags: tags.to_vec(),
                    policies: HashMap::new(),
                },
            );
            Ok(())
        }

        async fn put_role_policy(
            &self,
            role_name: &str,
            policy_name: &str,
            policy_document: &str,
        ) -> Result<(), RemoteError> {
            *self.put_policy_call_count.lock().unwrap() += 1;
            if let Some(error) = self.error_for("PutRolePolicy") {
                return Err(error);
            }
            let mut roles = self.roles.lock().unwrap();
            let role = roles.get_mut(role_name).ok_or_else(|| {
                RemoteError::not_found("PutRolePolicy", format!("role {} not found", role_name))
            })?;
            role.policies
                .insert(policy_name.to_string(), policy_document.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_get_role_not_found() {
        let mock = MockIamOps::new();

        let err = mock.get_role("missing").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_mock_put_policy_overwrites() {
        let mock = MockIamOps::new().with_role("lister");

        mock.put_role_policy("lister", "policy", "v1").await.unwrap();
        mock.put_role_policy("lister", "policy", "v2").await.unwrap();

        let role = mock.role("lister").unwrap();
        assert_eq!(role.policies.get("policy").unwrap(), "v2");
        assert_eq!(mock.put_policy_call_count(), 2);
    }
}
