//! Resource Explorer操作モジュール
//!
//! アカウント内の各リージョンに対するインデックス・ビュー操作を提供する。
//! - インデックスの取得・作成・一覧・タイプ変更・削除
//! - ビューの作成・一覧・削除
//! - デフォルトビューの関連付け・解除
//!
//! Resource Explorerのクライアントはリージョン単位のため、全操作が対象リージョンを受け取る。

use async_trait::async_trait;
use aws_sdk_resourceexplorer2::config::Region;
use aws_sdk_resourceexplorer2::types::{IndexType as SdkIndexType, SearchFilter};
use aws_sdk_resourceexplorer2::Client as ResourceExplorerClient;
use tracing::{debug, info, warn};

use super::aws_error::from_sdk_error;
use crate::domain::{IndexState, IndexStatus, IndexSummary, IndexType, RemoteError};

/// Resource Explorer操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ResourceExplorerOps: Send + Sync {
    /// リージョンのインデックス状態を取得する（存在しない場合は種別NotFound）
    async fn get_index(&self, region: &str) -> Result<IndexStatus, RemoteError>;

    /// リージョンにインデックスを作成し、ARNを返す
    async fn create_index(&self, region: &str) -> Result<Option<String>, RemoteError>;

    /// アカウント全体のインデックス一覧を取得する
    ///
    /// # 引数
    /// * `region` - 呼び出し先のリージョン
    async fn list_indexes(&self, region: &str) -> Result<Vec<IndexSummary>, RemoteError>;

    /// インデックスのタイプを変更する
    async fn update_index_type(
        &self,
        region: &str,
        index_arn: &str,
        index_type: IndexType,
    ) -> Result<(), RemoteError>;

    /// ビューを作成し、ビューARNを返す
    async fn create_view(
        &self,
        region: &str,
        view_name: &str,
        filter: &str,
    ) -> Result<String, RemoteError>;

    /// リージョンのビューARN一覧を取得する
    async fn list_views(&self, region: &str) -> Result<Vec<String>, RemoteError>;

    /// ビューを削除する
    async fn delete_view(&self, region: &str, view_arn: &str) -> Result<(), RemoteError>;

    /// ビューをアカウントのデフォルトビューに設定する
    async fn associate_default_view(&self, region: &str, view_arn: &str)
        -> Result<(), RemoteError>;

    /// アカウントのデフォルトビュー設定を解除する
    async fn disassociate_default_view(&self, region: &str) -> Result<(), RemoteError>;

    /// インデックスを削除する
    async fn delete_index(&self, region: &str, index_arn: &str) -> Result<(), RemoteError>;
}

/// 実際のAWS Resource Explorer SDKを使用した実装
pub struct AwsResourceExplorerOps {
    sdk_config: aws_config::SdkConfig,
}

impl AwsResourceExplorerOps {
    /// 認証情報を含むAWS設定から作成
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
        }
    }

    /// 指定リージョン向けのクライアントを作成
    fn client(&self, region: &str) -> ResourceExplorerClient {
        let config = aws_sdk_resourceexplorer2::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        ResourceExplorerClient::from_conf(config)
    }
}

#[async_trait]
impl ResourceExplorerOps for AwsResourceExplorerOps {
    async fn get_index(&self, region: &str) -> Result<IndexStatus, RemoteError> {
        let response = self
            .client(region)
            .get_index()
            .send()
            .await
            .map_err(|err| from_sdk_error("GetIndex", &err))?;

        let status = IndexStatus {
            arn: response.arn().map(str::to_string),
            state: response
                .state()
                .map(|s| IndexState::from(s.as_str()))
                .unwrap_or_else(|| IndexState::Other("unknown".to_string())),
            index_type: response
                .r#type()
                .map(|t| IndexType::from(t.as_str()))
                .unwrap_or_else(|| IndexType::Other("unknown".to_string())),
        };

        debug!(
            region = %region,
            state = %status.state,
            index_type = %status.index_type,
            "GetIndex成功"
        );
        Ok(status)
    }

    async fn create_index(&self, region: &str) -> Result<Option<String>, RemoteError> {
        let response = self
            .client(region)
            .create_index()
            .send()
            .await
            .map_err(|err| {
                warn!(region = %region, error = %err, "CreateIndexエラー");
                from_sdk_error("CreateIndex", &err)
            })?;

        info!(region = %region, index_arn = ?response.arn(), "CreateIndex成功");
        Ok(response.arn().map(str::to_string))
    }

    async fn list_indexes(&self, region: &str) -> Result<Vec<IndexSummary>, RemoteError> {
        let client = self.client(region);
        let mut indexes = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = client
                .list_indexes()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| from_sdk_error("ListIndexes", &err))?;

            for index in response.indexes() {
                let Some(arn) = index.arn() else {
                    continue;
                };
                indexes.push(IndexSummary {
                    region: index.region().unwrap_or(region).to_string(),
                    arn: arn.to_string(),
                    index_type: index
                        .r#type()
                        .map(|t| IndexType::from(t.as_str()))
                        .unwrap_or_else(|| IndexType::Other("unknown".to_string())),
                });
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(region = %region, index_count = indexes.len(), "ListIndexes成功");
        Ok(indexes)
    }

    async fn update_index_type(
        &self,
        region: &str,
        index_arn: &str,
        index_type: IndexType,
    ) -> Result<(), RemoteError> {
        let sdk_type = SdkIndexType::from(index_type.to_string().as_str());

        self.client(region)
            .update_index_type()
            .arn(index_arn)
            .r#type(sdk_type)
            .send()
            .await
            .map_err(|err| {
                warn!(region = %region, index_arn = %index_arn, error = %err, "UpdateIndexTypeエラー");
                from_sdk_error("UpdateIndexType", &err)
            })?;

        info!(
            region = %region,
            index_arn = %index_arn,
            index_type = %index_type,
            "UpdateIndexType成功"
        );
        Ok(())
    }

    async fn create_view(
        &self,
        region: &str,
        view_name: &str,
        filter: &str,
    ) -> Result<String, RemoteError> {
        let filters = SearchFilter::builder()
            .filter_string(filter)
            .build()
            .map_err(|err| RemoteError::other("CreateView", err.to_string()))?;

        let response = self
            .client(region)
            .create_view()
            .view_name(view_name)
            .filters(filters)
            .send()
            .await
            .map_err(|err| from_sdk_error("CreateView", &err))?;

        let view_arn = response
            .view()
            .and_then(|view| view.view_arn())
            .ok_or_else(|| RemoteError::other("CreateView", "応答にビューARNが含まれていません"))?;

        info!(region = %region, view_arn = %view_arn, "CreateView成功");
        Ok(view_arn.to_string())
    }

    async fn list_views(&self, region: &str) -> Result<Vec<String>, RemoteError> {
        let client = self.client(region);
        let mut views = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = client
                .list_views()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| from_sdk_error("ListViews", &err))?;

            views.extend(response.views().iter().cloned());

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(region = %region, view_count = views.len(), "ListViews成功");
        Ok(views)
    }

    async fn delete_view(&self, region: &str, view_arn: &str) -> Result<(), RemoteError> {
        self.client(region)
            .delete_view()
            .view_arn(view_arn)
            .send()
            .await
            .map_err(|err| from_sdk_error("DeleteView", &err))?;

        info!(region = %region, view_arn = %view_arn, "DeleteView成功");
        Ok(())
    }

    async fn associate_default_view(
        &self,
        region: &str,
        view_arn: &str,
    ) -> Result<(), RemoteError> {
        self.client(region)
            .associate_default_view()
            .view_arn(view_arn)
            .send()
            .await
            .map_err(|err| from_sdk_error("AssociateDefaultView", &err))?;

        info!(region = %region, view_arn = %view_arn, "AssociateDefaultView成功");
        Ok(())
    }

    async fn disassociate_default_view(&self, region: &str) -> Result<(), RemoteError> {
        self.client(region)
            .disassociate_default_view()
            .send()
            .await
            .map_err(|err| from_sdk_error("DisassociateDefaultView", &err))?;

        info!(region = %region, "DisassociateDefaultView成功");
        Ok(())
    }

    async fn delete_index(&self, region: &str, index_arn: &str) -> Result<(), RemoteError> {
        self.client(region)
            .delete_index()
            .arn(index_arn)
            .send()
            .await
            .map_err(|err| from_sdk_error("DeleteIndex", &err))?;

        info!(region = %region, index_arn = %index_arn, "DeleteIndex成功");
        Ok(())
    }
}
