//! リージョンカタログ操作モジュール
//!
//! Account APIのListRegionsでアカウントのリージョンとオプトイン状態を取得する。

use async_trait::async_trait;
use aws_sdk_account::Client as AccountClient;
use tracing::{debug, info, warn};

use super::aws_error::from_sdk_error;
use crate::domain::{RegionInfo, RegionOptStatus, RemoteError};

/// リージョンカタログ操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait RegionCatalogOps: Send + Sync {
    /// 全リージョンとオプトイン状態を取得する（ページングは実装側で処理）
    async fn list_regions(&self) -> Result<Vec<RegionInfo>, RemoteError>;
}

/// 実際のAWS Account SDKを使用した実装
pub struct AwsRegionCatalogOps {
    client: AccountClient,
}

impl AwsRegionCatalogOps {
    /// 新しいAwsRegionCatalogOpsを作成
    pub fn new(client: AccountClient) -> Self {
        Self { client }
    }

    /// AWS設定からクライアントを作成
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(AccountClient::new(config))
    }
}

#[async_trait]
impl RegionCatalogOps for AwsRegionCatalogOps {
    async fn list_regions(&self) -> Result<Vec<RegionInfo>, RemoteError> {
        let mut regions = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_regions()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| {
                    warn!(error = %err, "ListRegionsエラー");
                    from_sdk_error("ListRegions", &err)
                })?;

            for region in response.regions() {
                let Some(name) = region.region_name() else {
                    continue;
                };
                let opt_status = region
                    .region_opt_status()
                    .map(|s| RegionOptStatus::from(s.as_str()))
                    .unwrap_or_else(|| RegionOptStatus::Other("unknown".to_string()));

                debug!(region = name, opt_status = %opt_status, "リージョン取得");
                regions.push(RegionInfo::new(name, opt_status));
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        info!(region_count = regions.len(), "ListRegions成功");
        Ok(regions)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// テスト用のモックリージョンカタログ
    #[derive(Clone, Default)]
    pub struct MockRegionCatalogOps {
        regions: Arc<Mutex<Vec<RegionInfo>>>,
        error: Arc<Mutex<Option<RemoteError>>>,
    }

    impl MockRegionCatalogOps {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_region(self, name: &str, status: RegionOptStatus) -> Self {
            self.regions
                .lock()
                .unwrap()
                .push(RegionInfo::new(name, status));
            self
        }

        /// 全リージョンをENABLEDで登録
        pub fn with_enabled(self, names: &[&str]) -> Self {
            names
                .iter()
                .fold(self, |mock, name| mock.with_region(name, RegionOptStatus::Enabled))
        }

        pub fn failing(self, error: RemoteError) -> Self {
            *self.error.lock().unwrap() = Some(error);
            self
        }
    }

    #[async_trait]
    impl RegionCatalogOps for MockRegionCatalogOps {
        async fn list_regions(&self) -> Result<Vec<RegionInfo>, RemoteError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(error);
            }
            Ok(self.regions.lock().unwrap().clone())
        }
    }
}
