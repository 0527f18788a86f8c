/// インデックス構成の削除処理
///
/// 全リージョンについて、デフォルトビューの解除、ビューの削除、インデックスの削除を行う。
/// どの段階の失敗も致命的ではなく、記録して次の処理に進む。
use tracing::{debug, info, warn};

use crate::domain::{RegionSet, TeardownSummary};
use crate::infrastructure::ResourceExplorerOps;

/// インデックス構成の削除処理
pub struct TeardownReconciler<'a, E>
where
    E: ResourceExplorerOps,
{
    explorer: &'a E,
}

impl<'a, E> TeardownReconciler<'a, E>
where
    E: ResourceExplorerOps,
{
    pub fn new(explorer: &'a E) -> Self {
        Self { explorer }
    }

    /// アカウントのインデックス構成を削除する
    ///
    /// 既に存在しないリソースは黙って読み飛ばす。
    /// 途中のリージョンでエラーが発生しても全リージョンを処理する。
    pub async fn teardown(&self, account_id: &str, regions: &RegionSet) -> TeardownSummary {
        let mut summary = TeardownSummary::new(account_id, regions.regions().to_vec());

        for region in regions.regions() {
            if region == regions.home() {
                self.disassociate_default_view(account_id, region, &mut summary)
                    .await;
            }
            self.delete_views(account_id, region, &mut summary).await;
            self.delete_index(account_id, region, &mut summary).await;
        }

        info!(
            account_id = %account_id,
            deleted_view_count = summary.deleted_views.len(),
            removed_index_count = summary.removed_indexes.len(),
            error_count = summary.errors.len(),
            "インデックス構成の削除処理完了"
        );
        summary
    }

    async fn disassociate_default_view(
        &self,
        account_id: &str,
        region: &str,
        summary: &mut TeardownSummary,
    ) {
        match self.explorer.disassociate_default_view(region).await {
            Ok(()) => info!(account_id = %account_id, region = %region, "デフォルトビューを解除"),
            Err(err) if err.is_not_found() => {
                debug!(account_id = %account_id, region = %region, "デフォルトビューは未設定")
            }
            Err(err) => {
                warn!(account_id = %account_id, region = %region, error = %err, "デフォルトビューの解除に失敗");
                summary.record_error(format!("{}: {}", region, err));
            }
        }
    }

    async fn delete_views(&self, account_id: &str, region: &str, summary: &mut TeardownSummary) {
        let views = match self.explorer.list_views(region).await {
            Ok(views) => views,
            Err(err) => {
                warn!(account_id = %account_id, region = %region, error = %err, "ビュー一覧の取得に失敗");
                summary.record_error(format!("{}: {}", region, err));
                return;
            }
        };

        for view_arn in views {
            match self.explorer.delete_view(region, &view_arn).await {
                Ok(()) => {
                    info!(account_id = %account_id, region = %region, view_arn = %view_arn, "ビューを削除");
                    summary.deleted_views.push(view_arn);
                }
                Err(err) => {
                    warn!(account_id = %account_id, region = %region, view_arn = %view_arn, error = %err, "ビューの削除に失敗");
                    summary.record_error(format!("{}: {}", region, err));
                }
            }
        }
    }

    async fn delete_index(&self, account_id: &str, region: &str, summary: &mut TeardownSummary) {
        let index_arn = match self.explorer.get_index(region).await {
            Ok(status) => status.arn,
            Err(err) if err.is_not_found() => None,
            Err(err) => {
                warn!(account_id = %account_id, region = %region, error = %err, "インデックスの確認に失敗");
                summary.record_error(format!("{}: {}", region, err));
                return;
            }
        };
        let Some(index_arn) = index_arn else {
            debug!(account_id = %account_id, region = %region, "インデックスは存在しない");
            return;
        };

        match self.explorer.delete_index(region, &index_arn).await {
            Ok(()) => {
                info!(account_id = %account_id, region = %region, index_arn = %index_arn, "インデックスを削除");
                summary.removed_indexes.push(region.to_string());
            }
            Err(err) if err.is_not_found() => {
                debug!(account_id = %account_id, region = %region, "インデックスは既に削除済み")
            }
            Err(err) => {
                warn!(account_id = %account_id, region = %region, error = %err, "インデックスの削除に失敗");
                summary.record_error(format!("{}: {}", region, err));
            }
        }
    }
}
