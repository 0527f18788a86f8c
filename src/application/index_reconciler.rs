/// インデックス構成の収束処理
///
/// 1アカウントについて、処理対象の全リージョンにインデックスを配置し、
/// アグリゲーターを1つに定め、アグリゲーターのリージョンにデフォルトビューを設定する。
///
/// # 処理フロー
/// 1. 既存アグリゲーターの探索（最初に見つかったものを採用）
/// 2. ホームリージョンのインデックス確保
/// 3. アグリゲーターへの昇格（既存アグリゲーターがない場合のみ）
/// 4. デフォルトビューの確保
/// 5. 残りのリージョンのインデックス確保（リージョン単位の失敗は継続）
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::{
    view_arn_has_name, DefaultViewInfo, DefaultViewStatus, IndexState, IndexType, RegionSet,
    RemoteError, RunSummary, DEFAULT_VIEW_FILTER, DEFAULT_VIEW_NAME,
};
use crate::infrastructure::ResourceExplorerOps;

/// 収束処理のオプション
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// アグリゲーターへの昇格を行わない
    pub skip_aggregator: bool,
    /// デフォルトビューの設定を行わない
    pub skip_default_view: bool,
}

/// アカウントの処理を中断する致命的エラー
#[derive(Debug, Error)]
pub enum IndexReconcileError {
    #[error("ホームリージョン {region} のインデックス確保に失敗しました: {source}")]
    HomeIndex {
        region: String,
        #[source]
        source: RemoteError,
    },

    #[error("{region} のアグリゲーター昇格に失敗しました: {source}")]
    Promotion {
        region: String,
        #[source]
        source: RemoteError,
    },

    #[error("{region} のデフォルトビュー設定に失敗しました: {source}")]
    DefaultView {
        region: String,
        #[source]
        source: RemoteError,
    },
}

/// 1リージョンのインデックス確保結果
#[derive(Debug, Clone, PartialEq, Eq)]
enum IndexPresence {
    /// インデックスが存在する（作成中を含む）
    Deployed { arn: Option<String> },
    /// 削除中などで作成できない
    Unavailable { reason: String },
}

/// インデックス構成の収束処理
pub struct IndexTopologyReconciler<'a, E>
where
    E: ResourceExplorerOps,
{
    explorer: &'a E,
    options: ReconcileOptions,
}

impl<'a, E> IndexTopologyReconciler<'a, E>
where
    E: ResourceExplorerOps,
{
    pub fn new(explorer: &'a E, options: ReconcileOptions) -> Self {
        Self { explorer, options }
    }

    /// アカウントのインデックス構成を目標状態に収束させる
    ///
    /// # 戻り値
    /// * 成功時は継続可能なエラーを含む`RunSummary`
    /// * ホームリージョンのインデックス確保、昇格、デフォルトビュー設定の
    ///   想定外エラーは`Err(IndexReconcileError)`
    pub async fn reconcile(
        &self,
        account_id: &str,
        regions: &RegionSet,
    ) -> Result<RunSummary, IndexReconcileError> {
        let mut summary = RunSummary::new(account_id, regions.regions().to_vec());
        let home = regions.home();

        let existing_aggregator = self.find_aggregator(account_id, regions, &mut summary).await;

        let home_presence = self.ensure_home_index(account_id, home, &mut summary).await?;

        let aggregator = match (existing_aggregator, home_presence) {
            (Some(region), _) => {
                info!(account_id = %account_id, region = %region, "既存のアグリゲーターを使用");
                Some(region)
            }
            (None, _) if self.options.skip_aggregator => {
                info!(account_id = %account_id, "アグリゲーター昇格をスキップ");
                None
            }
            (None, IndexPresence::Unavailable { .. }) => {
                info!(account_id = %account_id, region = %home, "ホームリージョンのインデックスが利用できないため昇格しない");
                None
            }
            (None, IndexPresence::Deployed { arn }) => {
                self.promote_home_index(account_id, home, arn, &mut summary)
                    .await?
            }
        };
        summary.aggregator_region = aggregator.clone();

        match (&aggregator, self.options.skip_default_view) {
            (_, true) => info!(account_id = %account_id, "デフォルトビュー設定をスキップ"),
            (None, false) => {
                info!(account_id = %account_id, "アグリゲーターが未確定のためデフォルトビューを設定しない")
            }
            (Some(region), false) => {
                summary.default_view = Some(self.ensure_default_view(account_id, region).await?);
            }
        }

        for region in regions.others() {
            match self.ensure_index(region).await {
                Ok(IndexPresence::Deployed { .. }) => summary.record_deployed(region),
                Ok(IndexPresence::Unavailable { reason }) => {
                    warn!(account_id = %account_id, region = %region, reason = %reason, "インデックスを配置できない状態");
                    summary.record_error(format!("{}: {}", region, reason));
                }
                Err(err) => {
                    warn!(account_id = %account_id, region = %region, error = %err, "インデックス確保に失敗");
                    summary.record_error(format!("{}: {}", region, err));
                }
            }
        }

        info!(
            account_id = %account_id,
            deployed_count = summary.deployed_indexes.len(),
            aggregator_region = ?summary.aggregator_region,
            error_count = summary.errors.len(),
            "インデックス構成の収束処理完了"
        );
        Ok(summary)
    }

    /// 既存アグリゲーターをリージョン順に探索する（最初に見つかったものを採用）
    async fn find_aggregator(
        &self,
        account_id: &str,
        regions: &RegionSet,
        summary: &mut RunSummary,
    ) -> Option<String> {
        for region in regions.regions() {
            match self.explorer.list_indexes(region).await {
                Ok(indexes) => {
                    if let Some(aggregator) = indexes.iter().find(|index| index.is_aggregator()) {
                        return Some(aggregator.region.clone());
                    }
                }
                Err(err) => {
                    warn!(account_id = %account_id, region = %region, error = %err, "インデックス一覧の取得に失敗");
                    summary.record_error(format!("{}: {}", region, err));
                }
            }
        }
        None
    }

    /// ホームリージョンのインデックスを確保する
    ///
    /// 削除中などで配置できない場合は継続可能なエラーとして記録し、
    /// `IndexPresence::Unavailable`を返す。
    async fn ensure_home_index(
        &self,
        account_id: &str,
        home: &str,
        summary: &mut RunSummary,
    ) -> Result<IndexPresence, IndexReconcileError> {
        match self.ensure_index(home).await {
            Ok(IndexPresence::Deployed { arn }) => {
                summary.record_deployed(home);
                Ok(IndexPresence::Deployed { arn })
            }
            Ok(IndexPresence::Unavailable { reason }) => {
                warn!(account_id = %account_id, region = %home, reason = %reason, "ホームリージョンのインデックスを配置できない状態");
                summary.record_error(format!("{}: {}", home, reason));
                Ok(IndexPresence::Unavailable { reason })
            }
            Err(source) => {
                error!(account_id = %account_id, region = %home, error = %source, "ホームリージョンのインデックス確保に失敗");
                Err(IndexReconcileError::HomeIndex {
                    region: home.to_string(),
                    source,
                })
            }
        }
    }

    /// ホームリージョンのインデックスをアグリゲーターに昇格する
    ///
    /// クォータ超過とクールダウン中は継続可能なエラーとして記録し、Noneを返す。
    async fn promote_home_index(
        &self,
        account_id: &str,
        home: &str,
        home_arn: Option<String>,
        summary: &mut RunSummary,
    ) -> Result<Option<String>, IndexReconcileError> {
        let promotion_error = |source: RemoteError| IndexReconcileError::Promotion {
            region: home.to_string(),
            source,
        };

        let indexes = self
            .explorer
            .list_indexes(home)
            .await
            .map_err(promotion_error)?;

        if let Some(aggregator) = indexes.iter().find(|index| index.is_aggregator()) {
            info!(account_id = %account_id, region = %aggregator.region, "アグリゲーターは既に存在");
            return Ok(Some(aggregator.region.clone()));
        }

        let target_arn = indexes
            .iter()
            .find(|index| index.region == home)
            .map(|index| index.arn.clone())
            .or(home_arn);
        let Some(target_arn) = target_arn else {
            warn!(account_id = %account_id, region = %home, "昇格対象のインデックスが見つからない");
            return Ok(None);
        };

        info!(account_id = %account_id, region = %home, index_arn = %target_arn, "アグリゲーターへ昇格");
        match self
            .explorer
            .update_index_type(home, &target_arn, IndexType::Aggregator)
            .await
        {
            Ok(()) => {
                info!(account_id = %account_id, region = %home, "アグリゲーター昇格成功");
                Ok(Some(home.to_string()))
            }
            Err(err) if err.is_promotion_restricted() => {
                warn!(account_id = %account_id, region = %home, error = %err, "アグリゲーター昇格を見送り");
                summary.record_error(format!("{}: {}", home, err));
                Ok(None)
            }
            Err(err) => {
                error!(account_id = %account_id, region = %home, error = %err, "アグリゲーター昇格に失敗");
                Err(promotion_error(err))
            }
        }
    }

    /// アグリゲーターのリージョンにデフォルトビューを作成して関連付ける
    async fn ensure_default_view(
        &self,
        account_id: &str,
        region: &str,
    ) -> Result<DefaultViewInfo, IndexReconcileError> {
        let view_error = |source: RemoteError| IndexReconcileError::DefaultView {
            region: region.to_string(),
            source,
        };

        let view_arn = match self
            .explorer
            .create_view(region, DEFAULT_VIEW_NAME, DEFAULT_VIEW_FILTER)
            .await
        {
            Ok(view_arn) => view_arn,
            Err(err) if err.is_already_exists() => {
                info!(account_id = %account_id, region = %region, "デフォルトビューは既に存在");
                let view_arn = self.find_default_view_arn(account_id, region).await;
                if let Some(view_arn) = &view_arn {
                    self.reassociate_default_view(account_id, region, view_arn)
                        .await
                        .map_err(view_error)?;
                }
                return Ok(DefaultViewInfo {
                    region: region.to_string(),
                    view_arn,
                    status: DefaultViewStatus::AlreadyExists,
                });
            }
            Err(err) => {
                error!(account_id = %account_id, region = %region, error = %err, "ビュー作成に失敗");
                return Err(view_error(err));
            }
        };

        let status = match self.explorer.associate_default_view(region, &view_arn).await {
            Ok(()) => DefaultViewStatus::Created,
            Err(err) if err.is_already_exists() => DefaultViewStatus::AlreadyExists,
            Err(err) => {
                error!(account_id = %account_id, region = %region, view_arn = %view_arn, error = %err, "デフォルトビューの関連付けに失敗");
                return Err(view_error(err));
            }
        };

        info!(account_id = %account_id, region = %region, view_arn = %view_arn, "デフォルトビューを設定");
        Ok(DefaultViewInfo {
            region: region.to_string(),
            view_arn: Some(view_arn),
            status,
        })
    }

    /// 既存のデフォルトビューのARNをビュー一覧から探す（失敗時はNone）
    /// 既存のビューをデフォルトビューとして関連付け直す
    ///
    /// 既に関連付け済みの応答は成功として扱う。
    async fn reassociate_default_view(
        &self,
        account_id: &str,
        region: &str,
        view_arn: &str,
    ) -> Result<(), RemoteError> {
        match self.explorer.associate_default_view(region, view_arn).await {
            Ok(()) => {
                info!(account_id = %account_id, region = %region, view_arn = %view_arn, "既存のビューをデフォルトビューに関連付け");
                Ok(())
            }
            Err(err) if err.is_already_exists() => Ok(()),
            Err(err) => {
                error!(account_id = %account_id, region = %region, view_arn = %view_arn, error = %err, "デフォルトビューの関連付けに失敗");
                Err(err)
            }
        }
    }

    async fn find_default_view_arn(&self, account_id: &str, region: &str) -> Option<String> {
        match self.explorer.list_views(region).await {
            Ok(views) => views
                .into_iter()
                .find(|arn| view_arn_has_name(arn, DEFAULT_VIEW_NAME)),
            Err(err) => {
                warn!(account_id = %account_id, region = %region, error = %err, "ビュー一覧の取得に失敗");
                None
            }
        }
    }

    /// 1リージョンのインデックスを確保する
    ///
    /// 作成中・更新中は待たずに配置済みとみなす。
    async fn ensure_index(&self, region: &str) -> Result<IndexPresence, RemoteError> {
        match self.explorer.get_index(region).await {
            Ok(status) => match status.state {
                IndexState::Active => Ok(IndexPresence::Deployed { arn: status.arn }),
                state if state.is_pending() => {
                    info!(region = %region, state = %state, "インデックスは準備中");
                    Ok(IndexPresence::Deployed { arn: status.arn })
                }
                IndexState::Deleted => self.create_index(region).await,
                state => Ok(IndexPresence::Unavailable {
                    reason: format!("インデックスの状態が {} のため作成できません", state),
                }),
            },
            Err(err) if err.is_not_found() => self.create_index(region).await,
            Err(err) => Err(err),
        }
    }

    async fn create_index(&self, region: &str) -> Result<IndexPresence, RemoteError> {
        match self.explorer.create_index(region).await {
            Ok(arn) => {
                info!(region = %region, index_arn = ?arn, "インデックスを作成");
                Ok(IndexPresence::Deployed { arn })
            }
            Err(err) if err.is_already_exists() => {
                info!(region = %region, "インデックスは既に存在");
                Ok(IndexPresence::Deployed { arn: None })
            }
            Err(err) => Err(err),
        }
    }
}
