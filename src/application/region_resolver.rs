/// リージョン解決
///
/// リージョンカタログから処理対象のリージョン集合を求める。
use tracing::{error, info};

use crate::domain::{RegionSet, RemoteError};
use crate::infrastructure::RegionCatalogOps;

/// リージョン解決
pub struct RegionResolver<'a, C>
where
    C: RegionCatalogOps,
{
    catalog: &'a C,
}

impl<'a, C> RegionResolver<'a, C>
where
    C: RegionCatalogOps,
{
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// 処理対象のリージョン集合を取得する
    ///
    /// 有効なリージョンにアグリゲーターのホームリージョンを加えた集合を返す。
    /// カタログ取得の失敗はそのまま返す（信頼できる集合を作れないため）。
    pub async fn resolve(&self) -> Result<RegionSet, RemoteError> {
        let catalog = self.catalog.list_regions().await.map_err(|err| {
            error!(error = %err, "リージョンカタログの取得に失敗");
            err
        })?;

        let region_set = RegionSet::resolve(&catalog);
        info!(
            regions = ?region_set.regions(),
            home_region = %region_set.home(),
            "リージョン解決完了"
        );
        Ok(region_set)
    }
}
