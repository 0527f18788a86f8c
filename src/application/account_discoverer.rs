/// アカウント探索
///
/// 組織のメンバーアカウントを全ページ取得し、
/// ACTIVEかつ管理アカウント以外のアカウントIDを返す。
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{Account, RemoteError};
use crate::infrastructure::OrganizationsOps;

/// アカウント探索のエラー型
#[derive(Debug, Error)]
pub enum AccountDiscoveryError {
    /// ページ取得に失敗（部分的な一覧は使用しない）
    #[error("アカウント一覧の取得に失敗しました (ページ{page}): {source}")]
    ListAccounts {
        page: usize,
        #[source]
        source: RemoteError,
    },
}

/// アカウント探索
pub struct AccountDiscoverer<'a, O>
where
    O: OrganizationsOps,
{
    organizations: &'a O,
    root_account_id: &'a str,
}

impl<'a, O> AccountDiscoverer<'a, O>
where
    O: OrganizationsOps,
{
    /// 新しいAccountDiscovererを作成
    ///
    /// # 引数
    /// * `organizations` - Organizations操作
    /// * `root_account_id` - 除外する管理アカウントID
    pub fn new(organizations: &'a O, root_account_id: &'a str) -> Self {
        Self {
            organizations,
            root_account_id,
        }
    }

    /// 管理対象のアカウントIDを取得する
    ///
    /// 継続トークンがなくなるまでページを取得する。
    /// いずれかのページ取得に失敗した場合は探索全体を中断する。
    pub async fn discover(&self) -> Result<Vec<String>, AccountDiscoveryError> {
        let mut account_ids = Vec::new();
        let mut next_token: Option<String> = None;
        let mut page = 0;

        loop {
            page += 1;
            let response = self
                .organizations
                .list_accounts_page(next_token.as_deref())
                .await
                .map_err(|source| {
                    error!(page = page, error = %source, "アカウント一覧の取得に失敗");
                    AccountDiscoveryError::ListAccounts { page, source }
                })?;

            account_ids.extend(
                response
                    .accounts
                    .into_iter()
                    .map(|record| Account::new(record.id, record.status, self.root_account_id))
                    .filter(Account::is_manageable)
                    .map(|account| account.id),
            );

            match response.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        info!(
            account_count = account_ids.len(),
            page_count = page,
            "アカウント探索完了"
        );
        Ok(account_ids)
    }
}
