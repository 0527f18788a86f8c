//! 組織のメンバーアカウント
//!
//! Organizationsから取得した読み取り専用の事実で、1回の実行中は変化しない。

/// アカウントの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    /// 稼働中
    Active,
    /// 停止中
    Suspended,
    /// 閉鎖処理中
    PendingClosure,
    /// 不明
    Other(String),
}

impl From<&str> for AccountStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ACTIVE" => AccountStatus::Active,
            "SUSPENDED" => AccountStatus::Suspended,
            "PENDING_CLOSURE" => AccountStatus::PendingClosure,
            _ => AccountStatus::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "ACTIVE"),
            AccountStatus::Suspended => write!(f, "SUSPENDED"),
            AccountStatus::PendingClosure => write!(f, "PENDING_CLOSURE"),
            AccountStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// メンバーアカウント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// アカウントID
    pub id: String,
    /// アカウントの状態
    pub status: AccountStatus,
    /// 管理（ルート）アカウントかどうか
    pub is_root: bool,
}

impl Account {
    /// ルートアカウントIDと比較してAccountを作成
    pub fn new(id: impl Into<String>, status: AccountStatus, root_account_id: &str) -> Self {
        let id = id.into();
        let is_root = id == root_account_id;
        Self {
            id,
            status,
            is_root,
        }
    }

    /// 管理対象（ACTIVEかつルート以外）かどうか
    pub fn is_manageable(&self) -> bool {
        self.status == AccountStatus::Active && !self.is_root
    }
}
