//! リージョンとリージョン集合の解決
//!
//! アカウントのリージョンカタログから処理対象のリージョン集合を決定する。
//! アグリゲーターの配置先リージョンは有効化状態に関わらず常に含まれる。

/// アグリゲーターインデックスを配置するリージョン
pub const AGGREGATOR_HOME_REGION: &str = "us-west-2";

/// リージョンのオプトイン状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOptStatus {
    /// 有効
    Enabled,
    /// 有効化中
    Enabling,
    /// デフォルトで有効
    EnabledByDefault,
    /// 無効化中
    Disabling,
    /// 無効
    Disabled,
    /// 不明
    Other(String),
}

impl RegionOptStatus {
    /// インデックスを配置できる状態かどうか
    pub fn is_usable(&self) -> bool {
        matches!(
            self,
            RegionOptStatus::Enabled | RegionOptStatus::Enabling | RegionOptStatus::EnabledByDefault
        )
    }
}

impl From<&str> for RegionOptStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ENABLED" => RegionOptStatus::Enabled,
            "ENABLING" => RegionOptStatus::Enabling,
            "ENABLED_BY_DEFAULT" => RegionOptStatus::EnabledByDefault,
            "DISABLING" => RegionOptStatus::Disabling,
            "DISABLED" => RegionOptStatus::Disabled,
            _ => RegionOptStatus::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for RegionOptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionOptStatus::Enabled => write!(f, "ENABLED"),
            RegionOptStatus::Enabling => write!(f, "ENABLING"),
            RegionOptStatus::EnabledByDefault => write!(f, "ENABLED_BY_DEFAULT"),
            RegionOptStatus::Disabling => write!(f, "DISABLING"),
            RegionOptStatus::Disabled => write!(f, "DISABLED"),
            RegionOptStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// リージョンカタログの1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    /// リージョン名（例: us-west-2）
    pub name: String,
    /// オプトイン状態
    pub opt_status: RegionOptStatus,
}

impl RegionInfo {
    pub fn new(name: impl Into<String>, opt_status: RegionOptStatus) -> Self {
        Self {
            name: name.into(),
            opt_status,
        }
    }
}

/// 処理対象のリージョン集合
///
/// 空にならず、常にアグリゲーター配置先リージョンを含む。
/// 順序はカタログの順序を保持し、配置先リージョンが欠けていた場合は末尾に追加される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<String>,
    home: String,
}

impl RegionSet {
    /// リージョンカタログから処理対象のリージョン集合を解決する
    pub fn resolve(catalog: &[RegionInfo]) -> Self {
        Self::resolve_with_home(catalog, AGGREGATOR_HOME_REGION)
    }

    /// 配置先リージョンを指定してリージョン集合を解決する
    pub fn resolve_with_home(catalog: &[RegionInfo], home: &str) -> Self {
        let mut regions: Vec<String> = Vec::new();
        for region in catalog.iter().filter(|r| r.opt_status.is_usable()) {
            if !region.name.is_empty() && !regions.contains(&region.name) {
                regions.push(region.name.clone());
            }
        }

        if !regions.iter().any(|r| r == home) {
            regions.push(home.to_string());
        }

        Self {
            regions,
            home: home.to_string(),
        }
    }

    /// 全リージョン（配置先リージョンを含む）
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// アグリゲーター配置先リージョン
    pub fn home(&self) -> &str {
        &self.home
    }

    /// 配置先リージョン以外のリージョン
    pub fn others(&self) -> impl Iterator<Item = &str> {
        self.regions
            .iter()
            .map(String::as_str)
            .filter(move |r| *r != self.home)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
