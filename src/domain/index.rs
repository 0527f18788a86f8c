//! Resource Explorerのインデックスとビュー

/// デフォルトビューとして作成するビュー名
pub const DEFAULT_VIEW_NAME: &str = "all-resources-p0";

/// デフォルトビューのフィルター（空文字列は全リソースに一致）
pub const DEFAULT_VIEW_FILTER: &str = "";

/// インデックスの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    /// 作成中
    Creating,
    /// 稼働中
    Active,
    /// タイプ変更中
    Updating,
    /// 削除中
    Deleting,
    /// 削除済み
    Deleted,
    /// 不明
    Other(String),
}

impl IndexState {
    /// まだACTIVEではないが、いずれACTIVEになる状態かどうか
    pub fn is_pending(&self) -> bool {
        matches!(self, IndexState::Creating | IndexState::Updating)
    }
}

impl From<&str> for IndexState {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CREATING" => IndexState::Creating,
            "ACTIVE" => IndexState::Active,
            "UPDATING" => IndexState::Updating,
            "DELETING" => IndexState::Deleting,
            "DELETED" => IndexState::Deleted,
            _ => IndexState::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexState::Creating => write!(f, "CREATING"),
            IndexState::Active => write!(f, "ACTIVE"),
            IndexState::Updating => write!(f, "UPDATING"),
            IndexState::Deleting => write!(f, "DELETING"),
            IndexState::Deleted => write!(f, "DELETED"),
            IndexState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// インデックスのタイプ
///
/// サービス上の表記は`LOCAL`（リージョナル）と`AGGREGATOR`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexType {
    /// リージョナルインデックス
    Regional,
    /// アグリゲーターインデックス
    Aggregator,
    /// 不明
    Other(String),
}

impl From<&str> for IndexType {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOCAL" => IndexType::Regional,
            "AGGREGATOR" => IndexType::Aggregator,
            _ => IndexType::Other(s.to_string()),
        }
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexType::Regional => write!(f, "LOCAL"),
            IndexType::Aggregator => write!(f, "AGGREGATOR"),
            IndexType::Other(s) => write!(f, "{}", s),
        }
    }
}

/// 単一リージョンのインデックス状態（GetIndexの結果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    /// インデックスARN
    pub arn: Option<String>,
    /// 状態
    pub state: IndexState,
    /// タイプ
    pub index_type: IndexType,
}

/// アカウント全体のインデックス一覧の1エントリ（ListIndexesの結果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    /// インデックスが存在するリージョン
    pub region: String,
    /// インデックスARN
    pub arn: String,
    /// タイプ
    pub index_type: IndexType,
}

impl IndexSummary {
    pub fn is_aggregator(&self) -> bool {
        self.index_type == IndexType::Aggregator
    }
}

/// ビューARNが指定名のビューを指しているかどうか
///
/// ビューARNは`arn:aws:resource-explorer-2:<region>:<account>:view/<name>/<uuid>`の形式。
pub fn view_arn_has_name(view_arn: &str, view_name: &str) -> bool {
    view_arn
        .split_once(":view/")
        .and_then(|(_, rest)| rest.split('/').next())
        .is_some_and(|name| name == view_name)
}
