/// リモートサービスエラーの分類
///
/// AWS SDKのエラーはインフラ層の境界で`RemoteError`に変換され、
/// アプリケーション層はメッセージ文字列ではなく`RemoteErrorKind`で分岐する。
use thiserror::Error;

/// リモートサービスエラーの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 対象リソースが存在しない（作成分岐のトリガー）
    NotFound,
    /// 対象リソースが既に存在する
    AlreadyExists,
    /// サービスクォータ超過
    QuotaExceeded,
    /// インデックスタイプ変更のクールダウン期間中
    CooldownRestricted,
    /// その他のエラー
    Other,
}

impl std::fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteErrorKind::NotFound => write!(f, "not-found"),
            RemoteErrorKind::AlreadyExists => write!(f, "already-exists"),
            RemoteErrorKind::QuotaExceeded => write!(f, "quota-exceeded"),
            RemoteErrorKind::CooldownRestricted => write!(f, "cooldown"),
            RemoteErrorKind::Other => write!(f, "other"),
        }
    }
}

/// リモートサービス呼び出しのエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} 失敗 ({kind}): {message}")]
pub struct RemoteError {
    /// 失敗したAPI操作名
    pub operation: String,
    /// エラー種別
    pub kind: RemoteErrorKind,
    /// サービスが返したメッセージ
    pub message: String,
}

impl RemoteError {
    /// 新しいRemoteErrorを作成
    pub fn new(
        operation: impl Into<String>,
        kind: RemoteErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            kind,
            message: message.into(),
        }
    }

    /// NotFound種別のエラーを作成
    pub fn not_found(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(operation, RemoteErrorKind::NotFound, message)
    }

    /// Other種別のエラーを作成
    pub fn other(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(operation, RemoteErrorKind::Other, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == RemoteErrorKind::AlreadyExists
    }

    /// クォータ超過またはクールダウン（昇格時に許容されるエラー）かどうか
    pub fn is_promotion_restricted(&self) -> bool {
        matches!(
            self.kind,
            RemoteErrorKind::QuotaExceeded | RemoteErrorKind::CooldownRestricted
        )
    }
}

/// サービスのエラーコードとメッセージからエラー種別を判定する
///
/// クールダウンはクォータ超過や検証エラーのコードで返されるため、
/// メッセージ判定をコード判定より先に行う。
pub fn classify_error(code: Option<&str>, message: Option<&str>) -> RemoteErrorKind {
    let message = message.unwrap_or_default().to_lowercase();

    if message.contains("cool down") || message.contains("cooldown") {
        return RemoteErrorKind::CooldownRestricted;
    }

    match code.unwrap_or_default() {
        "ResourceNotFoundException" | "NoSuchEntity" | "NoSuchEntityException" => {
            RemoteErrorKind::NotFound
        }
        "ConflictException" | "EntityAlreadyExists" | "EntityAlreadyExistsException" => {
            RemoteErrorKind::AlreadyExists
        }
        "ServiceQuotaExceededException" => RemoteErrorKind::QuotaExceeded,
        _ if message.contains("already exists") => RemoteErrorKind::AlreadyExists,
        _ => RemoteErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found_codes() {
        assert_eq!(
            classify_error(Some("ResourceNotFoundException"), Some("index not found")),
            RemoteErrorKind::NotFound
        );
        assert_eq!(
            classify_error(Some("NoSuchEntity"), Some("The role cannot be found")),
            RemoteErrorKind::NotFound
        );
    }

    #[test]
    fn test_classify_already_exists() {
        assert_eq!(
            classify_error(Some("ConflictException"), None),
            RemoteErrorKind::AlreadyExists
        );
        // コードが汎用でもメッセージで判定する
        assert_eq!(
            classify_error(
                Some("ValidationException"),
                Some("A view with this name already exists")
            ),
            RemoteErrorKind::AlreadyExists
        );
    }

    #[test]
    fn test_classify_cooldown_takes_precedence_over_quota() {
        assert_eq!(
            classify_error(
                Some("ServiceQuotaExceededException"),
                Some("You can't change the index type during the cool down period")
            ),
            RemoteErrorKind::CooldownRestricted
        );
        assert_eq!(
            classify_error(Some("ValidationException"), Some("Cooldown period active")),
            RemoteErrorKind::CooldownRestricted
        );
    }

    #[test]
    fn test_classify_quota_and_other() {
        assert_eq!(
            classify_error(Some("ServiceQuotaExceededException"), Some("limit reached")),
            RemoteErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_error(Some("AccessDeniedException"), Some("denied")),
            RemoteErrorKind::Other
        );
        assert_eq!(classify_error(None, None), RemoteErrorKind::Other);
    }

    #[test]
    fn test_remote_error_display() {
        let error = RemoteError::new(
            "UpdateIndexType",
            RemoteErrorKind::CooldownRestricted,
            "wait 24 hours",
        );
        assert_eq!(
            error.to_string(),
            "UpdateIndexType 失敗 (cooldown): wait 24 hours"
        );
    }

    #[test]
    fn test_remote_error_predicates() {
        assert!(RemoteError::not_found("GetIndex", "none").is_not_found());
        assert!(!RemoteError::other("GetIndex", "boom").is_not_found());
        assert!(
            RemoteError::new("UpdateIndexType", RemoteErrorKind::QuotaExceeded, "q")
                .is_promotion_restricted()
        );
        assert!(!RemoteError::other("UpdateIndexType", "x").is_promotion_restricted());
    }
}
