//! AWS SDKエラーの変換
//!
//! SDKのエラーメタデータ（エラーコードとメッセージ）から`RemoteError`を生成する。
//! エラー種別の判定はここでのみ行う。

use aws_sdk_resourceexplorer2::error::{DisplayErrorContext, ProvideErrorMetadata};

use crate::domain::{classify_error, RemoteError};

/// SDKエラーをRemoteErrorに変換する
///
/// # 引数
/// * `operation` - 失敗したAPI操作名（例: GetIndex）
/// * `err` - SDKエラー
pub(crate) fn from_sdk_error<E>(operation: &str, err: &E) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let kind = classify_error(err.code(), err.message());
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());

    RemoteError::new(operation, kind, message)
}
