//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that classifies every per-request failure
//! the admission server can report on the wire.

/// エラー種別の列挙体
///
/// ワイヤープロトコル上で返すエラーの分類を定義します。
/// 接続ループはどの種別でも接続を維持し、`error` フレームを返します。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Authorization;
/// assert_eq!(kind.code(), "authorization");
/// assert_eq!(kind.as_str(), "Authorization Failed");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// フレームまたはペイロードが不正
    Protocol,
    /// シード・トークン・証明の検証に失敗
    Authorization,
    /// リプレイ防止ストアが利用不可
    Storage,
    /// サーバー内部エラー（エントロピー枯渇など）
    Internal,
}

impl ErrorKind {
    /// 機械可読な短いコードを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Protocol.code(), "protocol");
    /// assert_eq!(ErrorKind::Storage.code(), "storage");
    /// ```
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::Protocol => "protocol",
            ErrorKind::Authorization => "authorization",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }

    /// ユーザー向けの文字列表現を取得
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Protocol => "Protocol Error",
            ErrorKind::Authorization => "Authorization Failed",
            ErrorKind::Storage => "Storage Unavailable",
            ErrorKind::Internal => "Internal Error",
        }
    }

    /// サーバー側のエラーかどうかを判定
    ///
    /// ストア障害と内部エラーは `true` を返します。
    /// 接続ループはこれらを `warn` で、それ以外を `debug` で記録します。
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, ErrorKind::Storage | ErrorKind::Internal)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
