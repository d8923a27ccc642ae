//! トークン種別の定義。

use serde::{Deserialize, Serialize};

/// TokenType は Vault が発行・検証するトークンのカテゴリを表す。
///
/// カテゴリごとにデフォルトのスコープ・有効期間と、署名を担当する
/// Authority の割り当てが決まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    /// API アクセス用のアクセストークン。
    AccessToken,

    /// アクセストークンを再発行するためのリフレッシュトークン。
    RefreshToken,

    /// 認可コードフローで使う短命の認可コード。
    AuthorizationCode,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenType::AccessToken => "accessToken",
            TokenType::RefreshToken => "refreshToken",
            TokenType::AuthorizationCode => "authorizationCode",
        };
        f.write_str(name)
    }
}
