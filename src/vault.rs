//! TokenVault: トークン種別 → Authority のレジストリと発行・検証ポリシー。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::authority::{TokenAuthority, VerifyOptions};
use crate::claims::{epoch_now, ClaimSet, JwtPayload, VerifiedToken};
use crate::error::TokenVaultError;
use crate::lifetime::{DurationParser, Expiry, Lifetime, SuffixDurationParser};
use crate::token_type::TokenType;

#[cfg(feature = "mock")]
use mockall::automock;

/// accessToken のデフォルト有効期間（秒）。
const DEFAULT_ACCESS_TOKEN_LIFETIME: u64 = 1_800;

/// refreshToken のデフォルト有効期間（秒）。
const DEFAULT_REFRESH_TOKEN_LIFETIME: u64 = 1_209_600;

/// authorizationCode の固定有効期間（秒）。
const AUTHORIZATION_CODE_LIFETIME: u64 = 60;

/// IdentityProvider は Vault が利用者を解決するためのトレイト。
///
/// Vault はユーザー型 `U` の内部構造をこのトレイト経由でしか扱わない。
#[async_trait]
#[cfg_attr(feature = "mock", automock)]
pub trait IdentityProvider<U>: Send + Sync {
    /// ユーザー値から一意な識別子を取り出す。
    fn user_identifier(&self, user: &U) -> String;

    /// 識別子からユーザーを照会する。存在しない場合は `None`。
    async fn find_unique_user(&self, user_id: &str) -> Option<U>;
}

/// TokenOptions はトークン発行時の明示オプションを表す。
///
/// 明示値が常にデフォルトより優先される。省略されたフィールドには
/// トークン種別ごとのデフォルトが適用される。
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    /// 明示スコープ。省略時は種別デフォルト。
    pub scope: Option<Vec<String>>,

    /// 明示有効期間。省略時は種別デフォルト。
    pub lifetime: Option<Lifetime>,

    /// 追加クレーム。省略時は空。
    pub claims: Option<JwtPayload>,
}

impl TokenOptions {
    /// 空のオプションを生成する。
    pub fn new() -> Self {
        Self::default()
    }

    /// スコープを設定する。
    pub fn with_scope(mut self, scope: Vec<String>) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 有効期間を設定する。
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// 追加クレームを設定する。
    pub fn with_claims(mut self, claims: JwtPayload) -> Self {
        self.claims = Some(claims);
        self
    }
}

/// UserScope は検証済みトークンから解決したユーザーとスコープの組。
#[derive(Debug, Clone)]
pub struct UserScope<U> {
    /// identity 照会で解決したユーザー。
    pub user: U,

    /// トークンに埋め込まれていたスコープ。
    pub scope: Vec<String>,
}

/// TokenVault はトークン種別ごとの Authority と発行ポリシーを束ねる。
///
/// レジストリは起動時の組み立て中にのみ書き込まれ、公開後は読み取り専用。
/// 発行・検証は不変な状態への参照だけで完結するため、複数の呼び出し元から
/// 並行に利用してよい。
pub struct TokenVault<U> {
    authorities: HashMap<TokenType, TokenAuthority>,
    identity: Arc<dyn IdentityProvider<U>>,
    issuer: String,
    audience: String,
    access_token_lifetime: u64,
    refresh_token_lifetime: u64,
    duration_parser: Arc<dyn DurationParser>,
}

impl<U> TokenVault<U> {
    /// 新しい TokenVault を生成する。
    ///
    /// アクセストークン 1800 秒、リフレッシュトークン 1209600 秒の
    /// デフォルト有効期間で初期化される。
    pub fn new(identity: Arc<dyn IdentityProvider<U>>, issuer: &str, audience: &str) -> Self {
        Self {
            authorities: HashMap::new(),
            identity,
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            access_token_lifetime: DEFAULT_ACCESS_TOKEN_LIFETIME,
            refresh_token_lifetime: DEFAULT_REFRESH_TOKEN_LIFETIME,
            duration_parser: Arc::new(SuffixDurationParser),
        }
    }

    /// アクセストークンのデフォルト有効期間を設定する。
    pub fn with_access_token_lifetime(mut self, secs: u64) -> Self {
        self.access_token_lifetime = secs;
        self
    }

    /// リフレッシュトークンのデフォルト有効期間を設定する。
    pub fn with_refresh_token_lifetime(mut self, secs: u64) -> Self {
        self.refresh_token_lifetime = secs;
        self
    }

    /// 期間表現の解決に使う DurationParser を差し替える。
    pub fn with_duration_parser(mut self, parser: Arc<dyn DurationParser>) -> Self {
        self.duration_parser = parser;
        self
    }

    /// トークン種別に Authority を登録する。既存の登録は置き換えられる。
    pub fn register_authority(&mut self, token_type: TokenType, authority: TokenAuthority) {
        self.authorities.insert(token_type, authority);
    }

    /// 指定種別のトークンを発行する。
    ///
    /// scope / lifetime / claims は明示値が優先され、省略時は種別ごとの
    /// デフォルトが適用される。クレームセットには userId と scope が必ず
    /// 含まれ、呼び出し元クレームより優先される。
    pub fn create_token(
        &self,
        token_type: TokenType,
        user: &U,
        options: TokenOptions,
    ) -> Result<String, TokenVaultError> {
        let scope = options
            .scope
            .unwrap_or_else(|| Self::default_token_scope(token_type));
        let lifetime = options
            .lifetime
            .unwrap_or_else(|| Lifetime::Seconds(self.default_token_lifetime(token_type)));
        let claims = options.claims.unwrap_or_default();

        let expiration = match self.lifetime_to_expiry(&lifetime) {
            Expiry::Epoch(epoch) => epoch,
            // 期間表現は署名時点で DurationParser により解決する
            Expiry::Expression(expression) => {
                epoch_now() + self.duration_parser.parse(&expression)?
            }
        };

        let claim_set = ClaimSet::with_claims(claims)
            .set_user_id(&self.identity.user_identifier(user))
            .set_scope(&scope)
            .set_issued_at(epoch_now())
            .set_expiration(expiration)
            .set_issuer(&self.issuer)
            .set_audience(&self.audience);

        debug!(token_type = %token_type, "トークンを発行します");
        self.token_authority(token_type)?.sign(&claim_set)
    }

    /// アクセストークンを発行する。
    pub fn create_access_token(
        &self,
        user: &U,
        options: TokenOptions,
    ) -> Result<String, TokenVaultError> {
        self.create_token(TokenType::AccessToken, user, options)
    }

    /// リフレッシュトークンを発行する。
    pub fn create_refresh_token(
        &self,
        user: &U,
        options: TokenOptions,
    ) -> Result<String, TokenVaultError> {
        self.create_token(TokenType::RefreshToken, user, options)
    }

    /// 指定種別のトークンを検証し、ヘッダーとペイロードを返す。
    ///
    /// Authority が未登録の場合は暗号処理に入らず NoRegisteredAuthority を
    /// 返す。Authority の検証エラーはそのまま呼び出し元へ伝播する。
    pub fn decode_token(
        &self,
        token_type: TokenType,
        token: &str,
    ) -> Result<VerifiedToken, TokenVaultError> {
        let authority = self.token_authority(token_type)?;
        authority.verify(
            token,
            &VerifyOptions {
                issuer: self.issuer.clone(),
                audience: self.audience.clone(),
            },
        )
    }

    /// 検証済みペイロードから userId / scope を取り出し、ユーザーを解決する。
    ///
    /// # エラー
    ///
    /// userId が文字列でなければ InvalidUserId、scope が文字列配列で
    /// なければ InvalidScope、照会に失敗すれば UserNotFound を返す。
    pub async fn get_user_and_scope_claims(
        &self,
        payload: &JwtPayload,
    ) -> Result<UserScope<U>, TokenVaultError> {
        let user_id = match payload.get("userId") {
            Some(Value::String(user_id)) => user_id.as_str(),
            _ => return Err(TokenVaultError::InvalidUserId),
        };

        let scope = match payload.get("scope") {
            Some(Value::Array(elements)) => {
                let mut scope = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        Value::String(s) => scope.push(s.clone()),
                        _ => return Err(TokenVaultError::InvalidScope),
                    }
                }
                scope
            }
            _ => return Err(TokenVaultError::InvalidScope),
        };

        let user = self
            .identity
            .find_unique_user(user_id)
            .await
            .ok_or_else(|| TokenVaultError::UserNotFound(user_id.to_string()))?;

        Ok(UserScope { user, scope })
    }

    /// 有効期間を期限へ変換する。
    ///
    /// 秒数は現在時刻からの絶対エポック秒へ変換する。期間表現は解釈せず
    /// そのまま通過させる。
    pub fn lifetime_to_expiry(&self, lifetime: &Lifetime) -> Expiry {
        match lifetime {
            Lifetime::Seconds(secs) => Expiry::Epoch(epoch_now() + secs),
            Lifetime::Expression(expression) => Expiry::Expression(expression.clone()),
        }
    }

    /// 種別ごとのデフォルトスコープを返す。
    fn default_token_scope(token_type: TokenType) -> Vec<String> {
        match token_type {
            TokenType::AccessToken => vec!["api".to_string()],
            TokenType::RefreshToken => vec!["refresh".to_string()],
            TokenType::AuthorizationCode => Vec::new(),
        }
    }

    /// 種別ごとのデフォルト有効期間（秒）を返す。
    fn default_token_lifetime(&self, token_type: TokenType) -> u64 {
        match token_type {
            TokenType::AccessToken => self.access_token_lifetime,
            TokenType::RefreshToken => self.refresh_token_lifetime,
            TokenType::AuthorizationCode => AUTHORIZATION_CODE_LIFETIME,
        }
    }

    /// 登録済み Authority を取り出す。
    fn token_authority(&self, token_type: TokenType) -> Result<&TokenAuthority, TokenVaultError> {
        self.authorities
            .get(&token_type)
            .ok_or(TokenVaultError::NoRegisteredAuthority(token_type))
    }
}
