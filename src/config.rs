//! Vault と Authority の設定記述子。
//!
//! YAML / JSON から serde でデシリアライズ可能。スキーマ全体の詳細な検証は
//! 設定読み込み側の責務であり、ここでは Factory が依存する最小限の形と
//! issuer / audience / 有効期間の基本チェックのみを扱う。

use serde::{Deserialize, Serialize};

use crate::error::TokenVaultError;
use crate::token_type::TokenType;

/// AuthorityConfig は 1 つの Authority を構築するための設定記述子を表す。
///
/// `algorithm` タグ（hsa / rsa / eddsa）と担当トークン種別、アルゴリズム
/// 固有のフィールドを保持する。タグの妥当性は Factory が判定する。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityConfig {
    /// 署名アルゴリズムのタグ。"hsa" / "rsa" / "eddsa" のいずれか。
    pub algorithm: String,

    /// この Authority が担当するトークン種別。
    #[serde(rename = "for")]
    pub token_type: TokenType,

    /// HMAC 用共有シークレット（hsa のみ）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// SPKI 公開鍵 PEM ファイルのパス（rsa / eddsa のみ）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_file_path: Option<String>,

    /// PKCS8 秘密鍵 PEM ファイルのパス（rsa / eddsa のみ）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_file_path: Option<String>,
}

impl AuthorityConfig {
    /// HMAC Authority の設定を生成する。
    pub fn hsa(token_type: TokenType, secret: &str) -> Self {
        Self {
            algorithm: "hsa".to_string(),
            token_type,
            secret: Some(secret.to_string()),
            public_key_file_path: None,
            private_key_file_path: None,
        }
    }

    /// RSA Authority の設定を生成する。
    pub fn rsa(
        token_type: TokenType,
        public_key_file_path: &str,
        private_key_file_path: &str,
    ) -> Self {
        Self {
            algorithm: "rsa".to_string(),
            token_type,
            secret: None,
            public_key_file_path: Some(public_key_file_path.to_string()),
            private_key_file_path: Some(private_key_file_path.to_string()),
        }
    }

    /// Ed25519 Authority の設定を生成する。
    pub fn eddsa(
        token_type: TokenType,
        public_key_file_path: &str,
        private_key_file_path: &str,
    ) -> Self {
        Self {
            algorithm: "eddsa".to_string(),
            token_type,
            secret: None,
            public_key_file_path: Some(public_key_file_path.to_string()),
            private_key_file_path: Some(private_key_file_path.to_string()),
        }
    }
}

/// TokenVaultConfig は TokenVault 全体の設定を表す。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenVaultConfig {
    /// トークンの発行者（iss クレーム）。
    pub issuer: String,

    /// トークンの対象オーディエンス（aud クレーム）。
    pub audience: String,

    /// アクセストークンのデフォルト有効期間（秒）。省略時は 1800。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<u64>,

    /// リフレッシュトークンのデフォルト有効期間（秒）。省略時は 1209600。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<u64>,

    /// 登録する Authority の設定一覧。
    #[serde(default)]
    pub authorities: Vec<AuthorityConfig>,
}

impl TokenVaultConfig {
    /// 最小限の設定で TokenVaultConfig を生成する。
    pub fn new(issuer: &str, audience: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            authorities: Vec::new(),
        }
    }

    /// アクセストークンのデフォルト有効期間を設定する。
    pub fn with_access_token_lifetime(mut self, secs: u64) -> Self {
        self.access_token_lifetime = Some(secs);
        self
    }

    /// リフレッシュトークンのデフォルト有効期間を設定する。
    pub fn with_refresh_token_lifetime(mut self, secs: u64) -> Self {
        self.refresh_token_lifetime = Some(secs);
        self
    }

    /// Authority の設定を追加する。
    pub fn with_authority(mut self, authority: AuthorityConfig) -> Self {
        self.authorities.push(authority);
        self
    }

    /// issuer / audience が http(s) URL であること、有効期間が正であることを検証する。
    pub fn validate(&self) -> Result<(), TokenVaultError> {
        validate_endpoint_url("issuer", &self.issuer)?;
        validate_endpoint_url("audience", &self.audience)?;

        if self.access_token_lifetime == Some(0) {
            return Err(TokenVaultError::InvalidVaultConfig(
                "accessTokenLifetime は正の秒数である必要があります".to_string(),
            ));
        }
        if self.refresh_token_lifetime == Some(0) {
            return Err(TokenVaultError::InvalidVaultConfig(
                "refreshTokenLifetime は正の秒数である必要があります".to_string(),
            ));
        }
        Ok(())
    }
}

/// フィールドが http(s) URL であることを検証する。
fn validate_endpoint_url(field: &str, input: &str) -> Result<(), TokenVaultError> {
    let parsed = url::Url::parse(input).map_err(|_| {
        TokenVaultError::InvalidVaultConfig(format!("{field} は URL である必要があります: {input}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(TokenVaultError::InvalidVaultConfig(format!(
            "{field} のスキームが不正です: {other}"
        ))),
    }
}
