//! k1s0-token-vault: 署名付きベアラートークンの発行・検証ライブラリ。
//!
//! トークン種別（accessToken / refreshToken / authorizationCode）ごとに
//! 署名 Authority（HS256 / RS256 / EdDSA）を割り当て、固定の issuer /
//! audience に束縛されたコンパクト JWS を発行・検証する。
//! 種別ごとのデフォルトスコープ・有効期間の適用、クレーム形状の検証、
//! 非対称鍵ペアのオンデマンド生成と PEM 永続化をサポートする。
//!
//! # 使い方
//!
//! ```ignore
//! use std::sync::Arc;
//! use k1s0_token_vault::{
//!     build_token_vault, AuthorityConfig, TokenOptions, TokenType, TokenVaultConfig,
//! };
//!
//! let config = TokenVaultConfig::new("https://issuer.example", "https://api.example")
//!     .with_authority(AuthorityConfig::hsa(TokenType::AccessToken, "s3cr3t"))
//!     .with_authority(AuthorityConfig::rsa(
//!         TokenType::RefreshToken,
//!         "keys/refresh-public.pem",
//!         "keys/refresh-private.pem",
//!     ));
//!
//! // identity は IdentityProvider<User> の実装
//! let vault = build_token_vault(&config, Arc::new(identity), None).await?;
//!
//! let token = vault.create_access_token(&user, TokenOptions::new())?;
//! let verified = vault.decode_token(TokenType::AccessToken, &token)?;
//! let resolved = vault.get_user_and_scope_claims(&verified.payload).await?;
//! ```

pub mod authority;
pub mod claims;
pub mod config;
pub mod error;
pub mod factory;
pub mod keys;
pub mod lifetime;
pub mod token_type;
pub mod vault;

pub use authority::{EdDsaAuthority, HmacAuthority, RsaAuthority, TokenAuthority, VerifyOptions};
pub use claims::{ClaimSet, JwtPayload, VerifiedToken};
pub use config::{AuthorityConfig, TokenVaultConfig};
pub use error::TokenVaultError;
pub use factory::{
    build_authority, build_token_vault, AuthorityRegistration, FilePathResolver,
};
pub use keys::{
    generate_ed25519_key_pair, generate_rsa_key_pair, load_key_pair, persist_key_pair,
    KeyPairPaths, KeyPairPem,
};
pub use lifetime::{DurationParser, Expiry, Lifetime, SuffixDurationParser};
pub use token_type::TokenType;
pub use vault::{IdentityProvider, TokenOptions, TokenVault, UserScope};

#[cfg(feature = "mock")]
pub use lifetime::MockDurationParser;
#[cfg(feature = "mock")]
pub use vault::MockIdentityProvider;

#[cfg(test)]
mod tests;
