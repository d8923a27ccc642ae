//! 署名 Authority: アルゴリズムと鍵素材に束縛されたトークン署名・検証能力。

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

use crate::claims::{ClaimSet, JwtPayload, VerifiedToken};
use crate::error::TokenVaultError;
use crate::keys::KeyPairPem;

/// VerifyOptions は検証時に要求する issuer / audience の組を表す。
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// 要求する iss クレームの値。
    pub issuer: String,

    /// 要求する aud クレームの値。
    pub audience: String,
}

/// TokenAuthority は 1 つの署名アルゴリズムと鍵素材に束縛された
/// 署名・検証能力を表す。
///
/// バリアント集合は閉じており、パターンマッチで分岐する。
/// 構築後は不変で、複数の呼び出し元から並行に署名・検証してよい。
#[derive(Clone)]
pub enum TokenAuthority {
    /// HS256（共有シークレット）。
    Hmac(HmacAuthority),

    /// RS256（RSA 鍵ペア）。
    Rsa(RsaAuthority),

    /// EdDSA（Ed25519 鍵ペア）。
    EdDsa(EdDsaAuthority),
}

impl TokenAuthority {
    /// このバリアントが保護ヘッダーへ設定するアルゴリズムを返す。
    pub fn algorithm(&self) -> Algorithm {
        match self {
            TokenAuthority::Hmac(_) => Algorithm::HS256,
            TokenAuthority::Rsa(_) => Algorithm::RS256,
            TokenAuthority::EdDsa(_) => Algorithm::EdDSA,
        }
    }

    /// クレームセットへ署名し、コンパクト JWS を返す。
    ///
    /// 入出力を持たない純粋な計算。
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, TokenVaultError> {
        let header = Header::new(self.algorithm());
        encode(&header, claims.payload(), self.encoding_key())
            .map_err(|e| TokenVaultError::SigningFailed(e.to_string()))
    }

    /// コンパクト JWS を検証し、ヘッダーとペイロードを返す。
    ///
    /// 署名・必須クレーム（exp / iss / aud）・有効期限・issuer・audience を
    /// 検証する。有効期限は leeway なしで判定し、過去の exp は拒否する。
    pub fn verify(
        &self,
        token: &str,
        options: &VerifyOptions,
    ) -> Result<VerifiedToken, TokenVaultError> {
        let mut validation = Validation::new(self.algorithm());
        validation.leeway = 0;
        validation.set_issuer(&[&options.issuer]);
        validation.set_audience(&[&options.audience]);

        let data = decode::<JwtPayload>(token, self.decoding_key(), &validation)
            .map_err(verification_error)?;

        Ok(VerifiedToken {
            header: data.header,
            payload: data.claims,
        })
    }

    fn encoding_key(&self) -> &EncodingKey {
        match self {
            TokenAuthority::Hmac(authority) => &authority.encoding_key,
            TokenAuthority::Rsa(authority) => &authority.encoding_key,
            TokenAuthority::EdDsa(authority) => &authority.encoding_key,
        }
    }

    fn decoding_key(&self) -> &DecodingKey {
        match self {
            TokenAuthority::Hmac(authority) => &authority.decoding_key,
            TokenAuthority::Rsa(authority) => &authority.decoding_key,
            TokenAuthority::EdDsa(authority) => &authority.decoding_key,
        }
    }
}

/// jsonwebtoken の検証エラーを TokenVaultError へ対応付ける。
fn verification_error(error: jsonwebtoken::errors::Error) -> TokenVaultError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenVaultError::SignatureVerificationFailed,
        ErrorKind::ExpiredSignature => {
            TokenVaultError::ClaimValidationFailed("トークンの有効期限が切れています".to_string())
        }
        ErrorKind::InvalidIssuer => {
            TokenVaultError::ClaimValidationFailed("issuer が一致しません".to_string())
        }
        ErrorKind::InvalidAudience => {
            TokenVaultError::ClaimValidationFailed("audience が一致しません".to_string())
        }
        ErrorKind::ImmatureSignature => {
            TokenVaultError::ClaimValidationFailed("トークンはまだ有効ではありません".to_string())
        }
        ErrorKind::MissingRequiredClaim(name) => TokenVaultError::ClaimValidationFailed(format!(
            "必須クレーム {name} が含まれていません"
        )),
        _ => TokenVaultError::MalformedToken(error.to_string()),
    }
}

/// HmacAuthority は共有シークレットによる HS256 署名・検証を提供する。
#[derive(Clone)]
pub struct HmacAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl HmacAuthority {
    /// UTF-8 シークレットから生成する。署名・検証とも同じシークレットを使う。
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl From<HmacAuthority> for TokenAuthority {
    fn from(authority: HmacAuthority) -> Self {
        TokenAuthority::Hmac(authority)
    }
}

/// RsaAuthority は RSA 鍵ペアによる RS256 署名・検証を提供する。
#[derive(Clone)]
pub struct RsaAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl RsaAuthority {
    /// SPKI 公開鍵 PEM と PKCS8 秘密鍵 PEM から生成する。
    pub fn from_pem(public_pem: &str, private_pem: &str) -> Result<Self, TokenVaultError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    /// PEM エンコード済み鍵ペアから生成する。
    pub fn from_key_pair(key_pair: &KeyPairPem) -> Result<Self, TokenVaultError> {
        Self::from_pem(&key_pair.public_pem, &key_pair.private_pem)
    }

    /// メモリ上の RSA 秘密鍵オブジェクトから生成する。
    pub fn from_private_key(private_key: &rsa::RsaPrivateKey) -> Result<Self, TokenVaultError> {
        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        Self::from_pem(&public_pem, &private_pem)
    }
}

impl From<RsaAuthority> for TokenAuthority {
    fn from(authority: RsaAuthority) -> Self {
        TokenAuthority::Rsa(authority)
    }
}

/// EdDsaAuthority は Ed25519 鍵ペアによる EdDSA 署名・検証を提供する。
#[derive(Clone)]
pub struct EdDsaAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl EdDsaAuthority {
    /// SPKI 公開鍵 PEM と PKCS8 秘密鍵 PEM から生成する。
    pub fn from_pem(public_pem: &str, private_pem: &str) -> Result<Self, TokenVaultError> {
        let encoding_key = EncodingKey::from_ed_pem(private_pem.as_bytes())
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        let decoding_key = DecodingKey::from_ed_pem(public_pem.as_bytes())
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    /// PEM エンコード済み鍵ペアから生成する。
    pub fn from_key_pair(key_pair: &KeyPairPem) -> Result<Self, TokenVaultError> {
        Self::from_pem(&key_pair.public_pem, &key_pair.private_pem)
    }

    /// メモリ上の Ed25519 署名鍵オブジェクトから生成する。
    pub fn from_signing_key(
        signing_key: &ed25519_dalek::SigningKey,
    ) -> Result<Self, TokenVaultError> {
        let public_pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        let private_pem = signing_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| TokenVaultError::InvalidKeyMaterial(e.to_string()))?;
        Self::from_pem(&public_pem, &private_pem)
    }
}

impl From<EdDsaAuthority> for TokenAuthority {
    fn from(authority: EdDsaAuthority) -> Self {
        TokenAuthority::EdDsa(authority)
    }
}
