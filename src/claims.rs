//! JWT クレームセットの組み立てと検証結果の表現。

use chrono::Utc;
use serde_json::{Map, Value};

/// JWT ペイロード（クレーム名 → JSON 値のマッピング）。
pub type JwtPayload = Map<String, Value>;

/// 現在時刻を UNIX エポック秒で返す。
pub fn epoch_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// ClaimSet は署名対象となるクレーム一式を表す。
///
/// 呼び出し元クレームを先に取り込み、その後 userId / scope などの
/// コアクレームを上書きで適用する。適用順により、呼び出し元クレームが
/// コアクレームを覆い隠すことはない。
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    payload: JwtPayload,
}

impl ClaimSet {
    /// 空のクレームセットを生成する。
    pub fn new() -> Self {
        Self {
            payload: JwtPayload::new(),
        }
    }

    /// 呼び出し元クレームを初期値としてクレームセットを生成する。
    pub fn with_claims(claims: JwtPayload) -> Self {
        Self { payload: claims }
    }

    /// userId クレームを設定する。
    pub fn set_user_id(mut self, user_id: &str) -> Self {
        self.payload
            .insert("userId".to_string(), Value::String(user_id.to_string()));
        self
    }

    /// scope クレームを設定する。
    pub fn set_scope(mut self, scope: &[String]) -> Self {
        let elements = scope.iter().map(|s| Value::String(s.clone())).collect();
        self.payload
            .insert("scope".to_string(), Value::Array(elements));
        self
    }

    /// iat クレームを設定する。
    pub fn set_issued_at(mut self, issued_at: u64) -> Self {
        self.payload
            .insert("iat".to_string(), Value::from(issued_at));
        self
    }

    /// exp クレームを設定する。
    pub fn set_expiration(mut self, expiration: u64) -> Self {
        self.payload
            .insert("exp".to_string(), Value::from(expiration));
        self
    }

    /// iss クレームを設定する。
    pub fn set_issuer(mut self, issuer: &str) -> Self {
        self.payload
            .insert("iss".to_string(), Value::String(issuer.to_string()));
        self
    }

    /// aud クレームを設定する。
    pub fn set_audience(mut self, audience: &str) -> Self {
        self.payload
            .insert("aud".to_string(), Value::String(audience.to_string()));
        self
    }

    /// 署名対象のペイロードへの参照を返す。
    pub fn payload(&self) -> &JwtPayload {
        &self.payload
    }
}

/// VerifiedToken は検証に成功したトークンのヘッダーとペイロード。
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// デコード済みの保護ヘッダー。
    pub header: jsonwebtoken::Header,

    /// デコード済みのクレームペイロード。
    pub payload: JwtPayload,
}
