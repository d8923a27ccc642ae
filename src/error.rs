//! トークン Vault のエラー定義。

use crate::token_type::TokenType;

/// TokenVaultError はトークンの発行・検証・Authority 構築で発生するエラーを表す。
///
/// すべての失敗は型付きで即座に呼び出し元へ返される。内部でのリトライは行わない。
#[derive(thiserror::Error, Debug)]
pub enum TokenVaultError {
    /// Authority 設定の algorithm タグが未対応、または必須フィールドが欠落している。
    #[error("不正な Authority 設定: {0}")]
    InvalidAuthorityConfig(String),

    /// Vault 設定の issuer / audience / 有効期間が不正。
    #[error("不正な Vault 設定: {0}")]
    InvalidVaultConfig(String),

    /// 指定されたトークン種別に Authority が登録されていない。
    #[error("トークン種別 {0} に対応する Authority が登録されていません")]
    NoRegisteredAuthority(TokenType),

    /// 署名が一致しない（改ざんまたは鍵の不一致）。
    #[error("署名検証に失敗しました")]
    SignatureVerificationFailed,

    /// 有効期限切れ、必須クレームの欠落、または issuer / audience の不一致。
    #[error("クレーム検証に失敗しました: {0}")]
    ClaimValidationFailed(String),

    /// コンパクト JWS として構造的に不正なトークン。
    #[error("不正な形式のトークン: {0}")]
    MalformedToken(String),

    /// デコード済みペイロードの userId が文字列でない。
    #[error("userId クレームが不正です")]
    InvalidUserId,

    /// デコード済みペイロードの scope が文字列配列でない。
    #[error("scope クレームが不正です")]
    InvalidScope,

    /// identity 照会でユーザーが見つからなかった。
    #[error("ユーザーが見つかりません: {0}")]
    UserNotFound(String),

    /// 受理できない有効期間表現。
    #[error("不正な有効期間表現: {0}")]
    InvalidLifetime(String),

    /// PEM の解析や鍵の取り込みに失敗した。
    #[error("不正な鍵素材: {0}")]
    InvalidKeyMaterial(String),

    /// JWS の署名処理に失敗した。
    #[error("トークン署名失敗: {0}")]
    SigningFailed(String),

    /// 鍵ペアの生成に失敗した。
    #[error("鍵ペア生成失敗: {0}")]
    KeyPairGeneration(String),

    /// 鍵ファイルの読み書きに失敗した（存在しない鍵ペアはエラーではない）。
    #[error("鍵ファイル入出力失敗: {0}")]
    KeyFileIo(String),
}
