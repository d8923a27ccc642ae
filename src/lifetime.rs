//! トークン有効期間の表現と期限計算。

use serde::{Deserialize, Serialize};

use crate::error::TokenVaultError;

#[cfg(feature = "mock")]
use mockall::automock;

/// Lifetime はトークンの有効期間を表す。
///
/// 現在時刻からの相対秒数（数値）か、`"2h"` のような期間表現（文字列）の
/// どちらかを取る。期間表現の解釈は Vault 自身は行わず、署名時に
/// [`DurationParser`] へ委譲する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lifetime {
    /// 現在時刻からの相対秒数。
    Seconds(u64),

    /// 下流で解釈される期間表現。
    Expression(String),
}

/// Expiry は有効期限の計算結果を表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// UNIX エポック秒での絶対期限。
    Epoch(u64),

    /// 未解釈のまま通過させる期間表現。
    Expression(String),
}

/// DurationParser は期間表現文字列を秒数へ解決するトレイト。
///
/// デフォルト実装は [`SuffixDurationParser`]。呼び出し側で独自の文法を
/// 受理したい場合は差し替えられる。
#[cfg_attr(feature = "mock", automock)]
pub trait DurationParser: Send + Sync {
    /// 期間表現を秒数に変換する。
    ///
    /// # エラー
    ///
    /// 受理できない表現の場合は `TokenVaultError::InvalidLifetime` を返す。
    fn parse(&self, expression: &str) -> Result<u64, TokenVaultError>;
}

/// SuffixDurationParser は `<正の整数><単位>` 形式のみを受理するデフォルト実装。
///
/// 単位は s（秒）/ m（分）/ h（時間）/ d（日）/ w（週）。
/// それ以外の表現は明示的に拒否する。
#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixDurationParser;

impl DurationParser for SuffixDurationParser {
    fn parse(&self, expression: &str) -> Result<u64, TokenVaultError> {
        let expr = expression.trim();

        let Some(unit) = expr.chars().last() else {
            return Err(TokenVaultError::InvalidLifetime(expression.to_string()));
        };

        let multiplier: u64 = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return Err(TokenVaultError::InvalidLifetime(expression.to_string())),
        };

        // 単位は ASCII 1 文字なのでバイト境界のスライスで問題ない
        let digits = &expr[..expr.len() - 1];
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(TokenVaultError::InvalidLifetime(expression.to_string()));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| TokenVaultError::InvalidLifetime(expression.to_string()))?;

        value
            .checked_mul(multiplier)
            .ok_or_else(|| TokenVaultError::InvalidLifetime(expression.to_string()))
    }
}
