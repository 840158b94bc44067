//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// 日付の出力形式
///
/// スプレッドシートの日付セルを文字列に正規化する際の形式を指定します。
/// 正規化は列単位で行われるため、同じ列の値はファイル名・フロントマターの
/// どちらに使われても同じ表記になります。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（デフォルト）
    ///
    /// 列内に時刻を持つセルが1つでもあれば `YYYY-MM-DD HH:MM:SS`、
    /// そうでなければ `YYYY-MM-DD` で出力します。
    #[default]
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// 列内のすべての日付セルにこの形式を適用します。
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use sheet2md::{ConverterBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), sheet2md::SheetToMdError> {
    /// let converter = ConverterBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),
}

/// ファイル名（およびフォルダ名）の生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum FilenameStyle {
    /// セル値をそのまま使う（不正な文字のみ置換）
    ///
    /// 例: `Item A` → `Item A.md`
    #[default]
    Preserve,

    /// 空白を `_` に置換し、小文字化する
    ///
    /// 例: `Item A` → `item_a.md`
    Slug,
}

/// アーカイブの圧縮方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Compression {
    /// Deflate圧縮（デフォルト）
    #[default]
    Deflated,

    /// 無圧縮
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}
