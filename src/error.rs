//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! エラーは2種類に分かれる:
//!
//! - [`SheetToMdError`]: 操作全体を中断する致命的なエラー
//! - [`RowError`]: バッチ処理中に行単位で記録され、処理は継続される警告・エラー

use thiserror::Error;

use crate::mapping::MappingRole;

/// sheet2mdクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー
/// - `UnreadableSource`: 入力がスプレッドシートとして読めない
/// - `InvalidMappingReference`: マッピングが存在しない列を参照している
/// - `MissingFilenameValue`: ファイル名列の値が空
/// - `Zip`: アーカイブ書き込み中のエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: 入力サイズ制限などへの違反
#[derive(Error, Debug)]
pub enum SheetToMdError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力バイト列が正しいスプレッドシートではない
    ///
    /// 破損・暗号化されたファイル、未対応の形式、シートを1つも含まない
    /// ワークブックなどが原因となります。行の処理が始まる前に報告されます。
    #[error("Unreadable source: {0}")]
    UnreadableSource(String),

    /// マッピングが入力テーブルに存在しない列を参照している
    ///
    /// `Converter::validate()`で検出され、どの行も処理される前に報告されます。
    ///
    /// # 例
    ///
    /// ```rust
    /// use sheet2md::{MappingRole, SheetToMdError};
    ///
    /// let error = SheetToMdError::InvalidMappingReference {
    ///     role: MappingRole::Label,
    ///     column: "Tags".to_string(),
    /// };
    /// assert_eq!(
    ///     error.to_string(),
    ///     "Invalid mapping reference: label column 'Tags' does not exist"
    /// );
    /// ```
    #[error("Invalid mapping reference: {role} column '{column}' does not exist")]
    InvalidMappingReference {
        /// 列が使われている役割
        role: MappingRole,
        /// 見つからなかった列名
        column: String,
    },

    /// ファイル名列の値が空
    ///
    /// 単一行のレンダリング（プレビュー）ではそのまま返され、
    /// バッチ処理では[`RowErrorReason::MissingFilenameValue`]として記録されます。
    #[error("Missing filename value in column '{column}'")]
    MissingFilenameValue {
        /// ファイル名列の列名
        column: String,
    },

    /// ZIPアーカイブの書き込みエラー
    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// 設定の検証に失敗したエラー
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

/// バッチ処理中に行単位で記録されるエラー・警告
///
/// `row_index`はデータ行（ヘッダー行を除く）の0始まりの位置です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// データ行の位置（0始まり）
    pub row_index: usize,
    /// 原因
    pub reason: RowErrorReason,
    /// ヘッダー行のシート上の位置（0始まり）
    header_row: usize,
}

impl RowError {
    pub fn new(row_index: usize, reason: RowErrorReason) -> Self {
        Self {
            row_index,
            reason,
            header_row: 0,
        }
    }

    /// ヘッダー行のシート上の位置（0始まり）を指定
    ///
    /// シートの先頭に空行がある場合、ヘッダーは1行目にありません。
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// スプレッドシート上の行番号（1始まり、ヘッダー行を含む）
    pub fn sheet_row(&self) -> usize {
        self.to_sheet_row(self.row_index)
    }

    /// 重複パスで上書きされた行のスプレッドシート上の行番号
    pub fn previous_sheet_row(&self) -> Option<usize> {
        match self.reason {
            RowErrorReason::DuplicatePath { previous_row, .. } => {
                Some(self.to_sheet_row(previous_row))
            }
            _ => None,
        }
    }

    /// 重複パスによる警告かどうか
    ///
    /// 重複は出力から行を落とさない（後勝ちで上書きする）ため、
    /// スキップされた行の集計からは除外されます。
    pub fn is_duplicate(&self) -> bool {
        matches!(self.reason, RowErrorReason::DuplicatePath { .. })
    }

    fn to_sheet_row(&self, row_index: usize) -> usize {
        self.header_row + row_index + 2
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.sheet_row(), self.reason)?;
        if let Some(previous) = self.previous_sheet_row() {
            write!(f, " (overwrites row {})", previous)?;
        }
        Ok(())
    }
}

/// 行単位エラーの原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowErrorReason {
    /// ファイル名列の値が空のため行をスキップした
    #[error("missing filename value in column '{column}'")]
    MissingFilenameValue { column: String },

    /// 先行する行と同じパスになったため、先行行の文書を上書きした
    #[error("duplicate path '{path}'")]
    DuplicatePath {
        path: String,
        /// 上書きされた行の位置（0始まり）
        previous_row: usize,
    },

    /// 生成されたパスがアーカイブのエントリ名として安全でない
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },
}
