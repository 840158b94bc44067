//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use chrono::NaiveDate;
use log::info;
use std::io::Read;

use crate::api::{Compression, DateFormat};
use crate::archive::{ArchiveOptions, Archiver, BatchResult};
use crate::error::SheetToMdError;
use crate::formatter::CellFormatter;
use crate::mapping::ColumnMapping;
use crate::parser::WorkbookParser;
use crate::preview::preview_row;
use crate::renderer::RenderedDocument;
use crate::security::SecurityConfig;
use crate::types::Table;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionConfig {
    /// 日付形式
    pub date_format: DateFormat,

    /// アーカイブの圧縮方式
    pub compression: Compression,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheet2md::{Compression, ConverterBuilder, DateFormat};
///
/// # fn main() -> Result<(), sheet2md::SheetToMdError> {
/// let converter = ConverterBuilder::new()
///     .with_date_format(DateFormat::Custom("%Y/%m/%d".to_string()))
///     .with_compression(Compression::Stored)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 日付形式: ISO 8601 (YYYY-MM-DD、時刻を含む列は YYYY-MM-DD HH:MM:SS)
    /// - 圧縮方式: Deflate
    pub fn new() -> Self {
        Self::default()
    }

    /// 日付の出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// アーカイブの圧縮方式を指定する
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetToMdError::Config(String)` - カスタム日付形式が空の出力になる場合
    pub fn build(self) -> Result<Converter, SheetToMdError> {
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            // テスト用の日付でフォーマット試行
            let test_date = NaiveDate::from_ymd_opt(2025, 1, 1)
                .ok_or_else(|| SheetToMdError::Config("Failed to create test date".to_string()))?;
            let mut formatted = String::new();
            // 不正な指定子はfmt::Errorになる
            let valid = std::fmt::write(
                &mut formatted,
                format_args!("{}", test_date.format(format_str)),
            )
            .is_ok();
            if !valid || formatted.is_empty() {
                return Err(SheetToMdError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// スプレッドシートの読み込み、マッピングの検証、プレビュー、アーカイブ生成を
/// まとめて提供します。どの操作も途中で致命的なエラーが起きた場合は
/// 部分的な結果を返しません。
///
/// # 使用例
///
/// ```rust,no_run
/// use sheet2md::{ColumnMapping, ConverterBuilder};
/// use std::fs::File;
///
/// # fn main() -> Result<(), sheet2md::SheetToMdError> {
/// let converter = ConverterBuilder::new().build()?;
/// let mapping = ColumnMapping::new("Name").with_label_column("Tags");
///
/// let result = converter.convert(File::open("items.xlsx")?, &mapping)?;
/// std::fs::write("markdown_files.zip", result.archive.bytes())?;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
    formatter: CellFormatter,
    security: SecurityConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self {
            formatter: CellFormatter::new(config.date_format.clone()),
            security: SecurityConfig::default(),
            config,
        }
    }

    /// スプレッドシートの最初のシートをテーブルとして読み込む
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetToMdError::UnreadableSource` - スプレッドシートとして読めない場合
    /// * `SheetToMdError::SecurityViolation` - 入力サイズが上限を超えた場合
    /// * `SheetToMdError::Io` - 読み込みに失敗した場合
    pub fn read_table<R: Read>(&self, input: R) -> Result<Table, SheetToMdError> {
        let mut parser = WorkbookParser::open(input, &self.security)?;
        let table = parser.read_first_sheet(&self.formatter)?;
        info!(
            "Read {} rows with {} columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    /// マッピングをテーブルの列に対して検証する
    pub fn validate(&self, table: &Table, mapping: &ColumnMapping) -> Result<(), SheetToMdError> {
        mapping.validate(table.columns())
    }

    /// 指定行の変換結果をプレビューする
    pub fn preview(
        &self,
        table: &Table,
        mapping: &ColumnMapping,
        row_index: usize,
    ) -> Result<RenderedDocument, SheetToMdError> {
        self.validate(table, mapping)?;
        preview_row(table, mapping, row_index)
    }

    /// テーブル全体をアーカイブにまとめる
    ///
    /// マッピングの検証に失敗した場合は、どの行も処理せずにエラーを返します。
    pub fn export(
        &self,
        table: &Table,
        mapping: &ColumnMapping,
    ) -> Result<BatchResult, SheetToMdError> {
        self.validate(table, mapping)?;
        let archiver = Archiver::new(ArchiveOptions {
            compression: self.config.compression,
        })
        .with_header_row(table.header_row());
        archiver.archive(table.rows(), mapping)
    }

    /// 読み込みからアーカイブ生成までを一度に行う
    pub fn convert<R: Read>(
        &self,
        input: R,
        mapping: &ColumnMapping,
    ) -> Result<BatchResult, SheetToMdError> {
        let table = self.read_table(input)?;
        self.export(&table, mapping)
    }
}
