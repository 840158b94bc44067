//! Batch Archiver
//!
//! すべての行を文書に変換し、1つのZIPアーカイブにまとめるモジュール。
//!
//! 行単位の問題（ファイル名の欠落、パスの重複）は[`RowError`]として記録し、
//! バッチ全体は中断しません。中断するのはアーカイブの書き込みに失敗した場合だけです。

use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

use crate::api::Compression;
use crate::error::{RowError, RowErrorReason, SheetToMdError};
use crate::mapping::ColumnMapping;
use crate::renderer::{render, RenderedDocument};
use crate::security::{validate_entry_path, SecurityConfig};
use crate::types::Row;

/// アーカイブの出力設定
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// 圧縮方式
    pub compression: Compression,
}

/// アーカイブ内の1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// エントリ名（相対パス）
    pub path: String,
    /// 内容を提供した行の位置（0始まり）
    pub row_index: usize,
    /// 内容のバイト数（非圧縮）
    pub size: usize,
}

/// ZIPアーカイブ
///
/// パスの重複はなく、エントリはパスが最初に現れた行の順に並びます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    /// ZIPファイルのバイト列
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// ZIPファイルのバイト数（ダウンロード用のメタデータ）
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.path.as_str())
    }

    /// 生成されたファイルの一覧（`- <path>`を1行ずつ）
    pub fn file_tree(&self) -> String {
        self.paths()
            .map(|path| format!("- {}", path))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// バッチ処理の結果
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub archive: Archive,
    /// 行単位のエラー・警告（行順）
    pub errors: Vec<RowError>,
    /// 処理した行数
    pub total_rows: usize,
}

impl BatchResult {
    /// スキップされた行のスプレッドシート上の行番号
    pub fn skipped_rows(&self) -> Vec<usize> {
        self.errors
            .iter()
            .filter(|error| !error.is_duplicate())
            .map(RowError::sheet_row)
            .collect()
    }

    /// 文書に変換できた行数（後の行に上書きされた行を含む）
    pub fn converted(&self) -> usize {
        self.total_rows - self.skipped_rows().len()
    }

    pub fn duplicate_count(&self) -> usize {
        self.errors.iter().filter(|error| error.is_duplicate()).count()
    }

    /// 結果の要約
    ///
    /// 例: `312 of 315 rows converted, 3 skipped: rows 4, 88, 201`
    pub fn summary(&self) -> String {
        let skipped = self.skipped_rows();
        let mut summary = format!("{} of {} rows converted", self.converted(), self.total_rows);
        if !skipped.is_empty() {
            let rows: Vec<String> = skipped.iter().map(usize::to_string).collect();
            summary.push_str(&format!(
                ", {} skipped: rows {}",
                skipped.len(),
                rows.join(", ")
            ));
        }
        let duplicates = self.duplicate_count();
        if duplicates > 0 {
            summary.push_str(&format!(", {} duplicate path(s)", duplicates));
        }
        summary
    }
}

/// バッチアーカイバー
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    options: ArchiveOptions,
    security: SecurityConfig,
    header_row: usize,
}

impl Archiver {
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            security: SecurityConfig::default(),
            header_row: 0,
        }
    }

    /// ヘッダー行のシート上の位置（0始まり）を指定
    ///
    /// 行エラーの行番号（[`RowError::sheet_row`]）に反映されます。
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// すべての行を変換してアーカイブを生成
    ///
    /// # 処理フロー
    ///
    /// 1. 各行を[`render`]で変換（ファイル名が空の行は記録してスキップ）
    /// 2. エントリ名の安全性を検証
    /// 3. 同じパスは後の行で上書きし、重複として記録
    /// 4. ZIPに書き込み
    ///
    /// 同じ入力に対しては常にバイト単位で同一のアーカイブを生成します。
    pub fn archive(
        &self,
        rows: &[Row],
        mapping: &ColumnMapping,
    ) -> Result<BatchResult, SheetToMdError> {
        let mut documents: Vec<RenderedDocument> = Vec::new();
        let mut by_path: HashMap<String, usize> = HashMap::new();
        let mut errors: Vec<RowError> = Vec::new();

        for (row_index, row) in rows.iter().enumerate() {
            let mut document = match render(row, mapping) {
                Ok(document) => document,
                Err(SheetToMdError::MissingFilenameValue { column }) => {
                    self.record(
                        &mut errors,
                        row_index,
                        RowErrorReason::MissingFilenameValue { column },
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            document.row_index = Some(row_index);

            if let Err(message) = validate_entry_path(&document.path, &self.security) {
                self.record(
                    &mut errors,
                    row_index,
                    RowErrorReason::InvalidPath {
                        path: document.path,
                        message,
                    },
                );
                continue;
            }

            debug!("Row {} -> {}", row_index, document.path);

            match by_path.get(&document.path) {
                Some(&slot) => {
                    let previous_row = documents[slot].row_index.unwrap_or_default();
                    self.record(
                        &mut errors,
                        row_index,
                        RowErrorReason::DuplicatePath {
                            path: document.path.clone(),
                            previous_row,
                        },
                    );
                    documents[slot] = document;
                }
                None => {
                    by_path.insert(document.path.clone(), documents.len());
                    documents.push(document);
                }
            }
        }

        let archive = self.write_zip(&documents)?;
        let result = BatchResult {
            archive,
            errors,
            total_rows: rows.len(),
        };

        info!(
            "{} ({} entries, {} bytes)",
            result.summary(),
            result.archive.entries().len(),
            result.archive.len()
        );

        Ok(result)
    }

    fn write_zip(&self, documents: &[RenderedDocument]) -> Result<Archive, SheetToMdError> {
        // タイムスタンプを固定し、同じ入力から同じバイト列を得る
        let options = FileOptions::default()
            .compression_method(self.options.compression.method())
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = Vec::with_capacity(documents.len());

        for document in documents {
            zip.start_file(document.path.as_str(), options)?;
            zip.write_all(document.content.as_bytes())?;
            entries.push(ArchiveEntry {
                path: document.path.clone(),
                row_index: document.row_index.unwrap_or_default(),
                size: document.content.len(),
            });
        }

        let bytes = zip.finish()?.into_inner();
        Ok(Archive { bytes, entries })
    }

    fn record(&self, errors: &mut Vec<RowError>, row_index: usize, reason: RowErrorReason) {
        let error = RowError::new(row_index, reason).with_header_row(self.header_row);
        warn!("{}", error);
        errors.push(error);
    }
}

/// デフォルト設定でアーカイブを生成
///
/// `Archiver::default().archive(rows, mapping)`と同じです。
pub fn archive(rows: &[Row], mapping: &ColumnMapping) -> Result<BatchResult, SheetToMdError> {
    Archiver::default().archive(rows, mapping)
}
