//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックを開き最初のシートを読み込みます。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use log::debug;
use std::io::{Cursor, Read, Seek};

use crate::error::SheetToMdError;
use crate::formatter::{CellFormatter, ColumnDateStyle};
use crate::security::SecurityConfig;
use crate::types::{CellValue, Table};

/// ワークブックパーサー
///
/// calamineの自動判別（xlsx, xlsm, xlsb, xls, ods）でワークブックを開きます。
pub(crate) struct WorkbookParser<RS: Read + Seek> {
    workbook: Sheets<RS>,
}

impl WorkbookParser<Cursor<Vec<u8>>> {
    /// 入力全体をメモリに読み込み、ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - スプレッドシートのバイト列を読み込むリーダー
    /// * `security` - 入力サイズの上限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックを開けた場合
    /// * `Err(SheetToMdError::SecurityViolation)` - 入力サイズが上限を超えた場合
    /// * `Err(SheetToMdError::UnreadableSource)` - スプレッドシートとして読めない場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, SheetToMdError> {
        // 上限+1バイトまで読み、超過を検出する
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(security.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > security.max_input_file_size {
            return Err(SheetToMdError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                security.max_input_file_size
            )));
        }

        if buffer.is_empty() {
            return Err(SheetToMdError::UnreadableSource(
                "input is empty".to_string(),
            ));
        }

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))
            .map_err(|e| SheetToMdError::UnreadableSource(e.to_string()))?;

        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> WorkbookParser<RS> {
    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// 最初のシートを読み込んでテーブルを構築
    ///
    /// 2枚目以降のシートは無視します。使用範囲の先頭行をヘッダーとして扱います。
    ///
    /// # 戻り値
    ///
    /// * `Ok(Table)` - 読み込んだテーブル（空のシートは列も行もないテーブル）
    /// * `Err(SheetToMdError::UnreadableSource)` - シートが存在しない、または読めない場合
    pub fn read_first_sheet(&mut self, formatter: &CellFormatter) -> Result<Table, SheetToMdError> {
        let sheet_name = self
            .sheet_names()
            .into_iter()
            .next()
            .ok_or_else(|| SheetToMdError::UnreadableSource("workbook has no sheets".to_string()))?;

        let range = self
            .workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetToMdError::UnreadableSource(e.to_string()))?;

        debug!(
            "Reading sheet '{}' ({} rows x {} cols)",
            sheet_name,
            range.height(),
            range.width()
        );

        build_table(&range, formatter)
    }
}

/// セル範囲からテーブルを構築
fn build_table(range: &Range<Data>, formatter: &CellFormatter) -> Result<Table, SheetToMdError> {
    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Table::default()),
    };
    let data_rows: Vec<&[Data]> = rows.collect();

    // 列ごとの日付スタイルはデータ行全体から決める
    let styles: Vec<ColumnDateStyle> = (0..header.len())
        .map(|col| ColumnDateStyle::detect(data_rows.iter().filter_map(|row| row.get(col))))
        .collect();

    let columns = header
        .iter()
        .map(|cell| {
            formatter
                .format_cell(cell, ColumnDateStyle::default())
                .map(|value| value.to_display().into_owned())
        })
        .collect::<Result<Vec<String>, SheetToMdError>>()?;

    let mut values: Vec<Vec<CellValue>> = Vec::with_capacity(data_rows.len());
    for row in data_rows {
        let converted = row
            .iter()
            .zip(&styles)
            .map(|(cell, style)| formatter.format_cell(cell, *style))
            .collect::<Result<Vec<CellValue>, SheetToMdError>>()?;
        values.push(converted);
    }

    // 使用範囲の先頭行がヘッダー
    let header_row = range.start().map_or(0, |(row, _)| row as usize);
    Ok(Table::new(columns, values).with_header_row(header_row))
}
