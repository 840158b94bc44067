//! Preview Surface
//!
//! 一括出力の前に、1行分の変換結果を確認するための読み取り専用の操作。
//! アーカイバーの状態には一切触れないため、何度呼び出しても後続の
//! [`archive`](crate::archive)の結果は変わりません。

use log::debug;

use crate::error::SheetToMdError;
use crate::mapping::ColumnMapping;
use crate::renderer::{render, RenderedDocument};
use crate::types::{Row, Table};

/// 1行をプレビュー用に変換
///
/// [`render`]と同じ結果を返します。
pub fn preview(row: &Row, mapping: &ColumnMapping) -> Result<RenderedDocument, SheetToMdError> {
    render(row, mapping)
}

/// テーブルの指定行をプレビュー用に変換
///
/// # 戻り値
///
/// * `Ok(RenderedDocument)` - 変換結果（`row_index`付き）
/// * `Err(SheetToMdError::Config)` - 行位置が範囲外の場合
/// * `Err(SheetToMdError::MissingFilenameValue)` - ファイル名列の値が空の場合
pub fn preview_row(
    table: &Table,
    mapping: &ColumnMapping,
    row_index: usize,
) -> Result<RenderedDocument, SheetToMdError> {
    let row = table.row(row_index).ok_or_else(|| {
        SheetToMdError::Config(format!(
            "Row index {} is out of range (total: {})",
            row_index,
            table.len()
        ))
    })?;

    debug!("Previewing row {}", row_index);

    let mut document = preview(row, mapping)?;
    document.row_index = Some(row_index);
    Ok(document)
}
