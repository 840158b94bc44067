//! Parser Module
//!
//! calamineを使用したスプレッドシート読み込みの実装。
//! 最初のシートだけを表形式データ（[`Table`](crate::Table)）として取り出します。

mod workbook;

pub(crate) use workbook::WorkbookParser;
