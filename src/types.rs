//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use std::borrow::Cow;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列（正規化済みの日付を含む）
    String(String),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空セルかどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 値が空白かどうかを判定
    ///
    /// 空セル、または表示文字列が空白文字のみの場合に`true`。
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) | CellValue::Error(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// 表示用の文字列を取得
    ///
    /// 整数値の数値は小数部なしで出力します（`3.0` → `3`）。
    pub fn to_display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::String(s) => Cow::Borrowed(s),
            CellValue::Bool(b) => Cow::Borrowed(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => Cow::Borrowed(e),
            CellValue::Empty => Cow::Borrowed(""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

fn format_number(n: f64) -> String {
    // 2^53を超える整数はf64で正確に表現できないため、そのまま出力する
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// 1行分のデータ（列名 → 値の順序付きマッピング）
///
/// 読み込み後は変更されません。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    /// 空の行を生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 列を追加した行を返す（テストや手組みの行向け）
    ///
    /// ```rust
    /// use sheet2md::{CellValue, Row};
    ///
    /// let row = Row::new().with("Name", "Item A").with("Count", 3.0);
    /// assert_eq!(row.get("Count"), &CellValue::Number(3.0));
    /// ```
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// 列名を指定して値を取得する
    ///
    /// 行に存在しない列は空セルとして扱います。
    pub fn get(&self, column: &str) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .unwrap_or(EMPTY)
    }

    /// 列名と値のペアを順に返す
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 表形式データ（最初のシートのヘッダー行 + データ行）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    header_row: usize,
}

impl Table {
    /// 列名とデータ行からテーブルを生成
    ///
    /// 列名は[`normalize_headers`]と同じ規則で一意化されます。
    /// 各行の値は列の順に対応付けられ、足りない値は空セルで補われます。
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = normalize_headers(columns);
        let rows = rows
            .into_iter()
            .map(|values| {
                let mut values = values.into_iter();
                columns
                    .iter()
                    .map(|name| (name.clone(), values.next().unwrap_or(CellValue::Empty)))
                    .collect()
            })
            .collect();
        Self {
            columns,
            rows,
            header_row: 0,
        }
    }

    /// ヘッダー行のシート上の位置（0始まり）を指定
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// ヘッダー行のシート上の位置（0始まり）
    ///
    /// シートの先頭に空行がある場合は0以外になります。
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    /// 列名の一覧
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// データ行の一覧
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// 指定位置のデータ行
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// ヘッダー名を一意化する
///
/// - 空のヘッダーは `Unnamed: <列番号>`
/// - 重複したヘッダーは2つ目以降が `<名前>.1`, `<名前>.2`, ...
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(headers.len());
    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {}", index)
        } else {
            header
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while result.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        result.push(name);
    }
    result
}
