//! Formatter Module
//!
//! calamineのセル値を[`CellValue`]へ変換するモジュール。
//! 日付セルは列単位で表示文字列へ正規化します。

use calamine::{Data, ExcelDateTime};
use chrono::{DurationRound, NaiveDateTime, TimeDelta};

use crate::api::DateFormat;
use crate::error::SheetToMdError;
use crate::types::CellValue;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// 扱えるシリアル値の絶対値の上限（9999-12-31 = 2958465）
const MAX_SERIAL_DAYS: f64 = 3_000_000.0;

/// 列ごとの日付出力スタイル
///
/// 同じ列の日付は、ファイル名にもフロントマターにも同じ表記で現れる必要があるため、
/// 列全体を走査してから決定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ColumnDateStyle {
    /// 列内のいずれかの日付セルが時刻を持つ
    pub with_time: bool,
}

impl ColumnDateStyle {
    /// 列のセルを走査してスタイルを決定
    pub fn detect<'a>(cells: impl IntoIterator<Item = &'a Data>) -> Self {
        let with_time = cells.into_iter().any(|cell| match cell {
            Data::DateTime(dt) if !dt.is_duration() => has_time_of_day(dt.as_f64()),
            _ => false,
        });
        Self { with_time }
    }
}

/// セルフォーマッター
///
/// セル値の変換処理のファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。
/// 1900年システム・1904年システムのどちらもcalamineの`ExcelDateTime`が持つ
/// エポック情報に従って処理します。
#[derive(Debug)]
pub(crate) struct DateFormatter {
    date_format: DateFormat,
}

impl DateFormatter {
    /// 日付値をフォーマット
    ///
    /// # エポックシステム
    ///
    /// - 1900年システム: 1899-12-30 起算（シリアル値45658 = 2025-01-01）
    /// - 1904年システム: 1904-01-01 起算（シリアル値0 = 1904-01-01）
    ///
    /// 時刻は秒単位に丸めます。
    pub fn format(
        &self,
        value: &ExcelDateTime,
        style: ColumnDateStyle,
    ) -> Result<String, SheetToMdError> {
        let datetime = to_datetime(value)?;

        let formatted = match &self.date_format {
            DateFormat::Iso8601 if style.with_time => {
                datetime.format("%Y-%m-%d %H:%M:%S").to_string()
            }
            DateFormat::Iso8601 => datetime.format("%Y-%m-%d").to_string(),
            DateFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        };

        Ok(formatted)
    }
}

fn to_datetime(value: &ExcelDateTime) -> Result<NaiveDateTime, SheetToMdError> {
    let serial_value = value.as_f64();
    let out_of_range = || {
        SheetToMdError::Config(format!(
            "Date value out of range: serial_value={}",
            serial_value
        ))
    };

    // 範囲外の値はchronoのミリ秒変換でpanicする
    if !serial_value.is_finite() || serial_value.abs() > MAX_SERIAL_DAYS {
        return Err(out_of_range());
    }

    value
        .as_datetime()
        .ok_or_else(out_of_range)?
        .duration_round(TimeDelta::seconds(1))
        .map_err(|_| out_of_range())
}

fn has_time_of_day(serial_value: f64) -> bool {
    let seconds = ((serial_value - serial_value.floor()) * SECONDS_PER_DAY).round() as i64;
    seconds != 0 && seconds != SECONDS_PER_DAY as i64
}

/// 経過時間を `H:MM:SS` 形式でフォーマット
fn format_duration(serial_value: f64) -> String {
    let total = (serial_value.abs() * SECONDS_PER_DAY).round() as i64;
    let sign = if serial_value < 0.0 { "-" } else { "" };
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTime, ExcelDateTimeType};

    fn date(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
    }

    fn date_1904(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, true))
    }

    fn duration(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::TimeDelta, false))
    }

    #[test]
    fn test_format_scalars() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let style = ColumnDateStyle::default();

        assert_eq!(
            formatter.format_cell(&Data::Int(7), style).unwrap(),
            CellValue::Number(7.0)
        );
        assert_eq!(
            formatter.format_cell(&Data::Float(1.5), style).unwrap(),
            CellValue::Number(1.5)
        );
        assert_eq!(
            formatter
                .format_cell(&Data::String("abc".to_string()), style)
                .unwrap(),
            CellValue::String("abc".to_string())
        );
        assert_eq!(
            formatter.format_cell(&Data::Bool(true), style).unwrap(),
            CellValue::Bool(true)
        );
        assert_eq!(
            formatter.format_cell(&Data::Empty, style).unwrap(),
            CellValue::Empty
        );
    }

    #[test]
    fn test_format_error_cell() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let value = formatter
            .format_cell(&Data::Error(CellErrorType::Div0), ColumnDateStyle::default())
            .unwrap();
        assert_eq!(value, CellValue::Error("#DIV/0!".to_string()));
    }

    #[test]
    fn test_date_formatter_iso8601() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let style = ColumnDateStyle::default();

        assert_eq!(
            formatter.format_cell(&date(45658.0), style).unwrap(),
            CellValue::String("2025-01-01".to_string())
        );
        assert_eq!(
            formatter.format_cell(&date(45366.0), style).unwrap(),
            CellValue::String("2024-03-15".to_string())
        );
    }

    #[test]
    fn test_date_formatter_1904_system() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let style = ColumnDateStyle::default();

        // シリアル値0 = 1904-01-01
        assert_eq!(
            formatter.format_cell(&date_1904(0.0), style).unwrap(),
            CellValue::String("1904-01-01".to_string())
        );
        // 1900年システムとの差は1462日
        assert_eq!(
            formatter.format_cell(&date_1904(45658.0 - 1462.0), style).unwrap(),
            CellValue::String("2025-01-01".to_string())
        );
    }

    #[test]
    fn test_date_out_of_range_is_error() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let style = ColumnDateStyle::default();

        for serial in [1e20, -1e20, f64::INFINITY, f64::NAN, 3_000_001.0] {
            match formatter.format_cell(&date(serial), style) {
                Err(SheetToMdError::Config(msg)) => assert!(msg.contains("out of range")),
                other => panic!("Expected Config error for {}, got {:?}", serial, other),
            }
        }
        // 1904年システムでも同じ
        assert!(formatter.format_cell(&date_1904(1e20), style).is_err());
    }

    #[test]
    fn test_date_formatter_with_time() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        let style = ColumnDateStyle { with_time: true };

        // 0.5日 = 12:00:00
        assert_eq!(
            formatter.format_cell(&date(45366.5), style).unwrap(),
            CellValue::String("2024-03-15 12:00:00".to_string())
        );
        // 時刻を持たないセルも列のスタイルに合わせる
        assert_eq!(
            formatter.format_cell(&date(45366.0), style).unwrap(),
            CellValue::String("2024-03-15 00:00:00".to_string())
        );
    }

    #[test]
    fn test_date_formatter_custom() {
        let formatter = CellFormatter::new(DateFormat::Custom("%d/%m/%Y".to_string()));
        assert_eq!(
            formatter
                .format_cell(&date(45366.0), ColumnDateStyle::default())
                .unwrap(),
            CellValue::String("15/03/2024".to_string())
        );
    }

    #[test]
    fn test_column_date_style_detect() {
        let cells = vec![date(45366.0), Data::String("x".to_string()), date(45367.25)];
        assert!(ColumnDateStyle::detect(&cells).with_time);

        let cells = vec![date(45366.0), Data::Empty, Data::Float(0.5)];
        assert!(!ColumnDateStyle::detect(&cells).with_time);

        // 経過時間は日付スタイルに影響しない
        let cells = vec![duration(0.5)];
        assert!(!ColumnDateStyle::detect(&cells).with_time);
    }

    #[test]
    fn test_format_duration() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        assert_eq!(
            formatter
                .format_cell(&duration(1.5), ColumnDateStyle::default())
                .unwrap(),
            CellValue::String("36:00:00".to_string())
        );
        assert_eq!(format_duration(0.0), "0:00:00");
        assert_eq!(format_duration(-1.0 / 24.0), "-1:00:00");
    }

    #[test]
    fn test_iso_strings_pass_through() {
        let formatter = CellFormatter::new(DateFormat::Iso8601);
        assert_eq!(
            formatter
                .format_cell(
                    &Data::DateTimeIso("2024-03-15T10:00:00".to_string()),
                    ColumnDateStyle::default()
                )
                .unwrap(),
            CellValue::String("2024-03-15T10:00:00".to_string())
        );
    }
}
