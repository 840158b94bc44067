//! Path Sanitizing
//!
//! セル値をファイル名・フォルダ名として安全な文字列に変換します。

use crate::api::FilenameStyle;

/// ファイル名の語幹の最大長（バイト）
///
/// `.md`を付けても一般的なファイルシステムの上限（255バイト）に収まる長さ。
pub(crate) const MAX_STEM_BYTES: usize = 200;

/// パスに使えない文字
const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// セル値をパスの1セグメントとして安全な文字列に変換
///
/// 1. 不正な文字と制御文字を`_`に置換
/// 2. 連続する空白を1つの空白にまとめる
/// 3. 前後の空白とドットを取り除く
/// 4. [`MAX_STEM_BYTES`]で切り詰める（文字境界を保つ）
/// 5. `FilenameStyle::Slug`の場合は空白を`_`にして小文字化
///
/// 結果が空文字列になる場合もあります（呼び出し側で扱う）。
pub(crate) fn sanitize_segment(raw: &str, style: FilenameStyle) -> String {
    let mut collapsed = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !collapsed.is_empty() {
            collapsed.push(' ');
        }
        pending_space = false;
        if c.is_control() || ILLEGAL_CHARS.contains(&c) {
            collapsed.push('_');
        } else {
            collapsed.push(c);
        }
    }

    let trimmed = collapsed.trim_matches(|c: char| c == '.' || c == ' ');
    let mut stem = truncate_on_char_boundary(trimmed, MAX_STEM_BYTES).to_string();
    // 切り詰めで末尾に空白やドットが残ることがある
    while stem.ends_with(['.', ' ']) {
        stem.pop();
    }

    match style {
        FilenameStyle::Preserve => stem,
        FilenameStyle::Slug => stem.replace(' ', "_").to_lowercase(),
    }
}

fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preserve(raw: &str) -> String {
        sanitize_segment(raw, FilenameStyle::Preserve)
    }

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(preserve("Item A"), "Item A");
        assert_eq!(preserve("report-2024_v2"), "report-2024_v2");
    }

    #[test]
    fn test_illegal_characters_replaced() {
        assert_eq!(preserve("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(preserve("tab\u{0007}bell"), "tab_bell");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(preserve("  Item \t\n  A  "), "Item A");
    }

    #[test]
    fn test_dots_trimmed() {
        assert_eq!(preserve("..hidden.."), "hidden");
        assert_eq!(preserve("..."), "");
        assert_eq!(preserve("v1.2"), "v1.2");
    }

    #[test]
    fn test_slug_style() {
        assert_eq!(sanitize_segment("Item A", FilenameStyle::Slug), "item_a");
        assert_eq!(
            sanitize_segment("  Big   Report ", FilenameStyle::Slug),
            "big_report"
        );
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        // 3バイト文字を並べて、上限が文字の途中に来るようにする
        let raw = "あ".repeat(100);
        let stem = preserve(&raw);
        assert!(stem.len() <= MAX_STEM_BYTES);
        assert_eq!(stem.len() % 3, 0);
        assert!(stem.chars().all(|c| c == 'あ'));
    }

    #[test]
    fn test_unicode_preserved() {
        assert_eq!(preserve("議事録 2024"), "議事録 2024");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// 結果は常に安全なパスセグメントになる
            #[test]
            fn test_sanitized_segment_is_safe(raw in "\\PC{0,300}") {
                let segment = preserve(&raw);
                prop_assert!(segment.len() <= MAX_STEM_BYTES);
                prop_assert!(!segment.chars().any(|c| ILLEGAL_CHARS.contains(&c) || c.is_control()));
                prop_assert_ne!(segment.as_str(), "..");
                prop_assert!(!segment.starts_with('.') && !segment.ends_with('.'));
            }
        }
    }
}
