//! Document Renderer
//!
//! 1行とマッピングから、YAMLフロントマター付きのMarkdown文書を1つ生成します。
//! 副作用はなく、同じ入力に対して常に同じ結果を返します。

use crate::error::SheetToMdError;
use crate::mapping::{ColumnMapping, HeadingSource};
use crate::sanitize::sanitize_segment;
use crate::types::Row;

/// 1行分の変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// `/`区切りの相対パス（例: `folder/Item A.md`）
    pub path: String,
    /// フロントマターと本文
    pub content: String,
    /// テーブルから生成された場合の行位置（0始まり）
    pub row_index: Option<usize>,
}

/// 1行を1つのMarkdown文書に変換
///
/// # 戻り値
///
/// * `Ok(RenderedDocument)` - 変換結果
/// * `Err(SheetToMdError::MissingFilenameValue)` - ファイル名列の値が空、
///   またはファイル名として使える文字が残らない場合
///
/// # 使用例
///
/// ```rust
/// use sheet2md::{render, ColumnMapping, Row};
///
/// let mapping = ColumnMapping::new("Name")
///     .with_property_column("Status")
///     .with_label_column("Tags")
///     .with_section("SectionTitle", "SectionBody");
/// let row = Row::new()
///     .with("Name", "Item A")
///     .with("Status", "Open")
///     .with("Tags", "x, y")
///     .with("SectionTitle", "Notes")
///     .with("SectionBody", "Hello");
///
/// let document = render(&row, &mapping).unwrap();
/// assert_eq!(document.path, "Item A.md");
/// assert_eq!(
///     document.content,
///     "---\ntitle: Item A\nlabels: [x, y]\nStatus: Open\n---\n\n## Notes\n\nHello\n"
/// );
/// ```
pub fn render(row: &Row, mapping: &ColumnMapping) -> Result<RenderedDocument, SheetToMdError> {
    let path = document_path(row, mapping)?;

    let mut content = render_frontmatter(row, mapping);
    let body = render_sections(row, mapping);
    if !body.is_empty() {
        content.push('\n');
        content.push_str(&body);
        content.push('\n');
    }

    Ok(RenderedDocument {
        path,
        content,
        row_index: None,
    })
}

/// 相対パス（`<folder>/<stem>.md` または `<stem>.md`）を計算
fn document_path(row: &Row, mapping: &ColumnMapping) -> Result<String, SheetToMdError> {
    let missing = || SheetToMdError::MissingFilenameValue {
        column: mapping.filename_column.clone(),
    };

    let value = row.get(&mapping.filename_column);
    if value.is_blank() {
        return Err(missing());
    }
    let stem = sanitize_segment(&value.to_display(), mapping.filename_style);
    if stem.is_empty() {
        return Err(missing());
    }

    // フォルダ列の値が空の場合はルートに置く
    let folder = mapping
        .folder_column
        .as_deref()
        .map(|column| row.get(column))
        .filter(|value| !value.is_blank())
        .map(|value| sanitize_segment(&value.to_display(), mapping.filename_style))
        .filter(|folder| !folder.is_empty());

    Ok(match folder {
        Some(folder) => format!("{}/{}.md", folder, stem),
        None => format!("{}.md", stem),
    })
}

fn render_frontmatter(row: &Row, mapping: &ColumnMapping) -> String {
    let mut out = String::from("---\n");

    out.push_str(&format!(
        "title: {}\n",
        row.get(&mapping.filename_column).to_display()
    ));
    out.push_str(&format!(
        "labels: [{}]\n",
        collect_labels(row, mapping).join(", ")
    ));

    for column in &mapping.property_columns {
        out.push_str(&format!("{}: {}\n", column, row.get(column).to_display()));
    }

    for list in &mapping.list_properties {
        let items: Vec<String> = list
            .columns
            .iter()
            .map(|column| row.get(column))
            .filter(|value| !value.is_blank())
            .map(|value| value.to_display().trim().to_string())
            .collect();
        if items.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", list.name.trim()));
        for item in items {
            out.push_str(&format!("  - {}\n", item));
        }
    }

    out.push_str("---\n");
    out
}

/// ラベル列の値をカンマで分割し、順序を保ったまま連結
///
/// 重複は取り除きません。
pub(crate) fn collect_labels(row: &Row, mapping: &ColumnMapping) -> Vec<String> {
    mapping
        .label_columns
        .iter()
        .flat_map(|column| {
            row.get(column)
                .to_display()
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn render_sections(row: &Row, mapping: &ColumnMapping) -> String {
    let blocks: Vec<String> = mapping
        .section_mappings
        .iter()
        .map(|section| {
            let heading = match &section.heading {
                HeadingSource::Column(column) => row.get(column).to_display().into_owned(),
                HeadingSource::Text(text) => text.clone(),
            };
            let content = row.get(&section.content_column);

            let mut block = format!("## {}", heading);
            if !content.is_blank() {
                block.push_str("\n\n");
                block.push_str(&content.to_display());
            }
            block
        })
        .collect();

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FilenameStyle;
    use crate::types::CellValue;

    fn scenario_mapping() -> ColumnMapping {
        ColumnMapping::new("Name")
            .with_property_column("Status")
            .with_label_column("Tags")
            .with_section("SectionTitle", "SectionBody")
    }

    fn scenario_row() -> Row {
        Row::new()
            .with("Name", "Item A")
            .with("Status", "Open")
            .with("Tags", "x, y")
            .with("SectionTitle", "Notes")
            .with("SectionBody", "Hello")
    }

    #[test]
    fn test_render_scenario() {
        let document = render(&scenario_row(), &scenario_mapping()).unwrap();
        assert_eq!(document.path, "Item A.md");
        assert_eq!(
            document.content,
            "---\ntitle: Item A\nlabels: [x, y]\nStatus: Open\n---\n\n## Notes\n\nHello\n"
        );
        assert_eq!(document.row_index, None);
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render(&scenario_row(), &scenario_mapping()).unwrap();
        let second = render(&scenario_row(), &scenario_mapping()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_filename_value() {
        let mapping = ColumnMapping::new("Name");
        for row in [
            Row::new().with("Name", ""),
            Row::new().with("Name", "   "),
            Row::new().with("Name", CellValue::Empty),
            Row::new(),
        ] {
            match render(&row, &mapping) {
                Err(SheetToMdError::MissingFilenameValue { column }) => assert_eq!(column, "Name"),
                other => panic!("Expected MissingFilenameValue, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_filename_sanitized_to_empty_is_missing() {
        let mapping = ColumnMapping::new("Name");
        let row = Row::new().with("Name", "...");
        assert!(matches!(
            render(&row, &mapping),
            Err(SheetToMdError::MissingFilenameValue { .. })
        ));
    }

    #[test]
    fn test_title_is_unsanitized() {
        let mapping = ColumnMapping::new("Name");
        let row = Row::new().with("Name", "Q1/Q2: Plan");
        let document = render(&row, &mapping).unwrap();
        assert_eq!(document.path, "Q1_Q2_ Plan.md");
        assert!(document.content.contains("title: Q1/Q2: Plan\n"));
    }

    #[test]
    fn test_numeric_filename() {
        let mapping = ColumnMapping::new("Id");
        let row = Row::new().with("Id", 42.0);
        let document = render(&row, &mapping).unwrap();
        assert_eq!(document.path, "42.md");
        assert!(document.content.contains("title: 42\n"));
    }

    #[test]
    fn test_folder_column() {
        let mapping = ColumnMapping::new("Name").with_folder_column("Dept");
        let row = Row::new().with("Name", "Item A").with("Dept", "R&D / Lab");
        assert_eq!(render(&row, &mapping).unwrap().path, "R&D _ Lab/Item A.md");

        // フォルダ値が空ならルートに置く
        let row = Row::new().with("Name", "Item A").with("Dept", "");
        assert_eq!(render(&row, &mapping).unwrap().path, "Item A.md");

        let row = Row::new().with("Name", "Item A").with("Dept", "..");
        assert_eq!(render(&row, &mapping).unwrap().path, "Item A.md");
    }

    #[test]
    fn test_slug_style_applies_to_folder_and_filename() {
        let mapping = ColumnMapping::new("Name")
            .with_folder_column("Dept")
            .with_filename_style(FilenameStyle::Slug);
        let row = Row::new().with("Name", "Item A").with("Dept", "Sales Team");
        let document = render(&row, &mapping).unwrap();
        assert_eq!(document.path, "sales_team/item_a.md");
        assert!(document.content.contains("title: Item A\n"));
    }

    #[test]
    fn test_empty_property_value_keeps_key() {
        let mapping = ColumnMapping::new("Name")
            .with_property_column("Status")
            .with_property_column("Owner");
        let row = Row::new().with("Name", "A").with("Status", "").with("Owner", "kim");
        let document = render(&row, &mapping).unwrap();
        assert_eq!(
            document.content,
            "---\ntitle: A\nlabels: []\nStatus: \nOwner: kim\n---\n"
        );
    }

    #[test]
    fn test_labels_flattened_in_order_without_dedup() {
        let mapping = ColumnMapping::new("Name")
            .with_label_column("Tags")
            .with_label_column("More");
        let row = Row::new()
            .with("Name", "A")
            .with("Tags", " b, a ,, ")
            .with("More", "a,c");
        assert_eq!(collect_labels(&row, &mapping), vec!["b", "a", "a", "c"]);
        let document = render(&row, &mapping).unwrap();
        assert!(document.content.contains("labels: [b, a, a, c]\n"));
    }

    #[test]
    fn test_list_properties() {
        let mapping = ColumnMapping::new("Name")
            .with_property_column("Status")
            .with_list_property("products", ["P1", "P2", "P3"])
            .with_list_property("owners", ["O1"]);
        let row = Row::new()
            .with("Name", "A")
            .with("Status", "Open")
            .with("P1", " mdf ")
            .with("P2", "")
            .with("P3", "ePro")
            .with("O1", "");
        let document = render(&row, &mapping).unwrap();
        // 値がすべて空のリストは出力しない
        assert_eq!(
            document.content,
            "---\ntitle: A\nlabels: []\nStatus: Open\nproducts:\n  - mdf\n  - ePro\n---\n"
        );
    }

    #[test]
    fn test_multiple_sections_and_empty_values() {
        let mapping = ColumnMapping::new("Name")
            .with_section("H1", "B1")
            .with_section("H2", "B2")
            .with_column_section("B3");
        let row = Row::new()
            .with("Name", "A")
            .with("H1", "")
            .with("B1", "first")
            .with("H2", "Second")
            .with("B2", "")
            .with("B3", "**bold** | raw");
        let document = render(&row, &mapping).unwrap();
        assert_eq!(
            document.content,
            "---\ntitle: A\nlabels: []\n---\n\n## \n\nfirst\n\n## Second\n\n## B3\n\n**bold** | raw\n"
        );
    }

    #[test]
    fn test_same_column_in_multiple_roles() {
        let mapping = ColumnMapping::new("Name")
            .with_property_column("Name")
            .with_label_column("Name")
            .with_section("Name", "Name");
        let row = Row::new().with("Name", "A");
        let document = render(&row, &mapping).unwrap();
        assert_eq!(
            document.content,
            "---\ntitle: A\nlabels: [A]\nName: A\n---\n\n## A\n\nA\n"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// ラベル数はカンマ区切りの空でないトークン数に等しい
            #[test]
            fn test_label_count(tags in "[a-z ,]{0,30}", more in "[a-z ,]{0,30}") {
                let mapping = ColumnMapping::new("Name")
                    .with_label_column("Tags")
                    .with_label_column("More");
                let row = Row::new().with("Name", "n").with("Tags", tags.as_str()).with("More", more.as_str());

                let expected = [&tags, &more]
                    .iter()
                    .flat_map(|value| value.split(','))
                    .filter(|token| !token.trim().is_empty())
                    .count();
                prop_assert_eq!(collect_labels(&row, &mapping).len(), expected);
            }

            /// 同じ行とマッピングからは常に同じ文書が得られる
            #[test]
            fn test_render_deterministic(name in "\\PC{1,20}", body in "\\PC{0,40}") {
                let mapping = ColumnMapping::new("Name").with_column_section("Body");
                let row = Row::new().with("Name", name.as_str()).with("Body", body.as_str());
                prop_assert_eq!(render(&row, &mapping).ok(), render(&row, &mapping).ok());
            }
        }
    }
}
