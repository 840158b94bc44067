//! Column Mapping Module
//!
//! スプレッドシートの列を文書の各部分（ファイル名、フォルダ、フロントマター、
//! 見出しと本文）に対応付ける設定を定義するモジュール。
//!
//! マッピングは不変の値としてレンダラーに渡されます。プログラムから`with_*`
//! メソッドで組み立てるか、JSONから読み込みます。
//!
//! ```rust
//! use sheet2md::ColumnMapping;
//!
//! let mapping = ColumnMapping::new("Name")
//!     .with_property_column("Status")
//!     .with_label_column("Tags")
//!     .with_section("SectionTitle", "SectionBody");
//!
//! let columns: Vec<String> = ["Name", "Status", "Tags", "SectionTitle", "SectionBody"]
//!     .iter()
//!     .map(|c| c.to_string())
//!     .collect();
//! assert!(mapping.validate(&columns).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::FilenameStyle;
use crate::error::SheetToMdError;

/// フロントマターで予約されているキー
const RESERVED_KEYS: [&str; 2] = ["title", "labels"];

/// 列の対応付け設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    /// ファイル名に使う列（必須）
    pub filename_column: String,

    /// フォルダ分けに使う列
    #[serde(default)]
    pub folder_column: Option<String>,

    /// `key: value` としてフロントマターに出力する列
    #[serde(default)]
    pub property_columns: Vec<String>,

    /// カンマ区切りの値を`labels`リストにまとめる列
    #[serde(default)]
    pub label_columns: Vec<String>,

    /// 複数列の値を名前付きのリストとして出力するプロパティ
    #[serde(default)]
    pub list_properties: Vec<ListProperty>,

    /// 見出しと本文のペア
    #[serde(default)]
    pub section_mappings: Vec<SectionMapping>,

    /// ファイル名・フォルダ名の生成方式
    #[serde(default)]
    pub filename_style: FilenameStyle,
}

/// 名前付きリストプロパティ
///
/// ```yaml
/// products:
///   - mdf
///   - ePro
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListProperty {
    pub name: String,
    pub columns: Vec<String>,
}

/// 見出しと本文の対応付け
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionMapping {
    pub heading: HeadingSource,
    pub content_column: String,
}

/// 見出しテキストの取得元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingSource {
    /// 列の値を見出しにする
    Column(String),
    /// 固定の文字列を見出しにする
    Text(String),
}

/// マッピング内で列が担う役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingRole {
    Filename,
    Folder,
    Property,
    Label,
    ListProperty,
    SectionHeading,
    SectionContent,
}

impl fmt::Display for MappingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingRole::Filename => "filename",
            MappingRole::Folder => "folder",
            MappingRole::Property => "property",
            MappingRole::Label => "label",
            MappingRole::ListProperty => "list property",
            MappingRole::SectionHeading => "section heading",
            MappingRole::SectionContent => "section content",
        };
        f.write_str(name)
    }
}

impl ColumnMapping {
    /// ファイル名列だけを指定したマッピングを生成
    pub fn new(filename_column: impl Into<String>) -> Self {
        Self {
            filename_column: filename_column.into(),
            folder_column: None,
            property_columns: Vec::new(),
            label_columns: Vec::new(),
            list_properties: Vec::new(),
            section_mappings: Vec::new(),
            filename_style: FilenameStyle::default(),
        }
    }

    /// JSON文字列からマッピングを読み込む
    pub fn from_json(json: &str) -> Result<Self, SheetToMdError> {
        serde_json::from_str(json)
            .map_err(|e| SheetToMdError::Config(format!("Invalid mapping JSON: {}", e)))
    }

    pub fn with_folder_column(mut self, column: impl Into<String>) -> Self {
        self.folder_column = Some(column.into());
        self
    }

    pub fn with_property_column(mut self, column: impl Into<String>) -> Self {
        self.property_columns.push(column.into());
        self
    }

    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_columns.push(column.into());
        self
    }

    pub fn with_list_property<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_properties.push(ListProperty {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// 見出し列と本文列のペアを追加
    pub fn with_section(
        mut self,
        heading_column: impl Into<String>,
        content_column: impl Into<String>,
    ) -> Self {
        self.section_mappings.push(SectionMapping {
            heading: HeadingSource::Column(heading_column.into()),
            content_column: content_column.into(),
        });
        self
    }

    /// 本文列の列名を見出しにしたセクションを追加
    pub fn with_column_section(mut self, content_column: impl Into<String>) -> Self {
        let content_column = content_column.into();
        self.section_mappings.push(SectionMapping {
            heading: HeadingSource::Text(content_column.clone()),
            content_column,
        });
        self
    }

    pub fn with_filename_style(mut self, style: FilenameStyle) -> Self {
        self.filename_style = style;
        self
    }

    /// マッピングが参照するすべての列を役割付きで列挙
    ///
    /// 同じ列が複数の役割で現れた場合もそのまま列挙します。
    pub fn references(&self) -> Vec<(MappingRole, &str)> {
        let mut refs = vec![(MappingRole::Filename, self.filename_column.as_str())];
        if let Some(folder) = &self.folder_column {
            refs.push((MappingRole::Folder, folder));
        }
        refs.extend(
            self.property_columns
                .iter()
                .map(|c| (MappingRole::Property, c.as_str())),
        );
        refs.extend(
            self.label_columns
                .iter()
                .map(|c| (MappingRole::Label, c.as_str())),
        );
        for list in &self.list_properties {
            refs.extend(
                list.columns
                    .iter()
                    .map(|c| (MappingRole::ListProperty, c.as_str())),
            );
        }
        for section in &self.section_mappings {
            if let HeadingSource::Column(column) = &section.heading {
                refs.push((MappingRole::SectionHeading, column));
            }
            refs.push((MappingRole::SectionContent, &section.content_column));
        }
        refs
    }

    /// 入力テーブルの列名に対してマッピングを検証
    ///
    /// 行の処理を始める前に呼び出し、設定の誤りを早期に報告します。
    ///
    /// # 発生し得るエラー
    ///
    /// * `SheetToMdError::InvalidMappingReference` - 存在しない列を参照している
    /// * `SheetToMdError::Config` - リストプロパティ名が空、予約キー、または重複
    pub fn validate(&self, columns: &[String]) -> Result<(), SheetToMdError> {
        // 1. 列参照の検証
        for (role, column) in self.references() {
            if !columns.iter().any(|c| c == column) {
                return Err(SheetToMdError::InvalidMappingReference {
                    role,
                    column: column.to_string(),
                });
            }
        }

        // 2. リストプロパティ名の検証
        let mut seen: Vec<&str> = Vec::new();
        for list in &self.list_properties {
            let name = list.name.trim();
            if name.is_empty() {
                return Err(SheetToMdError::Config(
                    "List property name must not be empty".to_string(),
                ));
            }
            if RESERVED_KEYS.contains(&name) {
                return Err(SheetToMdError::Config(format!(
                    "List property name '{}' is reserved",
                    name
                )));
            }
            if seen.contains(&name) {
                return Err(SheetToMdError::Config(format!(
                    "Duplicate list property name '{}'",
                    name
                )));
            }
            seen.push(name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_new_defaults() {
        let mapping = ColumnMapping::new("Name");
        assert_eq!(mapping.filename_column, "Name");
        assert!(mapping.folder_column.is_none());
        assert!(mapping.property_columns.is_empty());
        assert_eq!(mapping.filename_style, FilenameStyle::Preserve);
    }

    #[test]
    fn test_builder_method_chaining() {
        let mapping = ColumnMapping::new("Name")
            .with_folder_column("Dept")
            .with_property_column("Status")
            .with_property_column("Owner")
            .with_label_column("Tags")
            .with_list_property("products", ["P1", "P2"])
            .with_section("Title", "Body")
            .with_column_section("Notes")
            .with_filename_style(FilenameStyle::Slug);

        assert_eq!(mapping.folder_column.as_deref(), Some("Dept"));
        assert_eq!(mapping.property_columns, vec!["Status", "Owner"]);
        assert_eq!(mapping.list_properties[0].columns, vec!["P1", "P2"]);
        assert_eq!(
            mapping.section_mappings[1].heading,
            HeadingSource::Text("Notes".to_string())
        );
        assert_eq!(mapping.filename_style, FilenameStyle::Slug);
    }

    #[test]
    fn test_validate_success_with_shared_columns() {
        // 同じ列を複数の役割で使うのは正当
        let mapping = ColumnMapping::new("Name")
            .with_label_column("Tags")
            .with_section("Tags", "Body")
            .with_property_column("Name");
        assert!(mapping.validate(&columns(&["Name", "Tags", "Body"])).is_ok());
    }

    #[test]
    fn test_validate_missing_filename_column() {
        let mapping = ColumnMapping::new("Title");
        match mapping.validate(&columns(&["Name"])) {
            Err(SheetToMdError::InvalidMappingReference { role, column }) => {
                assert_eq!(role, MappingRole::Filename);
                assert_eq!(column, "Title");
            }
            other => panic!("Expected InvalidMappingReference, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_section_heading_column() {
        let mapping = ColumnMapping::new("Name").with_section("Heading", "Name");
        match mapping.validate(&columns(&["Name"])) {
            Err(SheetToMdError::InvalidMappingReference { role, .. }) => {
                assert_eq!(role, MappingRole::SectionHeading);
            }
            other => panic!("Expected InvalidMappingReference, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_text_heading_needs_no_column() {
        let mapping = ColumnMapping {
            section_mappings: vec![SectionMapping {
                heading: HeadingSource::Text("Overview".to_string()),
                content_column: "Body".to_string(),
            }],
            ..ColumnMapping::new("Name")
        };
        assert!(mapping.validate(&columns(&["Name", "Body"])).is_ok());
    }

    #[test]
    fn test_validate_list_property_names() {
        let cols = columns(&["Name", "A"]);

        let reserved = ColumnMapping::new("Name").with_list_property("labels", ["A"]);
        assert!(matches!(
            reserved.validate(&cols),
            Err(SheetToMdError::Config(msg)) if msg.contains("reserved")
        ));

        let empty = ColumnMapping::new("Name").with_list_property("  ", ["A"]);
        assert!(matches!(empty.validate(&cols), Err(SheetToMdError::Config(_))));

        let duplicate = ColumnMapping::new("Name")
            .with_list_property("products", ["A"])
            .with_list_property("products", ["A"]);
        assert!(matches!(
            duplicate.validate(&cols),
            Err(SheetToMdError::Config(msg)) if msg.contains("Duplicate")
        ));
    }

    #[test]
    fn test_references_order() {
        let mapping = ColumnMapping::new("Name")
            .with_folder_column("Dept")
            .with_section("H", "B");
        let roles: Vec<MappingRole> = mapping.references().iter().map(|(r, _)| *r).collect();
        assert_eq!(
            roles,
            vec![
                MappingRole::Filename,
                MappingRole::Folder,
                MappingRole::SectionHeading,
                MappingRole::SectionContent
            ]
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "filename_column": "Name",
            "folder_column": "Dept",
            "property_columns": ["Status"],
            "label_columns": ["Tags"],
            "list_properties": [{"name": "products", "columns": ["P1", "P2"]}],
            "section_mappings": [
                {"heading": {"column": "SectionTitle"}, "content_column": "SectionBody"},
                {"heading": {"text": "Notes"}, "content_column": "Notes"}
            ],
            "filename_style": "slug"
        }"#;
        let mapping = ColumnMapping::from_json(json).unwrap();
        let expected = ColumnMapping::new("Name")
            .with_folder_column("Dept")
            .with_property_column("Status")
            .with_label_column("Tags")
            .with_list_property("products", ["P1", "P2"])
            .with_section("SectionTitle", "SectionBody")
            .with_column_section("Notes")
            .with_filename_style(FilenameStyle::Slug);
        assert_eq!(mapping, expected);
    }

    #[test]
    fn test_from_json_minimal_and_invalid() {
        let mapping = ColumnMapping::from_json(r#"{"filename_column": "Name"}"#).unwrap();
        assert_eq!(mapping, ColumnMapping::new("Name"));

        let result = ColumnMapping::from_json(r#"{"filename": "Name"}"#);
        assert!(matches!(result, Err(SheetToMdError::Config(_))));
    }
}
