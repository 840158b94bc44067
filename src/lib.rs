//! sheet2md - スプレッドシートの各行をYAMLフロントマター付きのMarkdown文書に変換する
//!
//! 最初のシートの各行を1つのMarkdownファイルに変換し、ZIPアーカイブにまとめます。
//! どの列をファイル名・フォルダ・プロパティ・ラベル・セクションに使うかは
//! [`ColumnMapping`]で指定します。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheet2md::{ColumnMapping, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let mapping = ColumnMapping::new("Name")
//!         .with_folder_column("Category")
//!         .with_property_column("Status")
//!         .with_label_column("Tags")
//!         .with_section("SectionTitle", "SectionBody");
//!
//!     let result = converter.convert(File::open("items.xlsx")?, &mapping)?;
//!     std::fs::write("markdown_files.zip", result.archive.bytes())?;
//!
//!     // 例: "312 of 315 rows converted, 3 skipped: rows 4, 88, 201"
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```
//!
//! # Preview
//!
//! 一括出力の前に1行だけ変換結果を確認できます。プレビューは状態を持たないため、
//! 何度呼び出しても後のアーカイブには影響しません。
//!
//! ```rust,no_run
//! use std::fs::File;
//! use sheet2md::{ColumnMapping, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let table = converter.read_table(File::open("items.xlsx")?)?;
//!     let mapping = ColumnMapping::new(table.columns()[0].clone());
//!
//!     let document = converter.preview(&table, &mapping, 0)?;
//!     println!("{}\n{}", document.path, document.content);
//!     Ok(())
//! }
//! ```
//!
//! # Pure functions
//!
//! 変換の中核はUIや入出力から独立した純粋関数です。
//!
//! ```rust
//! use sheet2md::{archive, render, ColumnMapping, Row};
//!
//! let mapping = ColumnMapping::new("Name").with_label_column("Tags");
//! let rows = vec![
//!     Row::new().with("Name", "a").with("Tags", "x"),
//!     Row::new().with("Name", "").with("Tags", "y"),
//! ];
//!
//! let document = render(&rows[0], &mapping).unwrap();
//! assert_eq!(document.path, "a.md");
//!
//! let result = archive(&rows, &mapping).unwrap();
//! assert_eq!(result.archive.entries().len(), 1);
//! assert_eq!(result.errors.len(), 1);
//! ```

mod api;
mod archive;
mod builder;
mod error;
mod formatter;
mod mapping;
mod parser;
mod preview;
mod renderer;
mod sanitize;
mod security;
mod types;

// 公開API
pub use api::{Compression, DateFormat, FilenameStyle};
pub use archive::{archive, Archive, ArchiveEntry, ArchiveOptions, Archiver, BatchResult};
pub use builder::{Converter, ConverterBuilder};
pub use error::{RowError, RowErrorReason, SheetToMdError};
pub use mapping::{ColumnMapping, HeadingSource, ListProperty, MappingRole, SectionMapping};
pub use preview::{preview, preview_row};
pub use renderer::{render, RenderedDocument};
pub use types::{normalize_headers, CellValue, Row, Table};
