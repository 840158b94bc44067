use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use log::info;
use sheet2md::{
    BatchResult, ColumnMapping, Compression, Converter, ConverterBuilder, DateFormat,
    FilenameStyle, Table,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheet2md")]
#[command(about = "Turn spreadsheet rows into Markdown documents with YAML frontmatter")]
#[command(long_about = "Turn spreadsheet rows into Markdown documents with YAML frontmatter.

Every row of the first sheet becomes one Markdown file. Columns are mapped to
the filename, an optional folder, frontmatter properties, labels and
heading/content sections. All documents are bundled into one zip archive.

Set RUST_LOG=debug to see per-row progress.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the column names of the first sheet
    Columns {
        /// Spreadsheet file (.xlsx, .xlsm, .xls, .ods)
        input: PathBuf,
    },

    /// Render a single row and print the resulting document
    Preview {
        /// Spreadsheet file (.xlsx, .xlsm, .xls, .ods)
        input: PathBuf,

        /// Data row to preview (0 = first row after the header)
        #[arg(short, long, default_value_t = 0)]
        row: usize,

        #[command(flatten)]
        mapping: MappingArgs,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Render every row and write the zip archive
    Export {
        /// Spreadsheet file (.xlsx, .xlsm, .xls, .ods)
        input: PathBuf,

        /// Output zip file
        #[arg(short, long, default_value = "markdown_files.zip")]
        output: PathBuf,

        /// Store entries without compression
        #[arg(long)]
        stored: bool,

        #[command(flatten)]
        mapping: MappingArgs,

        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(Args)]
struct MappingArgs {
    /// JSON file with a complete column mapping
    #[arg(long, conflicts_with = "filename")]
    mapping: Option<PathBuf>,

    /// Column used as the filename and title
    #[arg(long, required_unless_present = "mapping")]
    filename: Option<String>,

    /// Column used to group files into folders
    #[arg(long)]
    folder: Option<String>,

    /// Column emitted as a `key: value` frontmatter property (repeatable)
    #[arg(long = "property")]
    properties: Vec<String>,

    /// Column with comma-separated labels (repeatable)
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Heading and content columns as HEADING_COLUMN=CONTENT_COLUMN (repeatable)
    #[arg(long = "section", value_parser = parse_section)]
    sections: Vec<(String, String)>,

    /// Content column whose own name is used as the heading (repeatable)
    #[arg(long = "section-by-name")]
    named_sections: Vec<String>,

    /// Named list property as NAME=COLUMN[,COLUMN...] (repeatable)
    #[arg(long = "list", value_parser = parse_list)]
    lists: Vec<(String, Vec<String>)>,

    /// Lowercase file and folder names and replace spaces with underscores
    #[arg(long)]
    slug: bool,
}

#[derive(Args)]
struct FormatArgs {
    /// Custom date format (chrono syntax, e.g. "%Y/%m/%d")
    #[arg(long)]
    date_format: Option<String>,
}

fn parse_section(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((heading, content)) if !heading.is_empty() && !content.is_empty() => {
            Ok((heading.to_string(), content.to_string()))
        }
        _ => Err(format!(
            "expected HEADING_COLUMN=CONTENT_COLUMN, got '{}'",
            value
        )),
    }
}

fn parse_list(value: &str) -> Result<(String, Vec<String>), String> {
    let (name, columns) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=COLUMN[,COLUMN...], got '{}'", value))?;
    let columns: Vec<String> = columns
        .split(',')
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .map(str::to_string)
        .collect();
    if name.trim().is_empty() || columns.is_empty() {
        return Err(format!("expected NAME=COLUMN[,COLUMN...], got '{}'", value));
    }
    Ok((name.trim().to_string(), columns))
}

/// `--section`と`--section-by-name`の値
enum SectionArg {
    Columns(String, String),
    Named(String),
}

impl MappingArgs {
    /// セクション指定をコマンドラインでの出現順に並べる
    fn ordered_sections(
        sections: Vec<(String, String)>,
        named_sections: Vec<String>,
        matches: &ArgMatches,
    ) -> Vec<SectionArg> {
        let section_indices = matches.indices_of("sections").into_iter().flatten();
        let named_indices = matches.indices_of("named_sections").into_iter().flatten();

        let mut ordered: Vec<(usize, SectionArg)> = section_indices
            .zip(sections)
            .map(|(index, (heading, content))| (index, SectionArg::Columns(heading, content)))
            .chain(
                named_indices
                    .zip(named_sections)
                    .map(|(index, content)| (index, SectionArg::Named(content))),
            )
            .collect();
        ordered.sort_by_key(|(index, _)| *index);
        ordered.into_iter().map(|(_, section)| section).collect()
    }

    fn into_mapping(self, matches: &ArgMatches) -> Result<ColumnMapping> {
        if let Some(path) = self.mapping {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read mapping file: {}", path.display()))?;
            return ColumnMapping::from_json(&json)
                .with_context(|| format!("Invalid mapping file: {}", path.display()));
        }

        let Some(filename) = self.filename else {
            bail!("either --mapping or --filename is required");
        };

        let mut mapping = ColumnMapping::new(filename);
        if let Some(folder) = self.folder {
            mapping = mapping.with_folder_column(folder);
        }
        for column in self.properties {
            mapping = mapping.with_property_column(column);
        }
        for column in self.labels {
            mapping = mapping.with_label_column(column);
        }
        for (name, columns) in self.lists {
            mapping = mapping.with_list_property(name, columns);
        }
        for section in Self::ordered_sections(self.sections, self.named_sections, matches) {
            mapping = match section {
                SectionArg::Columns(heading, content) => mapping.with_section(heading, content),
                SectionArg::Named(content) => mapping.with_column_section(content),
            };
        }
        if self.slug {
            mapping = mapping.with_filename_style(FilenameStyle::Slug);
        }
        Ok(mapping)
    }
}

fn build_converter(date_format: Option<String>, compression: Compression) -> Result<Converter> {
    let mut builder = ConverterBuilder::new().with_compression(compression);
    if let Some(format) = date_format {
        builder = builder.with_date_format(DateFormat::Custom(format));
    }
    Ok(builder.build()?)
}

fn read_table(converter: &Converter, input: &Path) -> Result<Table> {
    let file = File::open(input)
        .with_context(|| format!("Failed to open spreadsheet: {}", input.display()))?;
    converter
        .read_table(BufReader::new(file))
        .with_context(|| format!("Failed to read spreadsheet: {}", input.display()))
}

/// エクスポート後に標準出力へ表示する内容
///
/// 行エラーはバッチ処理中に警告ログとして出力済みのため、ここでは集計のみを表示します。
fn export_report(result: &BatchResult) -> String {
    let mut report = String::new();
    if !result.archive.entries().is_empty() {
        report.push_str(&result.archive.file_tree());
        report.push('\n');
    }
    report.push_str(&result.summary());
    report
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let Some((_, sub_matches)) = matches.subcommand() else {
        bail!("a subcommand is required");
    };

    match cli.command {
        Commands::Columns { input } => {
            let converter = build_converter(None, Compression::default())?;
            let table = read_table(&converter, &input)?;
            for column in table.columns() {
                println!("{}", column);
            }
        }

        Commands::Preview {
            input,
            row,
            mapping,
            format,
        } => {
            let mapping = mapping.into_mapping(sub_matches)?;
            let converter = build_converter(format.date_format, Compression::default())?;
            let table = read_table(&converter, &input)?;
            let document = converter.preview(&table, &mapping, row)?;
            println!("{}", document.path);
            println!();
            print!("{}", document.content);
        }

        Commands::Export {
            input,
            output,
            stored,
            mapping,
            format,
        } => {
            let mapping = mapping.into_mapping(sub_matches)?;
            let compression = if stored {
                Compression::Stored
            } else {
                Compression::Deflated
            };
            let converter = build_converter(format.date_format, compression)?;
            let table = read_table(&converter, &input)?;
            let result = converter.export(&table, &mapping)?;

            std::fs::write(&output, result.archive.bytes())
                .with_context(|| format!("Failed to write archive: {}", output.display()))?;
            info!(
                "Wrote {} ({} bytes)",
                output.display(),
                result.archive.len()
            );

            println!("{}", export_report(&result));
        }
    }

    Ok(())
}
