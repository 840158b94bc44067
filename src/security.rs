//! Security Module
//!
//! 入力サイズの制限と、アーカイブに書き込むエントリ名の検証を提供します。

/// セキュリティ設定
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
    /// アーカイブのエントリ名の最大長（バイト）
    /// デフォルト: 1024
    pub max_entry_path_len: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
            max_entry_path_len: 1024,
        }
    }
}

/// アーカイブのエントリ名の検証
///
/// 展開時のパストラバーサルを防ぐため、生成したパスを書き込み前に検証します。
///
/// # 引数
///
/// * `path` - 検証するエントリ名（`/`区切りの相対パス）
/// * `config` - セキュリティ設定
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_entry_path(path: &str, config: &SecurityConfig) -> Result<(), String> {
    // 空のパスは拒否
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    if path.len() > config.max_entry_path_len {
        return Err(format!(
            "Path is too long: {} bytes (max: {} bytes)",
            path.len(),
            config.max_entry_path_len
        ));
    }

    // 絶対パスを拒否（Unix形式の`/`やWindows形式の`C:`で始まるパス）
    let bytes = path.as_bytes();
    if path.starts_with('/') || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':') {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    // `\`を含むパスを拒否（Windows形式のパスセパレータ）
    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    // `.`や`..`、空のセグメントを拒否（ディレクトリトラバーサル攻撃）
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(format!("Path traversal detected: {}", path));
    }

    Ok(())
}
