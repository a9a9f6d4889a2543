use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::ConvertError;
use crate::models::conversion::ExtensionSet;
use crate::service::traits::i_service::FileServiceTrait;

/// 目錄遞迴深度上限
pub const MAX_DEPTH: usize = 32;

/// 檔案服務，負責掃描可轉換的文件
pub struct FileService {
    max_depth: usize,
}

impl FileService {
    pub fn new() -> Self {
        FileService { max_depth: MAX_DEPTH }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        FileService { max_depth }
    }
}

impl Default for FileService {
    fn default() -> Self {
        Self::new()
    }
}

impl FileServiceTrait for FileService {
    fn discover(&self, root: &Path, extensions: &ExtensionSet) -> Result<Vec<PathBuf>, ConvertError> {
        collect_files(root, extensions, self.max_depth)
    }
}

/// 遞迴收集副檔名符合的檔案；同一目錄內依檔名排序，確保重複掃描的順序一致
pub fn collect_files(
    root: &Path,
    extensions: &ExtensionSet,
    max_depth: usize,
) -> Result<Vec<PathBuf>, ConvertError> {
    if !root.is_dir() {
        log::error!("輸入路徑不存在或不是目錄：{}", root.display());
        return Err(ConvertError::PathNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("無法讀取目錄項目，跳過：{}", e);
                continue;
            }
        };
        if is_document_file(&entry) && extensions.matches(entry.path()) {
            files.push(entry.into_path());
        }
    }

    info!("掃描完成，在 {} 找到 {} 個檔案", root.display(), files.len());
    Ok(files)
}

// 不追蹤目錄連結，但指向檔案的連結照常收集
fn is_document_file(entry: &DirEntry) -> bool {
    if entry.file_type().is_file() {
        return true;
    }
    entry.path_is_symlink() && entry.path().is_file()
}
