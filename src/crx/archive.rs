use std::{
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};

use tracing::debug;
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use super::errors::CrxResult;

/// Unpacks a zip payload into `extract_to`, creating directories as needed.
///
/// Entries whose names would escape `extract_to` are skipped.
pub fn extract_zip_to_directory(zip_data: &[u8], extract_to: &Path) -> CrxResult<usize> {
    let mut archive = ZipArchive::new(Cursor::new(zip_data))?;
    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let outpath = match file.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => continue,
        };

        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&outpath)?;
        std::io::copy(&mut file, &mut outfile)?;
        extracted += 1;
    }

    debug!(extracted, dir = %extract_to.display(), "extracted zip payload");
    Ok(extracted)
}

/// Zips the contents of `dir`, with entry names relative to it.
///
/// Entries are added in sorted order so the same tree always yields the same
/// archive layout.
pub fn zip_directory(dir: &Path) -> CrxResult<Vec<u8>> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for path in &files {
        let name = entry_name(dir, path);
        writer.start_file(name, options)?;
        writer.write_all(&fs::read(path)?)?;
    }

    let cursor = writer.finish()?;
    debug!(entries = files.len(), dir = %dir.display(), "zipped directory");

    Ok(cursor.into_inner())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> CrxResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }

    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
