/*
 *  Tromo - Discord bot for tracking per-day help counts reported by staff.
 *  Copyright (C) 2026  Tromo contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::errors::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/**
 * Zips every daily JSON file into a timestamped archive under `backup_dir`.
 * Returns the path of the written archive.
 */
pub fn snapshot(data_dir: &Path, backup_dir: &Path, stamp: &str) -> AppResult<PathBuf> {
    fs::create_dir_all(backup_dir)?;
    let archive_path = backup_dir.join(format!("tromo-backup-{}.zip", stamp));
    let file = fs::File::create(&archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut files = 0usize;
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        zip.start_file(name, options)
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        let mut f = fs::File::open(&path)?;
        std::io::copy(&mut f, &mut zip)?;
        files += 1;
    }

    zip.finish()
        .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
    tracing::info!(
        archive = %archive_path.display(),
        files,
        "Backup snapshot written."
    );
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_archives_only_day_files() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let backup_dir = dir.path().join("backups");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("2026-08-23.json"), "{}").unwrap();
        fs::write(data_dir.join("2026-08-24.json"), "{}").unwrap();
        fs::write(data_dir.join("notes.txt"), "ignore me").unwrap();

        let archive = snapshot(&data_dir, &backup_dir, "20260824-210000").unwrap();
        assert_eq!(
            archive.file_name().unwrap().to_str().unwrap(),
            "tromo-backup-20260824-210000.zip"
        );

        let reader = fs::File::open(&archive).unwrap();
        let zip = zip::ZipArchive::new(reader).unwrap();
        assert_eq!(zip.len(), 2);
    }

    #[test]
    fn snapshot_of_empty_data_dir_still_writes_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();

        let archive = snapshot(&data_dir, &dir.path().join("backups"), "stamp").unwrap();
        assert!(archive.exists());
    }
}
