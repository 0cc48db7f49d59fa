use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

pub const DEFAULT_DB_URL: &str = "sqlite://vocab.sqlite3";

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_in_memory(trimmed) {
        return trimmed.to_owned();
    }
    if let Some(rest) = trimmed.strip_prefix("sqlite://") {
        if Path::new(rest.split('?').next().unwrap_or(rest)).is_absolute() {
            return trimmed.to_owned();
        }
        return absolute_url(rest);
    }
    absolute_url(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed))
}

fn absolute_url(path: &str) -> String {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn is_in_memory(url: &str) -> bool {
    url == "sqlite::memory:" || url.contains("mode=memory")
}

/// Create the database file and its parent directory if they are missing.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if is_in_memory(db_url) {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_memory_and_absolute_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:file:x?mode=memory&cache=shared"),
            "sqlite:file:x?mode=memory&cache=shared"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/vocab.sqlite3"),
            "sqlite:///tmp/vocab.sqlite3"
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("data/vocab.sqlite3");
        let path = url.strip_prefix("sqlite://").unwrap();
        assert!(Path::new(path).is_absolute());
        assert!(path.ends_with("data/vocab.sqlite3"));

        let default = normalize_sqlite_url(DEFAULT_DB_URL);
        assert!(default.ends_with("/vocab.sqlite3"));
        assert!(Path::new(default.strip_prefix("sqlite://").unwrap()).is_absolute());
    }

    #[test]
    fn prepares_file_in_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("vocab.sqlite3");
        let url = format!("sqlite://{}", file.display());

        prepare_sqlite_file(&url).unwrap();
        assert!(file.exists());
        prepare_sqlite_file(&url).unwrap();
    }

    #[test]
    fn rejects_non_sqlite_urls() {
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }
}
