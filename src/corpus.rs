use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DYNASTIES: [&str; 5] = ["唐", "宋", "元", "明", "清"];

static SUBJECTS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        ("唐", vec!["边塞", "田园", "送别", "咏物"]),
        ("宋", vec!["田园", "送别", "咏物", "抒情"]),
        ("元", vec!["抒情", "咏物", "山水"]),
        ("明", vec!["抒情", "咏物", "山水"]),
        ("清", vec!["抒情", "咏物", "山水"]),
    ])
});

pub fn subjects_for(dynasty: &str) -> Option<&'static [&'static str]> {
    SUBJECTS.get(dynasty).map(|s| s.as_slice())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,
    pub author: String,
    pub dynasty: String,
    pub content: String,
    pub annotation: String,
}

pub fn corpus_path(data_dir: &Path, dynasty: &str, subject: &str) -> PathBuf {
    data_dir.join(format!("{}-{}诗.txt", dynasty, subject))
}

/// Reads the corpus file for one (dynasty, subject) pair. One poem per
/// pipe-delimited line; lines with fewer than 5 fields are skipped.
pub fn read_poems(data_dir: &Path, dynasty: &str, subject: &str) -> Result<Vec<Poem>> {
    let path = corpus_path(data_dir, dynasty, subject);

    let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::CorpusNotFound(path.display().to_string()),
        _ => AppError::CorpusRead(e.to_string()),
    })?;

    let mut poems = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < 5 {
            continue;
        }
        poems.push(Poem {
            title: parts[0].to_string(),
            author: parts[1].to_string(),
            dynasty: parts[2].to_string(),
            content: parts[3].to_string(),
            annotation: parts[4].to_string(),
        });
    }

    Ok(poems)
}
