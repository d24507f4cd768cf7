//! Input rules shared by the services. Every failure is a `ValidationError`.

use domains::{AppError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_BIO_LEN: usize = 500;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_COMMENT_LEN: usize = 1000;
pub const MAX_ANONYMOUS_LEN: usize = 500;
pub const MAX_TAG_LEN: usize = 30;
pub const MAX_TAGS_PER_POST: usize = 10;
const SUMMARY_CHARS: usize = 120;

/// Checks the trimmed character count of `value` and returns the trimmed text.
pub fn length<'a>(field: &str, value: &'a str, min: usize, max: usize) -> Result<&'a str> {
    let trimmed = value.trim();
    let n = trimmed.chars().count();
    if n < min {
        return Err(if min == 1 {
            AppError::validation(format!("{field} must not be empty"))
        } else {
            AppError::validation(format!("{field} must be at least {min} characters"))
        });
    }
    if n > max {
        return Err(AppError::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(trimmed)
}

pub fn email(value: &str) -> Result<String> {
    let v = value.trim();
    let valid = match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !v.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("invalid email address"));
    }
    Ok(v.to_string())
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn slug(value: &str) -> Result<String> {
    let v = value.trim();
    let ok = !v.is_empty()
        && v.len() <= MAX_TITLE_LEN
        && v.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !v.starts_with('-')
        && !v.ends_with('-');
    if !ok {
        return Err(AppError::validation("slug may only contain a-z, 0-9 and inner dashes"));
    }
    Ok(v.to_string())
}

/// Lowercase ASCII slug of a title. Empty when the title has no ASCII alphanumerics.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').chars().take(80).collect::<String>().trim_end_matches('-').to_string()
}

/// `#RRGGBB`
pub fn color(value: &str) -> Result<String> {
    let v = value.trim();
    let ok = v.len() == 7
        && v.starts_with('#')
        && v[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if !ok {
        return Err(AppError::validation("color must look like #RRGGBB"));
    }
    Ok(v.to_string())
}

/// Trims, drops empties and case-insensitive duplicates, enforces limits.
pub fn tags(raw: &[String]) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for t in raw {
        let t = t.trim();
        if t.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(t)) {
            continue;
        }
        length("tag", t, 1, MAX_TAG_LEN)?;
        out.push(t.to_string());
    }
    if out.len() > MAX_TAGS_PER_POST {
        return Err(AppError::validation(format!(
            "a post may carry at most {MAX_TAGS_PER_POST} tags"
        )));
    }
    Ok(out)
}

/// First characters of the content, used when a post has no explicit summary.
pub fn summary_of(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SUMMARY_CHARS {
        return flat;
    }
    let mut s: String = flat.chars().take(SUMMARY_CHARS).collect();
    s.push('…');
    s
}

/// Case-insensitive substring blocklist.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    words: Vec<String>,
}

impl ContentFilter {
    pub fn new(words: &[String]) -> Self {
        Self {
            words: words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn check(&self, text: &str) -> Result<()> {
        let lower = text.to_lowercase();
        if self.words.iter().any(|w| lower.contains(w.as_str())) {
            return Err(AppError::validation("content contains forbidden words"));
        }
        Ok(())
    }
}
