use crate::core::{StoreError, StoreResult};
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const REGEX_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

lazy_static::lazy_static! {
    static ref REGEX_LRU_CACHE: Arc<Mutex<LruCache<String, Arc<Regex>>>> =
        Arc::new(Mutex::new(LruCache::new(REGEX_CACHE_SIZE)));
}

/// Translates a SQL LIKE pattern into an anchored regex.
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                regex.push_str(&regex::escape(&chars[i].to_string()));
            }
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

/// Patterns without `_` or escapes are answered without a regex.
fn fast_path_like(text: &str, pattern: &str) -> Option<bool> {
    if pattern.contains('_') || pattern.contains('\\') {
        return None;
    }

    if !pattern.contains('%') {
        return Some(text == pattern);
    }

    let trimmed = pattern.trim_end_matches('%');
    if !trimmed.contains('%') {
        return Some(text.starts_with(trimmed));
    }

    None
}

fn get_or_compile_regex(pattern: &str) -> StoreResult<Arc<Regex>> {
    {
        let mut cache = REGEX_LRU_CACHE.lock()?;
        if let Some(regex) = cache.get(pattern) {
            return Ok(Arc::clone(regex));
        }
    }

    let compiled = Regex::new(&like_to_regex(pattern))
        .map_err(|e| StoreError::Pattern(format!("{}: {}", pattern, e)))?;
    let compiled = Arc::new(compiled);

    let mut cache = REGEX_LRU_CACHE.lock()?;
    cache.put(pattern.to_string(), Arc::clone(&compiled));
    Ok(compiled)
}

/// Case-sensitive SQL LIKE: `%` matches any run, `_` exactly one character.
pub fn eval_like(text: &str, pattern: &str) -> StoreResult<bool> {
    if let Some(result) = fast_path_like(text, pattern) {
        return Ok(result);
    }
    let regex = get_or_compile_regex(pattern)?;
    Ok(regex.is_match(text))
}
