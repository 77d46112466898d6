use crate::models::db_operations::DbError;
use rand::Rng;

/// How many suffixed candidates are tried after the bare slug collides.
const MAX_SLUG_ATTEMPTS: usize = 5;
const SUFFIX_LEN: usize = 6;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'ß' => "ss",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' => "",
        'ы' => "y",
        'ь' => "",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Lowercase, URL-safe form of a name or title. Only `a-z`, `0-9` and single
/// hyphens survive. Returns `fallback` when nothing usable is left.
pub fn slugify(input: &str, fallback: &str) -> String {
    let mut transliterated = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match transliterate(c) {
            Some(mapped) => transliterated.push_str(mapped),
            None => transliterated.push(c),
        }
    }

    let mut slug = String::with_capacity(transliterated.len());
    let mut pending_hyphen = false;
    for c in transliterated.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

pub fn with_unique_suffix(base: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", base, suffix)
}

/// Runs `insert` with the bare slug first, then with random suffixes while the
/// database reports a unique-constraint violation. The UNIQUE index is the
/// arbiter, so two writers racing for the same slug can never both win.
pub fn insert_with_unique_slug<T, F>(base: &str, mut insert: F) -> Result<(T, String), DbError>
where
    F: FnMut(&str) -> Result<T, DbError>,
{
    let mut candidate = base.to_string();
    for _ in 0..=MAX_SLUG_ATTEMPTS {
        match insert(&candidate) {
            Ok(value) => return Ok((value, candidate)),
            Err(e) if e.is_unique_violation() => {
                log::debug!("Slug '{}' is taken, retrying with a suffix", candidate);
                candidate = with_unique_suffix(base);
            }
            Err(e) => return Err(e),
        }
    }
    Err(DbError::SlugExhausted(base.to_string()))
}
