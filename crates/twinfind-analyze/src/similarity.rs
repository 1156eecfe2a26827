//! String similarity metrics for file names.
//!
//! Two metrics are used, chosen by input length:
//!
//! - **Edit distance** (Levenshtein) for short names, normalized as
//!   `(max_len - distance) / max_len`.
//! - **Jaro-Winkler** for long names. Cheaper than the quadratic edit
//!   distance and tolerant of the long shared prefixes typical of
//!   generated file names.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum number of prefix characters rewarded by Jaro-Winkler and
/// counted by the pre-check.
pub const PREFIX_LIMIT: usize = 4;

/// Weight of each matched prefix character in Jaro-Winkler.
pub const PREFIX_WEIGHT: f64 = 0.1;

/// Pairs whose length ratio falls below this are never compared.
pub const MIN_LENGTH_RATIO: f64 = 0.5;

static COPY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\s*\(\d+\)|\s*[-_ ]\s*copy(?:\s*\(\d+\))?)+$").expect("valid pattern")
});

static COPY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^copy of\s+").expect("valid pattern"));

/// Lower-case a file name and strip copy markers from its stem.
///
/// `"Report (1).docx"`, `"Report - Copy.docx"` and `"Copy of report.docx"`
/// all become `"report.docx"`. The extension is kept as-is.
pub fn comparable_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let (stem, ext) = match lowered.rfind('.') {
        Some(idx) if idx > 0 => lowered.split_at(idx),
        _ => (lowered.as_str(), ""),
    };

    let stripped = strip_copy_markers(stem);
    if stripped.is_empty() {
        lowered
    } else {
        format!("{stripped}{ext}")
    }
}

fn strip_copy_markers(stem: &str) -> String {
    let without_prefix = COPY_PREFIX.replace(stem, "");
    COPY_SUFFIX.replace(&without_prefix, "").trim().to_string()
}

/// Levenshtein distance over chars, using two rolling rows.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = curr[j] + 1;
            let deletion = prev[j + 1] + 1;
            curr[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit distance normalized to a similarity in `0.0..=1.0`.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = edit_distance(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Jaro similarity with a Winkler prefix bonus.
///
/// The bonus is applied unconditionally: `jaro + 0.1 * prefix * (1 - jaro)`
/// with `prefix` capped at four characters.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let jaro = strsim::jaro(a, b);
    let prefix = common_prefix(a, b);
    jaro + PREFIX_WEIGHT * prefix as f64 * (1.0 - jaro)
}

/// Number of leading chars shared by both strings, capped at [`PREFIX_LIMIT`].
pub fn common_prefix(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take(PREFIX_LIMIT)
        .take_while(|(x, y)| x == y)
        .count()
}

/// Cheap filter run before a full metric.
///
/// Rejects pairs whose lengths differ by more than half, then requires a
/// shared prefix of at least `min(2, 0.3 * shorter)` chars.
pub fn passes_precheck(a: &str, b: &str) -> bool {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let (shorter, longer) = if len_a <= len_b {
        (len_a, len_b)
    } else {
        (len_b, len_a)
    };

    if longer == 0 {
        return true;
    }
    if (shorter as f64 / longer as f64) < MIN_LENGTH_RATIO {
        return false;
    }

    let required = 2.0_f64.min(0.3 * shorter as f64);
    common_prefix(a, b) as f64 >= required
}

/// Similarity of two names, picking the metric by the shorter length.
pub fn name_similarity(a: &str, b: &str, edit_distance_max_len: usize) -> f64 {
    let shorter = a.chars().count().min(b.chars().count());
    if shorter < edit_distance_max_len {
        edit_similarity(a, b)
    } else {
        jaro_winkler(a, b)
    }
}
