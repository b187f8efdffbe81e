// src/ingest/slug.rs
//! Filesystem-safe slugs for content files.
//!
//! Strict mode: after transliteration only ASCII letters, digits and
//! whitespace survive; hyphens count as whitespace; whitespace runs become
//! a single `-`.

use chrono::{DateTime, Utc};

pub const SLUG_MAX_CHARS: usize = 80;

pub fn slugify(title: &str) -> String {
    let mut spaced = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch == '-' {
            spaced.push(' ');
            continue;
        }
        match transliterate(ch) {
            Some(mapped) => spaced.extend(mapped.chars().filter(|c| keep_strict(*c))),
            None if keep_strict(ch) => spaced.push(ch),
            None => {}
        }
    }
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Slug capped at [`SLUG_MAX_CHARS`]. The cap is applied after joining, so a
/// trailing `-` is possible and kept (stable across runs).
pub fn safe_slug(title: &str) -> String {
    slugify(title).chars().take(SLUG_MAX_CHARS).collect()
}

/// `{YYYY-MM-DD}-{slug}`, date taken in UTC.
pub fn file_stem(published: DateTime<Utc>, title: &str) -> String {
    format!("{}-{}", published.format("%Y-%m-%d"), safe_slug(title))
}

fn keep_strict(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace()
}

// Output is lowercased in the end, so only lowercase forms are listed.
fn transliterate(ch: char) -> Option<&'static str> {
    let lower = ch.to_lowercase().next().unwrap_or(ch);
    let s = match lower {
        // Latin
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ð' | 'ď' | 'đ' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' | 'ģ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'ı' | 'į' => "i",
        // dotted capital I lowercases to `i` + combining dot
        'i' if !ch.is_ascii() => "i",
        'ķ' => "k",
        'ł' | 'ļ' | 'ľ' => "l",
        'ñ' | 'ń' | 'ň' | 'ņ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' | 'ŕ' => "r",
        'ś' | 'š' | 'ş' | 'ș' => "s",
        'ß' => "ss",
        'ť' | 'ţ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        // Vietnamese
        'ạ' | 'ả' | 'ấ' | 'ầ' | 'ẩ' | 'ẫ' | 'ậ' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ' | 'ặ' => "a",
        'ẹ' | 'ẻ' | 'ẽ' | 'ế' | 'ề' | 'ể' | 'ễ' | 'ệ' => "e",
        'ỉ' | 'ị' | 'ĩ' => "i",
        'ọ' | 'ỏ' | 'ố' | 'ồ' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ớ' | 'ờ' | 'ở' | 'ỡ' | 'ợ' => "o",
        'ụ' | 'ủ' | 'ũ' | 'ư' | 'ứ' | 'ừ' | 'ử' | 'ữ' | 'ự' => "u",
        'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => "y",
        // Cyrillic (Russian, Ukrainian)
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' | 'ґ' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' | 'і' => "i",
        'ї' => "yi",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' | 'ъ' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' | 'щ' => "sh",
        'ы' => "y",
        'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        // Greek
        'α' | 'ά' => "a",
        'β' => "b",
        'γ' => "g",
        'δ' => "d",
        'ε' | 'έ' => "e",
        'ζ' => "z",
        'η' | 'ή' => "h",
        'θ' => "8",
        'ι' | 'ί' | 'ϊ' | 'ΐ' => "i",
        'κ' => "k",
        'λ' => "l",
        'μ' => "m",
        'ν' => "n",
        'ξ' => "3",
        'ο' | 'ό' => "o",
        'π' => "p",
        'ρ' => "r",
        'σ' | 'ς' => "s",
        'τ' => "t",
        'υ' | 'ύ' | 'ϋ' | 'ΰ' => "y",
        'φ' => "f",
        'χ' => "x",
        'ψ' => "ps",
        'ω' | 'ώ' => "w",
        // Symbols
        '&' => "and",
        '%' => "percent",
        '$' => "dollar",
        '<' => "less",
        '>' => "greater",
        '|' => "or",
        '£' => "pound",
        '€' => "euro",
        '¥' => "yen",
        '₽' => "ruble",
        '©' => "(c)",
        '®' => "(r)",
        '™' => "tm",
        '∞' => "infinity",
        '♥' => "love",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn plain_title() {
        assert_eq!(
            slugify("New Bupivacaine Trial Results"),
            "new-bupivacaine-trial-results"
        );
    }

    #[test]
    fn punctuation_is_dropped_and_hyphens_separate() {
        assert_eq!(
            slugify("Bupivacaine's COVID-19 role: a review - Reuters"),
            "bupivacaines-covid-19-role-a-review-reuters"
        );
    }

    #[test]
    fn symbols_and_accents_are_transliterated() {
        assert_eq!(slugify("Smith & Néphew 50% off"), "smith-and-nephew-50percent-off");
        assert_eq!(slugify("Brand® drug"), "brandr-drug");
    }

    #[test]
    fn cyrillic_greek_and_vietnamese_are_transliterated() {
        assert_eq!(slugify("Бупивакаин bupivacaine"), "bupivakain-bupivacaine");
        assert_eq!(slugify("Щука Ёж"), "shuka-yozh");
        assert_eq!(slugify("Βουπιβακαΐνη"), "boypibakainh");
        assert_eq!(slugify("Thuốc tê bupivacaine"), "thuoc-te-bupivacaine");
    }

    #[test]
    fn unmapped_scripts_vanish() {
        assert_eq!(slugify("布比卡因 bupivacaine"), "bupivacaine");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn safe_slug_caps_length() {
        let long = "bupivacaine ".repeat(20);
        let s = safe_slug(&long);
        assert_eq!(s.chars().count(), SLUG_MAX_CHARS);
        assert!(s.starts_with("bupivacaine-bupivacaine"));
    }

    #[test]
    fn file_stem_uses_utc_date() {
        // 23:30 at -05:00 is the next day in UTC
        let t = chrono::FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 9, 23, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(file_stem(t, "Bupivacaine news"), "2025-03-10-bupivacaine-news");
    }
}
