//! Value ordering shared by the dashboard grid and the deployment table

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{Scalar, SortOrder};

/// Locale-style string ordering, close to a root-locale collator.
///
/// Levels, compared in turn:
/// 1. base letters with accents and case folded away; punctuation and
///    symbols sort before digits, digits before letters
/// 2. accents: unaccented before accented
/// 3. case: lowercase before uppercase
///
/// Digits compare one by one, so `"10"` sorts before `"9"`. Contractions and
/// language-specific tailorings are not modelled.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| case_order(a, b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Punctuation,
    Digit,
    Letter,
}

fn char_class(c: char) -> CharClass {
    if c.is_alphabetic() {
        CharClass::Letter
    } else if c.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Punctuation
    }
}

fn primary_key(s: &str) -> Vec<(CharClass, char)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .collect()
}

fn secondary_key(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        return match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => ca.cmp(&cb),
        };
    }

    a.len().cmp(&b.len())
}

/// Numeric comparison when both sides are numbers, locale string ordering
/// otherwise. Numeric-looking text is still text.
pub fn compare_values(a: &Scalar, b: &Scalar) -> Ordering {
    match (a, b) {
        (Scalar::Number(x), Scalar::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => locale_compare(&a.to_string(), &b.to_string()),
    }
}

/// Apply a sort direction to a natural ordering
pub fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Desc => ordering.reverse(),
        SortOrder::Asc | SortOrder::None => ordering,
    }
}
