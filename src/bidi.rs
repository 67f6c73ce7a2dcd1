//! Display-order normalization for cells that mix Persian/Arabic script with
//! digits and Latin text.
//!
//! Spreadsheet writers store characters in a flat array and have no shaping
//! engine, so directionality is resolved here: each cell is split into typed
//! segments, the segment sequence is reversed for RTL-dominant cells, and every
//! script segment is stored in visual order. Numbers and Latin words keep their
//! natural left-to-right order.

/// Directional class of a character or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Letters from the Arabic blocks (covers Persian).
    ScriptRtl,
    /// Digits in any of the supported digit sets, Latin letters and `. , - / :`.
    NumericOrLatin,
    /// Whitespace and anything unclassified.
    Other,
}

/// Maximal run of characters sharing one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub class: CharClass,
    pub text: String,
}

fn is_numeric_or_latin(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch, '.' | ',' | '-' | '/' | ':')
        // Arabic-Indic and Persian digits, Arabic decimal and thousands separators.
        || ('\u{0660}'..='\u{0669}').contains(&ch)
        || ('\u{06F0}'..='\u{06F9}').contains(&ch)
        || matches!(ch, '\u{066B}' | '\u{066C}')
        // Latin-1 Supplement through Latin Extended-B letters.
        || (('\u{00C0}'..='\u{024F}').contains(&ch) && ch.is_alphabetic())
}

fn is_arabic_script(ch: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&ch)
        || ('\u{0750}'..='\u{077F}').contains(&ch)
        || ('\u{08A0}'..='\u{08FF}').contains(&ch)
        || ('\u{FB50}'..='\u{FDFF}').contains(&ch)
        || ('\u{FE70}'..='\u{FEFC}').contains(&ch)
}

/// Classifies a single character without looking at its neighbours.
#[must_use]
pub fn classify_char(ch: char) -> CharClass {
    // Digits inside the Arabic block are numbers first.
    if is_numeric_or_latin(ch) {
        CharClass::NumericOrLatin
    } else if is_arabic_script(ch) {
        CharClass::ScriptRtl
    } else {
        CharClass::Other
    }
}

#[must_use]
pub fn contains_rtl(text: &str) -> bool {
    text.chars()
        .any(|ch| classify_char(ch) == CharClass::ScriptRtl)
}

/// A cell is RTL-dominant when it has at least as many script characters as
/// numeric/Latin ones. Ties go to RTL because the target sheet is RTL.
#[must_use]
pub fn is_rtl_dominant(text: &str) -> bool {
    let (rtl, ltr) = text
        .chars()
        .fold((0_usize, 0_usize), |(rtl, ltr), ch| match classify_char(ch) {
            CharClass::ScriptRtl => (rtl + 1, ltr),
            CharClass::NumericOrLatin => (rtl, ltr + 1),
            CharClass::Other => (rtl, ltr),
        });
    rtl >= ltr
}

/// Resolves `Other` characters against their nearest classified neighbours.
///
/// Equal neighbours absorb the character. When they differ it joins the run on
/// its right under RTL flow, which is the logically preceding run. At the edges
/// of the string the only available neighbour wins.
fn resolve_classes(chars: &[char]) -> Vec<CharClass> {
    let raw = chars.iter().map(|&ch| classify_char(ch)).collect::<Vec<_>>();

    let mut previous = Vec::with_capacity(raw.len());
    let mut last = None;
    for &class in &raw {
        previous.push(last);
        if class != CharClass::Other {
            last = Some(class);
        }
    }

    let mut next = vec![None; raw.len()];
    let mut upcoming = None;
    for (index, &class) in raw.iter().enumerate().rev() {
        next[index] = upcoming;
        if class != CharClass::Other {
            upcoming = Some(class);
        }
    }

    raw.iter()
        .enumerate()
        .map(|(index, &class)| {
            if class != CharClass::Other {
                return class;
            }
            match (previous[index], next[index]) {
                (Some(before), _) => before,
                (None, Some(after)) => after,
                (None, None) => CharClass::Other,
            }
        })
        .collect()
}

/// Splits `text` into segments after neighbour inheritance.
///
/// Concatenating the returned segments reproduces `text` exactly.
#[must_use]
pub fn segments(text: &str) -> Vec<Segment> {
    let chars = text.chars().collect::<Vec<_>>();
    let classes = resolve_classes(&chars);

    let mut out: Vec<Segment> = Vec::new();
    for (ch, class) in chars.into_iter().zip(classes) {
        match out.last_mut() {
            Some(segment) if segment.class == class => segment.text.push(ch),
            _ => out.push(Segment {
                class,
                text: ch.to_string(),
            }),
        }
    }
    out
}

/// Reorders `text` for storage in a cell rendered by an RTL sheet.
///
/// Apply exactly once per raw cell: the transform is not idempotent.
#[must_use]
pub fn normalize(text: &str) -> String {
    if !contains_rtl(text) {
        return text.to_string();
    }

    let mut parts = segments(text);
    if is_rtl_dominant(text) {
        parts.reverse();
    }

    let mut out = String::with_capacity(text.len());
    for segment in parts {
        match segment.class {
            CharClass::ScriptRtl => out.extend(segment.text.chars().rev()),
            CharClass::NumericOrLatin | CharClass::Other => out.push_str(&segment.text),
        }
    }
    out
}

/// [`normalize`] for a possibly missing cell; `None` becomes an empty string.
#[must_use]
pub fn normalize_cell(cell: Option<&str>) -> String {
    cell.map(normalize).unwrap_or_default()
}
