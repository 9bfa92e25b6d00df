//! Text cleanup and break hints for reconstructed lines
//!
//! The display wraps text only where a hint allows it: ordinary whitespace
//! survives only after punctuation, every other whitespace run becomes a
//! non-breaking space, and zero-width spaces mark extra break points before
//! connector words and in place of slashes.

/// Non-breaking space
pub const NBSP: char = '\u{00A0}';

/// Zero-width space (break opportunity)
pub const ZWSP: char = '\u{200B}';

/// Extraction artifacts removed from every line: response markers and
/// bare enumerations
const ARTIFACTS: &[&str] = &["R/", "1.", "2.", "3.", "4.", "5.", "6."];

/// Punctuation after which an ordinary space may wrap
const BREAK_AFTER: &[char] = &[',', ';', ':', '!', '?', '.'];

/// Default connector words that may start a new row (French)
pub const DEFAULT_CONNECTORS: &[&str] = &["et", "ou", "pour", "qui", "que"];

/// Line text normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    connectors: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTORS.iter().map(|w| w.to_string()).collect())
    }
}

impl Normalizer {
    pub fn new(connectors: Vec<String>) -> Self {
        Self { connectors }
    }

    /// Clean raw line text and insert break hints.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = strip_artifacts(raw);
        let hinted = protect_whitespace(cleaned.trim());
        let hinted = self.mark_connectors(&hinted);
        hinted.replace('/', &ZWSP.to_string())
    }

    /// Insert a zero-width space between a non-breaking space and a connector word
    fn mark_connectors(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());

        for (i, &c) in chars.iter().enumerate() {
            out.push(c);
            if c == NBSP && self.connector_at(&chars[i + 1..]) {
                out.push(ZWSP);
            }
        }

        out
    }

    fn connector_at(&self, rest: &[char]) -> bool {
        self.connectors.iter().any(|word| {
            let len = word.chars().count();
            len > 0
                && rest.len() >= len
                && rest.iter().take(len).copied().eq(word.chars())
                && rest.get(len).map_or(true, |&next| !next.is_alphanumeric())
        })
    }
}

/// Normalize with the default connector list
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}

/// Remove artifact substrings until none remain
fn strip_artifacts(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        let before = text.len();
        for artifact in ARTIFACTS {
            text = text.replace(artifact, "");
        }
        if text.len() == before {
            return text;
        }
    }
}

/// Replace whitespace runs not preceded by punctuation with a single NBSP
fn protect_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = String::new();

    for c in text.chars() {
        if c.is_whitespace() {
            run.push(c);
            continue;
        }
        flush_run(&mut out, &mut run, prev);
        out.push(c);
        prev = Some(c);
    }
    flush_run(&mut out, &mut run, prev);

    out
}

fn flush_run(out: &mut String, run: &mut String, prev: Option<char>) {
    if run.is_empty() {
        return;
    }
    if prev.is_some_and(|p| BREAK_AFTER.contains(&p)) {
        out.push_str(run);
    } else {
        out.push(NBSP);
    }
    run.clear();
}
