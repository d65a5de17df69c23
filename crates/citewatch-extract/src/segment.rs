//! Sentence boundary detection over response text.

/// Byte range of one sentence within the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sentence {
    pub start: usize,
    pub end: usize,
}

impl Sentence {
    pub(crate) fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Tokens that end with a period without ending a sentence. Compared
/// case-insensitively against the word preceding the candidate boundary.
const ABBREVIATIONS: &[&str] = &[
    "inc", "corp", "ltd", "llc", "co", "vs", "etc", "e.g", "i.e", "mr", "mrs", "ms", "dr", "st",
    "no", "approx",
];

/// Split text into sentences.
///
/// A `.`, `!` or `?` ends a sentence when followed by whitespace and an
/// uppercase letter or digit, unless the preceding word is a known
/// abbreviation. Ranges cover the original text with leading/trailing
/// whitespace trimmed; text without a terminal boundary yields one final
/// sentence.
pub(crate) fn split_sentences(text: &str) -> Vec<Sentence> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    let mut iter = text.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        if c != '.' && c != '!' && c != '?' {
            continue;
        }
        // Consume runs of terminal punctuation ("?!", "...").
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = iter.peek() {
            if next == '.' || next == '!' || next == '?' {
                iter.next();
                end = j + next.len_utf8();
            } else {
                break;
            }
        }

        if c == '.' && is_abbreviation(text, i) {
            continue;
        }

        let followed_by_boundary = match text[end..].chars().next() {
            None => true,
            Some(next) if next.is_whitespace() => text[end..]
                .chars()
                .find(|ch| !ch.is_whitespace())
                .is_none_or(|ch| ch.is_uppercase() || ch.is_ascii_digit()),
            Some(_) => false,
        };
        if !followed_by_boundary {
            continue;
        }

        if let Some(sentence) = trim_range(text, start, end) {
            sentences.push(sentence);
        }
        start = end;
    }

    if start < bytes.len() {
        if let Some(sentence) = trim_range(text, start, bytes.len()) {
            sentences.push(sentence);
        }
    }

    sentences
}

/// True when the word ending at `period_idx` is an abbreviation like
/// "Inc." or "e.g.".
fn is_abbreviation(text: &str, period_idx: usize) -> bool {
    let head = &text[..period_idx];
    let word_start = head
        .rfind(|c: char| c.is_whitespace() || c == '(' || c == '"')
        .map_or(0, |p| p + 1);
    let word = head[word_start..].trim_end_matches('.');
    if word.is_empty() {
        return false;
    }
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

fn trim_range(text: &str, start: usize, end: usize) -> Option<Sentence> {
    let slice = &text[start..end];
    let trimmed = slice.trim_start();
    let lead = slice.len() - trimmed.len();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some(Sentence {
        start: start + lead,
        end: start + lead + trimmed.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        split_sentences(input)
            .into_iter()
            .map(|s| &input[s.start..s.end])
            .collect()
    }

    #[test]
    fn splits_simple_sentences() {
        let got = texts("First point. Second point. Third point.");
        assert_eq!(got, vec!["First point.", "Second point.", "Third point."]);
    }

    #[test]
    fn keeps_abbreviations_together() {
        let got = texts("Acme Inc. is well known. Many agree.");
        assert_eq!(got, vec!["Acme Inc. is well known.", "Many agree."]);
    }

    #[test]
    fn handles_question_and_exclamation() {
        let got = texts("Is it good? Absolutely! Try it today.");
        assert_eq!(got, vec!["Is it good?", "Absolutely!", "Try it today."]);
    }

    #[test]
    fn decimal_numbers_do_not_split() {
        let got = texts("It costs 3.50 per seat. Cheap enough.");
        assert_eq!(got, vec!["It costs 3.50 per seat.", "Cheap enough."]);
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        let got = texts("no punctuation at all");
        assert_eq!(got, vec!["no punctuation at all"]);
    }

    #[test]
    fn empty_input_yields_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn ellipsis_is_a_single_boundary() {
        let got = texts("Wait... Then decide.");
        assert_eq!(got, vec!["Wait...", "Then decide."]);
    }

    #[test]
    fn sentence_contains_offset() {
        let text = "Alpha beta. Gamma delta.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains(0));
        assert!(!sentences[0].contains(sentences[1].start));
        assert!(sentences[1].contains(text.find("Gamma").unwrap()));
    }
}
