//! Subject suggestion.
//!
//! A candidate note votes for the subject of every existing note its words
//! appear in. Each candidate word longer than two characters scores one point
//! per corpus note whose lowercased `title body` contains it as a substring.
//! Points are summed per subject and the highest total wins, first subject
//! seen winning ties. With no positive score the note stays
//! [`DEFAULT_SUBJECT`].

use crate::notes::Note;

/// Subject given to notes nobody categorized yet.
pub const DEFAULT_SUBJECT: &str = "Uncategorized";

/// Words of this many characters or fewer never vote.
const MAX_IGNORED_TOKEN_LEN: usize = 2;

/// Lowercases `text`, splits it on whitespace and keeps words longer than two
/// characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > MAX_IGNORED_TOKEN_LEN)
        .map(String::from)
        .collect()
}

/// Counts the tokens contained in `corpus_note_text`. Duplicate tokens count
/// once each.
pub fn score_against(tokens: &[String], corpus_note_text: &str) -> usize {
    if tokens.is_empty() {
        return 0;
    }

    let text = corpus_note_text.to_lowercase();
    tokens
        .iter()
        .filter(|token| text.contains(token.as_str()))
        .count()
}

/// Picks the subject whose notes share the most tokens with the candidate.
///
/// The note with id `exclude_id` never votes.
pub fn best_subject(tokens: &[String], corpus: &[Note], exclude_id: Option<&str>) -> String {
    let voters = corpus
        .iter()
        .filter(|note| exclude_id.map_or(true, |id| note.id.as_str() != id))
        .collect::<Vec<_>>();

    if tokens.is_empty() || voters.is_empty() {
        return DEFAULT_SUBJECT.to_string();
    }

    // insertion ordered, ties go to the subject that scored first
    let mut table: Vec<(&str, usize)> = Vec::new();

    for note in voters {
        let score = score_against(tokens, &format!("{} {}", note.title, note.body));
        if score == 0 {
            continue;
        }

        match table.iter_mut().find(|(subject, _)| *subject == note.subject) {
            Some((_, total)) => *total += score,
            None => table.push((note.subject.as_str(), score)),
        }
    }

    let mut max_score = 0;
    let mut best = DEFAULT_SUBJECT;
    for (subject, score) in table {
        if score > max_score {
            max_score = score;
            best = subject;
        }
    }

    best.to_string()
}

/// Suggests a subject for a note with the given title and body.
///
/// `corpus` is every known note; the candidate itself is skipped through
/// `exclude_id` when it already exists.
pub fn suggest(title: &str, body: &str, corpus: &[Note], exclude_id: Option<&str>) -> String {
    if title.trim().is_empty() && body.trim().is_empty() {
        return DEFAULT_SUBJECT.to_string();
    }

    let tokens = tokenize(&format!("{title} {body}"));
    best_subject(&tokens, corpus, exclude_id)
}

pub fn is_default_subject(subject: &str) -> bool {
    subject == DEFAULT_SUBJECT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_short_words() {
        assert_eq!(
            tokenize("  The ox AND a Cat  "),
            vec!["the".to_string(), "and".to_string(), "cat".to_string()]
        );
        assert!(tokenize(" \t\n ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenize_keeps_punctuation() {
        assert_eq!(tokenize("limits, rules."), vec!["limits,", "rules."]);
    }

    #[test]
    fn score_counts_duplicates() {
        let tokens = tokenize("rules rules limits");
        assert_eq!(score_against(&tokens, "Derivative RULES"), 2);
        assert_eq!(score_against(&[], "anything"), 0);
    }

    #[test]
    fn score_matches_substrings() {
        let tokens = tokenize("deriv vat derive");
        assert_eq!(score_against(&tokens, "derivative"), 2);
    }
}
