//! Lexical polarity for code-review text.

use crate::models::analysis::SentimentClass;

/// How far a negator reaches forward, in tokens.
const NEGATION_SCOPE: usize = 3;

const CLASS_THRESHOLD: f64 = 0.1;

const LEXICON: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("nice", 0.6),
    ("clean", 0.5),
    ("clear", 0.4),
    ("elegant", 0.8),
    ("awesome", 0.9),
    ("love", 0.8),
    ("like", 0.3),
    ("thanks", 0.5),
    ("thank", 0.5),
    ("helpful", 0.6),
    ("correct", 0.4),
    ("solid", 0.5),
    ("improvement", 0.5),
    ("improved", 0.5),
    ("readable", 0.5),
    ("lgtm", 0.6),
    ("perfect", 1.0),
    ("well", 0.3),
    ("happy", 0.6),
    ("simple", 0.3),
    ("bad", -0.7),
    ("wrong", -0.6),
    ("broken", -0.7),
    ("ugly", -0.7),
    ("confusing", -0.5),
    ("messy", -0.6),
    ("unclear", -0.4),
    ("incorrect", -0.6),
    ("poor", -0.6),
    ("terrible", -1.0),
    ("awful", -0.9),
    ("hate", -0.8),
    ("fails", -0.5),
    ("failing", -0.5),
    ("bug", -0.3),
    ("buggy", -0.6),
    ("hacky", -0.5),
    ("unnecessary", -0.4),
    ("redundant", -0.3),
    ("slow", -0.4),
    ("problem", -0.3),
    ("worse", -0.6),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "doesnt", "doesn't", "isnt", "isn't", "wasnt",
    "wasn't", "cant", "can't", "wont", "won't", "shouldnt", "shouldn't", "hardly", "nothing",
];

/// Mean polarity of the sentiment-bearing words in `text`, in [-1, 1].
/// Text with no lexicon hits is neutral (0.0).
pub fn polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .collect();

    let mut total = 0.0;
    let mut hits = 0usize;
    let mut negation_left = 0usize;

    for token in tokens {
        if NEGATORS.contains(&token) {
            negation_left = NEGATION_SCOPE;
            continue;
        }
        if let Some(&(_, score)) = LEXICON.iter().find(|(word, _)| *word == token) {
            let signed = if negation_left > 0 { -score } else { score };
            total += signed;
            hits += 1;
            negation_left = 0;
        } else {
            negation_left = negation_left.saturating_sub(1);
        }
    }

    if hits == 0 {
        return 0.0;
    }
    (total / hits as f64).clamp(-1.0, 1.0)
}

pub fn classify(polarity: f64) -> SentimentClass {
    if polarity > CLASS_THRESHOLD {
        SentimentClass::Positive
    } else if polarity < -CLASS_THRESHOLD {
        SentimentClass::Critical
    } else {
        SentimentClass::Neutral
    }
}
