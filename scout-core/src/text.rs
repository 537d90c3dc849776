//! Text normalization for scraped content
//!
//! Scraped descriptions, evaluation sections and discussion bodies arrive as
//! noisy innerText: LaTeX fragments, markdown, tables, bare links and
//! repeated boilerplate. Normalization turns them into plain sentences that
//! are stable across runs and usable for retrieval.
//!
//! Pipeline:
//! - Long-form only: link runs and single links become typed placeholders
//! - Pre-clean: math macros, list markers, code fences, headers, tables, newlines
//! - Sentence extraction through a [`SentenceSegmenter`]
//! - Post-clean: punctuation, allow-listed characters, metric names
//! - Long-form content over 200 chars: duplicated passages are dropped

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Placeholder for a run of three or more consecutive links
pub const MULTIPLE_LINKS_PLACEHOLDER: &str = "[Multiple Reference Links]";

/// Placeholder for a link that matches no known domain
pub const GENERIC_LINK_PLACEHOLDER: &str = "[Reference Link]";

/// Long-form text above this many characters takes the enhanced path
pub const LONG_FORM_THRESHOLD: usize = 200;

/// Sentences shorter than this are dropped
const MIN_SENTENCE_CHARS: usize = 4;

/// Segments up to this length are never treated as duplicates
const DEDUP_MIN_CHARS: usize = 15;

/// A known link domain and the placeholder it is replaced with
#[derive(Debug, Clone, Copy)]
pub struct LinkClass {
    /// Substring searched for in the URL
    pub needle: &'static str,
    /// Replacement token
    pub placeholder: &'static str,
}

/// Known link domains, first match wins
pub static LINK_CLASSES: &[LinkClass] = &[
    LinkClass {
        needle: "scholar.google",
        placeholder: "[Google Scholar Reference]",
    },
    LinkClass {
        needle: "sciencedirect",
        placeholder: "[ScienceDirect Reference]",
    },
    LinkClass {
        needle: "springer",
        placeholder: "[Springer Reference]",
    },
    LinkClass {
        needle: "ieee",
        placeholder: "[IEEE Reference]",
    },
    LinkClass {
        needle: "nature.com",
        placeholder: "[Nature Reference]",
    },
    LinkClass {
        needle: "researchgate",
        placeholder: "[ResearchGate Reference]",
    },
    LinkClass {
        needle: "arxiv",
        placeholder: "[arXiv Reference]",
    },
    LinkClass {
        needle: "github",
        placeholder: "[GitHub Repository]",
    },
    LinkClass {
        needle: "kaggle.com",
        placeholder: "[Kaggle Resource]",
    },
];

static LINK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://\S+\s*){3,}").unwrap());

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

// Pre-clean patterns, applied in declaration order
static TEXTRM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\textrm\{([^}]+)\}").unwrap());
static LEFT_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\left\(").unwrap());
static RIGHT_PAREN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\right\)").unwrap());
static FRAC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\frac\{1\}\{([^}]+)\}").unwrap());
static SUM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\sum_\{([^}]+)\}\^\{([^}]+)\}").unwrap());
static LOG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\log").unwrap());
static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*•\s*").unwrap());
static NUMBERED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\.\s+").unwrap());
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\s\S]*?```").unwrap());
static HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+([^\n]+)").unwrap());
static TABLE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TABLE:\s*\n").unwrap());
static PIPE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\|\s*").unwrap());
static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n+").unwrap());
static NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n").unwrap());

// Post-clean patterns
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PERIOD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\.").unwrap());
static MULTI_PERIOD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.+").unwrap());
static DISALLOWED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,;:?!'"()\-_+*/=%<>\[\]@^²]"#).unwrap());

static METRIC_REGEXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\br ?squared\b", "R²"),
        (r"(?i)\bmae\b", "MAE"),
        (r"(?i)\bmse\b", "MSE"),
        (r"(?i)\brmse\b", "RMSE"),
        (r"(?i)\bauc\b", "AUC"),
    ]
    .into_iter()
    .map(|(pattern, canonical)| (Regex::new(pattern).unwrap(), canonical))
    .collect()
});

/// Splits text into sentences
pub trait SentenceSegmenter: Send + Sync {
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Unicode (UAX #29) sentence boundaries
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentences;

impl SentenceSegmenter for UnicodeSentences {
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_sentences().collect()
    }
}

/// Normalizes scraped text into clean, re-punctuated sentences
#[derive(Debug, Default, Clone)]
pub struct TextNormalizer<S = UnicodeSentences> {
    segmenter: S,
}

impl TextNormalizer<UnicodeSentences> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: SentenceSegmenter> TextNormalizer<S> {
    /// Use a custom sentence segmenter
    pub fn with_segmenter(segmenter: S) -> Self {
        Self { segmenter }
    }

    /// Normalize `text`.
    ///
    /// `long_form` enables link placeholders and, for text longer than
    /// [`LONG_FORM_THRESHOLD`] after link substitution, duplicate removal.
    /// Empty input is returned unchanged.
    pub fn normalize(&self, text: &str, long_form: bool) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = if long_form {
            replace_links(text)
        } else {
            text.to_string()
        };

        let normalized = post_clean(&self.join_sentences(&pre_clean(&text)));

        if long_form && text.chars().count() > LONG_FORM_THRESHOLD {
            remove_duplicated_content(&normalized)
        } else {
            normalized
        }
    }

    fn join_sentences(&self, text: &str) -> String {
        self.segmenter
            .segment(text)
            .into_iter()
            .map(str::trim)
            .filter(|sentence| sentence.chars().count() >= MIN_SENTENCE_CHARS)
            .map(|sentence| {
                if sentence.ends_with(['.', '!', '?']) {
                    sentence.to_string()
                } else {
                    format!("{sentence}.")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Normalize with the default segmenter
pub fn normalize_text(text: &str, long_form: bool) -> String {
    TextNormalizer::new().normalize(text, long_form)
}

/// Placeholder for a single link
pub fn classify_link(url: &str) -> &'static str {
    LINK_CLASSES
        .iter()
        .find(|class| url.contains(class.needle))
        .map(|class| class.placeholder)
        .unwrap_or(GENERIC_LINK_PLACEHOLDER)
}

/// Replace link runs and individual links with placeholders
pub fn replace_links(text: &str) -> String {
    let collapsed =
        LINK_RUN_REGEX.replace_all(text, format!(" {MULTIPLE_LINKS_PLACEHOLDER} ").as_str());
    LINK_REGEX
        .replace_all(&collapsed, |caps: &regex::Captures| {
            classify_link(&caps[0]).to_string()
        })
        .into_owned()
}

/// Strip formatting before sentence segmentation
pub fn pre_clean(text: &str) -> String {
    let text = TEXTRM_REGEX.replace_all(text, "${1}");
    let text = LEFT_PAREN_REGEX.replace_all(&text, "(");
    let text = RIGHT_PAREN_REGEX.replace_all(&text, ")");
    let text = FRAC_REGEX.replace_all(&text, "1/${1}");
    let text = SUM_REGEX.replace_all(&text, "sum from ${1} to ${2}");
    let text = LOG_REGEX.replace_all(&text, "log");

    let text = BULLET_REGEX.replace_all(&text, "");
    let text = NUMBERED_REGEX.replace_all(&text, "");

    let text = CODE_FENCE_REGEX.replace_all(&text, " Code example: ");
    let text = HEADER_REGEX.replace_all(&text, "${1}:");

    let text = TABLE_LABEL_REGEX.replace_all(&text, "Table: ");
    let text = PIPE_REGEX.replace_all(&text, " ");

    let text = BLANK_LINES_REGEX.replace_all(&text, ". ");
    NEWLINE_REGEX.replace_all(&text, " ").into_owned()
}

/// Final cleanup after sentence extraction
pub fn post_clean(text: &str) -> String {
    let text = WHITESPACE_REGEX.replace_all(text, " ");
    let text = SPACE_BEFORE_PERIOD_REGEX.replace_all(&text, ".");
    let text = MULTI_PERIOD_REGEX.replace_all(&text, ".");
    let mut text = DISALLOWED_REGEX.replace_all(&text, " ").into_owned();

    for (regex, canonical) in METRIC_REGEXES.iter() {
        text = regex.replace_all(&text, *canonical).into_owned();
    }

    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_string()
}

/// Drop repeated passages (longer than 15 chars) after their first occurrence
pub fn remove_duplicated_content(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // The final sentence keeps its terminator; set it aside so its key matches earlier copies
    let text = text.trim_end();
    let (body, terminator) = match text.chars().last() {
        Some(c @ ('.' | '!' | '?')) => (&text[..text.len() - c.len_utf8()], Some(c)),
        _ => (text, None),
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut output = body
        .split(". ")
        .filter(|segment| {
            let key = segment
                .trim()
                .trim_end_matches(['.', '!', '?'])
                .to_lowercase();
            key.chars().count() <= DEDUP_MIN_CHARS || seen.insert(key)
        })
        .collect::<Vec<_>>()
        .join(". ");

    if let Some(c) = terminator {
        output.push(c);
    }
    output
}
