use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Tokenization applied to hypotheses and references before n-gram counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tokenize {
    /// mteval-v13a, the WMT standard
    #[default]
    #[serde(rename = "13a")]
    Mteval13a,
    /// Whitespace split only
    #[serde(rename = "none")]
    None,
}

impl Tokenize {
    pub fn name(&self) -> &'static str {
        match self {
            Tokenize::Mteval13a => "13a",
            Tokenize::None => "none",
        }
    }

    /// Tokenize one segment and return a space-joined string
    pub fn apply(&self, line: &str) -> String {
        match self {
            Tokenize::Mteval13a => tokenize_13a(line),
            Tokenize::None => line.to_string(),
        }
    }
}

fn rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // symbols (ASCII punctuation except period, comma, dash)
            (r"([\{-~\[-` -&\(-\+:-@/])", " ${1} "),
            // period and comma unless preceded by a digit
            (r"([^0-9])([\.,])", "${1} ${2} "),
            // period and comma unless followed by a digit
            (r"([\.,])([^0-9])", " ${1} ${2}"),
            // dash when preceded by a digit
            (r"([0-9])(-)", "${1} ${2} "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(pattern).unwrap_or_else(|e| panic!("bad 13a pattern {pattern}: {e}"));
            (re, replacement)
        })
        .collect()
    })
}

fn tokenize_13a(line: &str) -> String {
    let mut line = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let mut line = format!(" {line} ");
    for (re, replacement) in rules() {
        line = re.replace_all(&line, *replacement).into_owned();
    }

    line.split_whitespace().collect::<Vec<_>>().join(" ")
}
