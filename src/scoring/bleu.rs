use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::tokenizer::Tokenize;

pub const MAX_NGRAM_ORDER: usize = 4;

/// Stand-in for log(0) so a zero precision drives the score to zero
const LOG_ZERO: f64 = -9_999_999_999.0;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("reference stream {stream} has {references} segments but there are {hypotheses} hypotheses")]
    StreamLengthMismatch {
        stream: usize,
        hypotheses: usize,
        references: usize,
    },
    #[error("at least one reference stream is required")]
    NoReferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum SmoothMethod {
    #[default]
    #[serde(rename = "exp")]
    Exp,
    #[serde(rename = "floor")]
    Floor,
    #[serde(rename = "add-k")]
    AddK,
    #[serde(rename = "none")]
    None,
}

impl SmoothMethod {
    /// Value used when none is configured
    pub fn default_value(&self) -> f64 {
        match self {
            SmoothMethod::Floor => 0.1,
            SmoothMethod::AddK => 1.0,
            SmoothMethod::Exp | SmoothMethod::None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BleuOptions {
    pub tokenize: Tokenize,
    pub lowercase: bool,
    pub smooth: SmoothMethod,
    pub smooth_value: Option<f64>,
    pub use_effective_order: bool,
}

impl Default for BleuOptions {
    fn default() -> Self {
        Self {
            tokenize: Tokenize::Mteval13a,
            lowercase: false,
            smooth: SmoothMethod::Exp,
            smooth_value: None,
            use_effective_order: false,
        }
    }
}

/// Corpus BLEU result with the statistics it was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BleuScore {
    pub score: f64,
    pub counts: [f64; MAX_NGRAM_ORDER],
    pub totals: [f64; MAX_NGRAM_ORDER],
    pub precisions: [f64; MAX_NGRAM_ORDER],
    pub bp: f64,
    pub sys_len: usize,
    pub ref_len: usize,
}

impl BleuScore {
    pub fn ratio(&self) -> f64 {
        if self.ref_len == 0 {
            0.0
        } else {
            self.sys_len as f64 / self.ref_len as f64
        }
    }
}

impl fmt::Display for BleuScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precisions = self
            .precisions
            .iter()
            .map(|p| format!("{p:.1}"))
            .collect::<Vec<_>>()
            .join("/");
        write!(
            f,
            "BLEU = {:.2} {} (BP = {:.3} ratio = {:.3} hyp_len = {} ref_len = {})",
            self.score,
            precisions,
            self.bp,
            self.ratio(),
            self.sys_len,
            self.ref_len
        )
    }
}

type Ngram<'a> = &'a [&'a str];

fn count_ngrams<'a>(tokens: &'a [&'a str]) -> HashMap<Ngram<'a>, usize> {
    let mut counts = HashMap::new();
    for n in 1..=MAX_NGRAM_ORDER {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

/// Sufficient statistics of a single segment
#[derive(Debug, Default)]
struct SegmentStats {
    sys_len: usize,
    ref_len: usize,
    correct: [usize; MAX_NGRAM_ORDER],
    total: [usize; MAX_NGRAM_ORDER],
}

fn segment_stats(hypothesis: &str, references: &[String]) -> SegmentStats {
    let hyp_tokens: Vec<&str> = hypothesis.split_whitespace().collect();
    let ref_tokens: Vec<Vec<&str>> = references
        .iter()
        .map(|r| r.split_whitespace().collect())
        .collect();

    let hyp_len = hyp_tokens.len();

    // closest reference length, ties broken towards the shorter one
    let ref_len = ref_tokens
        .iter()
        .map(Vec::len)
        .min_by_key(|&len| (len.abs_diff(hyp_len), len))
        .unwrap_or(0);

    // per n-gram maximum count over all references
    let mut max_ref_counts: HashMap<Ngram<'_>, usize> = HashMap::new();
    for tokens in &ref_tokens {
        for (ngram, count) in count_ngrams(tokens) {
            let entry = max_ref_counts.entry(ngram).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    let mut stats = SegmentStats {
        sys_len: hyp_len,
        ref_len,
        ..Default::default()
    };

    for (ngram, count) in count_ngrams(&hyp_tokens) {
        let n = ngram.len() - 1;
        stats.total[n] += count;
        if let Some(&ref_count) = max_ref_counts.get(ngram) {
            stats.correct[n] += count.min(ref_count);
        }
    }

    stats
}

fn preprocess(segment: &str, options: &BleuOptions) -> String {
    let segment = if options.lowercase {
        segment.to_lowercase()
    } else {
        segment.to_string()
    };
    options.tokenize.apply(segment.trim_end())
}

fn ln_or_floor(value: f64) -> f64 {
    if value == 0.0 {
        LOG_ZERO
    } else {
        value.ln()
    }
}

fn compute_score(
    correct: [usize; MAX_NGRAM_ORDER],
    total: [usize; MAX_NGRAM_ORDER],
    sys_len: usize,
    ref_len: usize,
    options: &BleuOptions,
) -> BleuScore {
    let smooth_value = options
        .smooth_value
        .unwrap_or_else(|| options.smooth.default_value());

    let mut counts = correct.map(|c| c as f64);
    let mut totals = total.map(|t| t as f64);
    let mut precisions = [0.0; MAX_NGRAM_ORDER];
    let mut smooth_mteval = 1.0;
    let mut eff_order = MAX_NGRAM_ORDER;

    for n in 0..MAX_NGRAM_ORDER {
        if options.smooth == SmoothMethod::AddK && n > 0 {
            counts[n] += smooth_value;
            totals[n] += smooth_value;
        }

        if totals[n] == 0.0 {
            break;
        }

        if options.use_effective_order {
            eff_order = n + 1;
        }

        if counts[n] == 0.0 {
            match options.smooth {
                SmoothMethod::Exp => {
                    smooth_mteval *= 2.0;
                    precisions[n] = 100.0 / (smooth_mteval * totals[n]);
                }
                SmoothMethod::Floor => {
                    precisions[n] = 100.0 * smooth_value / totals[n];
                }
                SmoothMethod::AddK | SmoothMethod::None => {}
            }
        } else {
            precisions[n] = 100.0 * counts[n] / totals[n];
        }
    }

    let bp = if sys_len < ref_len {
        if sys_len > 0 {
            (1.0 - ref_len as f64 / sys_len as f64).exp()
        } else {
            0.0
        }
    } else {
        1.0
    };

    let log_sum: f64 = precisions[..eff_order].iter().map(|&p| ln_or_floor(p)).sum();
    let score = bp * (log_sum / eff_order as f64).exp();

    BleuScore {
        score,
        counts,
        totals,
        precisions,
        bp,
        sys_len,
        ref_len,
    }
}

/// Corpus-level BLEU over parallel segments.
///
/// `references` holds one stream per reference translation; every stream
/// must have one segment per hypothesis.
pub fn corpus_bleu(
    hypotheses: &[&str],
    references: &[Vec<&str>],
    options: &BleuOptions,
) -> Result<BleuScore, ScoreError> {
    if references.is_empty() {
        return Err(ScoreError::NoReferences);
    }
    for (stream, refs) in references.iter().enumerate() {
        if refs.len() != hypotheses.len() {
            return Err(ScoreError::StreamLengthMismatch {
                stream,
                hypotheses: hypotheses.len(),
                references: refs.len(),
            });
        }
    }

    let mut correct = [0usize; MAX_NGRAM_ORDER];
    let mut total = [0usize; MAX_NGRAM_ORDER];
    let mut sys_len = 0;
    let mut ref_len = 0;

    for (i, hypothesis) in hypotheses.iter().enumerate() {
        let hypothesis = preprocess(hypothesis, options);
        let segment_refs: Vec<String> = references
            .iter()
            .map(|stream| preprocess(stream[i], options))
            .collect();

        let stats = segment_stats(&hypothesis, &segment_refs);
        sys_len += stats.sys_len;
        ref_len += stats.ref_len;
        for n in 0..MAX_NGRAM_ORDER {
            correct[n] += stats.correct[n];
            total[n] += stats.total[n];
        }
    }

    let score = compute_score(correct, total, sys_len, ref_len, options);
    debug!("{} (tokenize={})", score, options.tokenize.name());
    Ok(score)
}

/// Score one candidate against one reference as a single-sentence corpus
pub fn sentence_pair_bleu(
    reference: &str,
    candidate: &str,
    options: &BleuOptions,
) -> Result<BleuScore, ScoreError> {
    corpus_bleu(&[candidate], &[vec![reference]], options)
}
