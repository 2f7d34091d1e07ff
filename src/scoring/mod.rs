pub mod bleu;
pub mod tokenizer;

pub use bleu::{corpus_bleu, sentence_pair_bleu, BleuOptions, BleuScore, ScoreError, SmoothMethod};
pub use tokenizer::Tokenize;
