pub mod interface;
pub mod factory;
pub mod generation;
pub mod m2m100_onnx;
pub mod m2m100_tokenizer;
pub mod remote;

pub use interface::{TranslateError, TranslateRequest, TranslateResponse, Translator};
pub use factory::TranslatorFactory;

#[cfg(test)]
pub mod mock;
