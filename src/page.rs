//! Server-side rendering of the translation page.
//!
//! The page is a plain HTML form; every submission renders the output
//! from the submitted input state alone.

use std::fmt::Write;

use crate::handlers::{TranslationForm, TranslationOutcome};
use crate::languages::{Language, LANGUAGES};

pub const TITLE: &str = "Translation App with BLEU Score Calculation";
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter text to translate.";

/// What to show below the form
#[derive(Debug)]
pub enum PageMessage<'a> {
    None,
    Outcome(&'a TranslationOutcome),
    Error(String),
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_select(out: &mut String, name: &str, label: &str, selected: &Language) {
    let _ = writeln!(out, r#"<label for="{name}">{label}</label>"#);
    let _ = writeln!(out, r#"<select id="{name}" name="{name}">"#);
    for lang in LANGUAGES.iter() {
        let marker = if lang == selected { " selected" } else { "" };
        let _ = writeln!(
            out,
            r#"<option value="{}" data-code="{}"{}>{}</option>"#,
            lang.name, lang.code, marker, lang.name
        );
    }
    out.push_str("</select>\n");
}

fn render_message(out: &mut String, message: &PageMessage<'_>) {
    match message {
        PageMessage::None => {}
        PageMessage::Outcome(TranslationOutcome::EmptyInput) => {
            let _ = writeln!(out, r#"<p class="notice">{EMPTY_INPUT_MESSAGE}</p>"#);
        }
        PageMessage::Outcome(TranslationOutcome::Translated { text, bleu }) => {
            out.push_str("<section id=\"result\">\n<p>Translated text:</p>\n");
            let _ = writeln!(out, r#"<p id="translated-text">{}</p>"#, escape_html(text));
            if let Some(bleu) = bleu {
                let _ = writeln!(out, r#"<p id="bleu-score">BLEU score: {:.2}</p>"#, bleu.score);
            }
            out.push_str("</section>\n");
        }
        PageMessage::Error(error) => {
            let _ = writeln!(out, r#"<p class="error">Error: {}</p>"#, escape_html(error));
        }
    }
}

/// Render the full page for the given input state
pub fn render_page(
    form: &TranslationForm,
    source: &Language,
    target: &Language,
    message: &PageMessage<'_>,
) -> String {
    let mut out = String::with_capacity(4096);
    let _ = write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{TITLE}</title>
<style>
body {{ font-family: sans-serif; display: flex; margin: 0; }}
aside {{ width: 16rem; padding: 1rem; background: #f0f2f6; min-height: 100vh; }}
main {{ flex: 1; padding: 1rem 2rem; }}
textarea {{ width: 100%; min-height: 6rem; }}
select {{ width: 100%; margin-bottom: 1rem; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<form method="post" action="/" style="display: contents">
<aside>
<h2>Translation Settings</h2>
"#
    );

    render_select(&mut out, "source_lang", "Select source language", source);
    render_select(&mut out, "target_lang", "Select target language", target);

    let _ = write!(
        out,
        r#"</aside>
<main>
<h1>{TITLE}</h1>
<label for="text">Enter the text to translate:</label>
<textarea id="text" name="text">{}</textarea>
<label for="reference">Enter the reference translation (optional):</label>
<textarea id="reference" name="reference">{}</textarea>
<p><button type="submit">Translate</button></p>
"#,
        escape_html(&form.text),
        escape_html(&form.reference)
    );

    render_message(&mut out, message);

    out.push_str("</main>\n</form>\n</body>\n</html>\n");
    out
}
