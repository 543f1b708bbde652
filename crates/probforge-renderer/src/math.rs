//! LaTeX math rendering via pulldown-latex → MathML

use markdown_weaver_escape::escape_html;
use miette::Diagnostic;
use pulldown_latex::{
    Parser, Storage,
    config::{DisplayMode, RenderConfig},
    event::{Content, Event},
    mathml::push_mathml,
};

/// A math expression that could not be typeset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("cannot typeset math: {message}")]
#[diagnostic(code(render::math))]
pub struct MathError {
    pub message: String,
}

impl MathError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns math source (without delimiters) into markup.
///
/// Implementations must behave as pure functions of `source`; failure is an
/// ordinary outcome, not a panic.
pub trait MathTypesetter {
    fn typeset(&self, source: &str) -> Result<String, MathError>;
}

impl<T: MathTypesetter + ?Sized> MathTypesetter for &T {
    fn typeset(&self, source: &str) -> Result<String, MathError> {
        (**self).typeset(source)
    }
}

/// [`MathTypesetter`] producing MathML with pulldown-latex.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownLatex {
    /// Render as display (block) math instead of inline.
    pub display_mode: bool,
}

impl PulldownLatex {
    pub const fn inline() -> Self {
        Self {
            display_mode: false,
        }
    }

    pub const fn block() -> Self {
        Self { display_mode: true }
    }
}

impl MathTypesetter for PulldownLatex {
    fn typeset(&self, source: &str) -> Result<String, MathError> {
        render_math(source, self.display_mode)
    }
}

/// Render LaTeX math to MathML
///
/// # Arguments
/// * `latex` - The LaTeX source string (without `$` delimiters)
/// * `display_mode` - If true, render as display math (block); if false, inline
pub fn render_math(latex: &str, display_mode: bool) -> Result<String, MathError> {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    // push_mathml stops at the first error, collect them all for the message
    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(|err| first_line(&err.to_string())))
        .collect();
    if !errors.is_empty() {
        return Err(MathError::new(errors.join("; ")));
    }

    // push_mathml copies text content into the markup as-is
    let escaped: Vec<Option<String>> = events
        .iter()
        .map(|event| match event {
            Ok(Event::Content(Content::Text(text) | Content::Function(text))) => {
                let mut out = String::with_capacity(text.len());
                let _ = escape_html(&mut out, text);
                Some(out)
            }
            _ => None,
        })
        .collect();
    let events = events
        .into_iter()
        .zip(&escaped)
        .map(|(event, escaped)| match (event, escaped) {
            (Ok(Event::Content(Content::Text(_))), Some(text)) => {
                Ok(Event::Content(Content::Text(text.as_str())))
            }
            (Ok(Event::Content(Content::Function(_))), Some(text)) => {
                Ok(Event::Content(Content::Function(text.as_str())))
            }
            (event, _) => event,
        });

    let mut mathml = String::new();
    push_mathml(&mut mathml, events, config).map_err(|e| MathError::new(e.to_string()))?;
    Ok(escape_text_nodes(&mathml))
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim_end().to_string()
}

/// Escape markup characters left bare between MathML tags.
///
/// Single-character content (a `<` relation, a `&` ordinary) is written
/// unescaped. Tags start with a letter or `/`, and a bare character is always
/// followed by a closing tag or a combining mark, so the two can't be confused.
fn escape_text_nodes(mathml: &str) -> String {
    let mut out = String::with_capacity(mathml.len());
    let mut rest = mathml;
    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];
        match c {
            '<' if after.starts_with(|n: char| n.is_ascii_alphabetic() || n == '/') => {
                let end = after.find('>').map_or(after.len(), |i| i + 1);
                out.push('<');
                out.push_str(&after[..end]);
                rest = &after[end..];
                continue;
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '&' if starts_entity(after) => out.push('&'),
            '&' => out.push_str("&amp;"),
            c => out.push(c),
        }
        rest = after;
    }
    out
}

fn starts_entity(s: &str) -> bool {
    s.find(';').is_some_and(|end| {
        (1..=8).contains(&end)
            && s[..end]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '#')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_inline_math() {
        let mathml = render_math("x^2", false).unwrap();
        assert!(mathml.contains("<math"));
        assert!(mathml.contains("</math>"));
    }

    #[test]
    fn renders_display_math() {
        let mathml = PulldownLatex::block().typeset(r"\frac{a}{b}").unwrap();
        assert!(mathml.contains("<mfrac"));
    }

    #[test]
    fn renders_coordinates() {
        assert!(PulldownLatex::inline().typeset("(2,-4)").is_ok());
        assert!(PulldownLatex::inline().typeset(r"\sum_{i=0}^{n} x_i").is_ok());
    }

    #[test]
    fn handles_invalid_latex() {
        // Unclosed brace
        let err = render_math(r"\frac{a", false).unwrap_err();
        assert!(!err.message.is_empty());
        assert!(!err.message.contains('\n'));
    }

    #[test]
    fn relation_characters_are_escaped() {
        let mathml = render_math("a<b", false).unwrap();
        assert!(mathml.contains(">&lt;</mo>"), "{mathml}");
        assert!(!mathml.contains("<<"), "{mathml}");
    }

    #[test]
    fn text_content_is_escaped() {
        let mathml = render_math(r"\text{a<b}", false).unwrap();
        assert!(mathml.contains("a&lt;b</mtext>"), "{mathml}");
        assert!(!mathml.contains("<b>"), "{mathml}");

        let mathml = render_math(r"\text{<script>alert(1)</script>}", false).unwrap();
        assert!(!mathml.contains("<script"), "{mathml}");
        assert!(mathml.contains("&lt;script&gt;alert(1)&lt;/script&gt;"), "{mathml}");
    }

    #[test]
    fn text_nodes_keep_tags_and_entities() {
        assert_eq!(
            escape_text_nodes("<mo><</mo><mtext>&nbsp;x &amp; y</mtext><mi>&</mi><mo>></mo>"),
            "<mo>&lt;</mo><mtext>&nbsp;x &amp; y</mtext><mi>&amp;</mi><mo>&gt;</mo>"
        );
    }
}
