//! Rendering spans, one at a time, with failures kept inside the span.

use std::borrow::Cow;

use crate::math::{MathTypesetter, PulldownLatex};
use crate::segment::{self, Span};

/// Displayable output for one [`Span`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedSpan<'a> {
    /// Prose, to be shown verbatim.
    Text(&'a str),
    /// Successfully typeset math.
    Math { source: &'a str, markup: String },
    /// Math that failed to typeset, shown as its literal source.
    Degraded {
        literal: Cow<'a, str>,
        message: String,
    },
}

impl RenderedSpan<'_> {
    pub const fn is_degraded(&self) -> bool {
        matches!(self, RenderedSpan::Degraded { .. })
    }
}

/// The rendered spans of one mixed-content string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedContent<'a> {
    pub spans: Vec<RenderedSpan<'a>>,
}

impl<'a> RenderedContent<'a> {
    /// No spans means nothing to show; it is not an error.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn summary(&self) -> RenderSummary {
        self.spans
            .iter()
            .fold(RenderSummary::default(), |mut acc, span| {
                match span {
                    RenderedSpan::Text(_) => acc.text += 1,
                    RenderedSpan::Math { .. } => acc.math += 1,
                    RenderedSpan::Degraded { .. } => acc.degraded += 1,
                }
                acc
            })
    }

    pub fn degraded(&self) -> impl Iterator<Item = &RenderedSpan<'a>> {
        self.spans.iter().filter(|s| s.is_degraded())
    }

    pub fn to_html(&self) -> String {
        crate::html::to_html(&self.spans)
    }
}

/// Span counts by outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSummary {
    pub text: usize,
    pub math: usize,
    pub degraded: usize,
}

/// Renders spans with a given math typesetter.
#[derive(Debug, Clone, Default)]
pub struct SpanRenderer<T = PulldownLatex> {
    typesetter: T,
}

impl<T: MathTypesetter> SpanRenderer<T> {
    pub fn new(typesetter: T) -> Self {
        Self { typesetter }
    }

    pub fn render<'a>(&self, span: Span<'a>) -> RenderedSpan<'a> {
        match span {
            Span::Text(value) => RenderedSpan::Text(value),
            Span::Math { source, .. } => match self.typesetter.typeset(source) {
                Ok(markup) => RenderedSpan::Math { source, markup },
                Err(err) => {
                    tracing::debug!(source, error = %err.message, "math span degraded");
                    RenderedSpan::Degraded {
                        literal: span.literal(),
                        message: err.message,
                    }
                }
            },
        }
    }

    /// Parse and render a whole mixed-content string.
    pub fn render_all<'a>(&self, input: &'a str) -> RenderedContent<'a> {
        let spans = segment::parse(input)
            .into_iter()
            .map(|span| self.render(span))
            .collect();
        let content = RenderedContent { spans };
        let summary = content.summary();
        tracing::trace!(
            text = summary.text,
            math = summary.math,
            degraded = summary.degraded,
            "rendered mixed content"
        );
        content
    }
}

/// Render one span with the default typesetter.
pub fn render(span: Span<'_>) -> RenderedSpan<'_> {
    SpanRenderer::<PulldownLatex>::default().render(span)
}

/// Parse and render `input` with the default typesetter.
pub fn render_all(input: &str) -> RenderedContent<'_> {
    SpanRenderer::<PulldownLatex>::default().render_all(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::MathError;

    /// Wraps the source in a marker; rejects anything containing `!`.
    struct Fake;

    impl MathTypesetter for Fake {
        fn typeset(&self, source: &str) -> Result<String, MathError> {
            if source.contains('!') {
                Err(MathError::new("bang"))
            } else {
                Ok(format!("<m>{source}</m>"))
            }
        }
    }

    #[test]
    fn text_is_verbatim() {
        let renderer = SpanRenderer::new(Fake);
        assert_eq!(
            renderer.render(Span::Text("<script>")),
            RenderedSpan::Text("<script>")
        );
    }

    #[test]
    fn one_bad_expression_degrades_only_itself() {
        let content = SpanRenderer::new(Fake).render_all("a $x$ b $y!$ c $z$");
        assert_eq!(
            content.spans,
            vec![
                RenderedSpan::Text("a "),
                RenderedSpan::Math {
                    source: "x",
                    markup: "<m>x</m>".into()
                },
                RenderedSpan::Text(" b "),
                RenderedSpan::Degraded {
                    literal: "$y!$".into(),
                    message: "bang".into()
                },
                RenderedSpan::Text(" c "),
                RenderedSpan::Math {
                    source: "z",
                    markup: "<m>z</m>".into()
                },
            ]
        );
        assert_eq!(
            content.summary(),
            RenderSummary {
                text: 3,
                math: 2,
                degraded: 1
            }
        );
    }

    #[test]
    fn unclosed_run_degrades_without_closing_delimiter() {
        let content = SpanRenderer::new(Fake).render_all("a $oops!");
        assert_eq!(
            content.degraded().collect::<Vec<_>>(),
            vec![&RenderedSpan::Degraded {
                literal: "$oops!".into(),
                message: "bang".into()
            }]
        );
    }

    #[test]
    fn invalid_latex_is_isolated_with_pulldown() {
        let content = render_all(r"前 $x^2$ 中 $\frac{a$ 後 $(2,-4)$");
        let summary = content.summary();
        assert_eq!(summary.degraded, 1);
        assert_eq!(summary.math, 2);
        assert_eq!(summary.text, 3);
        match &content.spans[3] {
            RenderedSpan::Degraded { literal, .. } => assert_eq!(literal, r"$\frac{a$"),
            other => panic!("expected degraded span, got {other:?}"),
        }
    }

    #[test]
    fn degraded_message_is_one_line() {
        let content = render_all(r"$\frac{a$");
        let [RenderedSpan::Degraded { message, .. }] = content.spans.as_slice() else {
            panic!("expected one degraded span, got {:?}", content.spans);
        };
        assert!(!message.is_empty());
        assert!(!message.contains('\n'), "{message}");
    }

    #[test]
    fn empty_input_renders_nothing() {
        let content = render_all("");
        assert!(content.is_empty());
        assert_eq!(content.to_html(), "");
    }
}
