//! Probforge renderer
//!
//! Turns mixed prose/math strings (`"放物線 $y = x^2$ の頂点"`) into HTML.
//! A string is split into spans by [`segment::parse`], each span is rendered
//! on its own by a [`span::SpanRenderer`], and [`html`] writes the result.
//! Math that fails to typeset degrades to its literal source; it never
//! takes the rest of the text down with it.

pub mod html;
pub mod math;
pub mod segment;
pub mod span;

pub use math::{MathError, MathTypesetter, PulldownLatex};
pub use segment::{DELIMITER, Span, parse, reconstruct};
pub use span::{RenderSummary, RenderedContent, RenderedSpan, SpanRenderer, render, render_all};

/// Render mixed content straight to an HTML fragment.
pub fn render_html(input: &str) -> String {
    render_all(input).to_html()
}
