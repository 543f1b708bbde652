//! HTML output for rendered spans.

use markdown_weaver_escape::{StrWrite, escape_html, escape_html_body_text};

use crate::span::RenderedSpan;

/// Write spans as inline HTML.
///
/// Prose is escaped, never interpreted. Typeset math is wrapped in
/// `span.math`; degraded math keeps its literal source in a `code` element
/// under `span.math.math-error`, with the error message as its title.
pub fn write_spans<W: StrWrite>(mut writer: W, spans: &[RenderedSpan<'_>]) -> Result<(), W::Error> {
    for span in spans {
        match span {
            RenderedSpan::Text(value) => escape_html_body_text(&mut writer, value)?,
            RenderedSpan::Math { markup, .. } => {
                writer.write_str(r#"<span class="math math-inline">"#)?;
                writer.write_str(markup)?;
                writer.write_str("</span>")?;
            }
            RenderedSpan::Degraded { literal, message } => {
                writer.write_str(r#"<span class="math math-error math-inline" title=""#)?;
                escape_html(&mut writer, message)?;
                writer.write_str(r#""><code>"#)?;
                escape_html_body_text(&mut writer, literal)?;
                writer.write_str("</code></span>")?;
            }
        }
    }
    Ok(())
}

/// Render spans to an HTML string.
pub fn to_html(spans: &[RenderedSpan<'_>]) -> String {
    let mut html = String::new();
    // writing to a String can't fail
    let _ = write_spans(&mut html, spans);
    html
}
