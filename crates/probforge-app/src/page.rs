//! Standalone HTML document for a composed [`View`].

use markdown_weaver_escape::{StrWrite, escape_html, escape_html_body_text};
use probforge_common::{Difficulty, Subject};
use probforge_renderer::{RenderedContent, html::write_spans};

use crate::view::{InputPane, ResultPane, View};

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f9fafb; color: #1f2937; margin: 0; padding: 1.5rem; }
main { max-width: 80rem; margin: 0 auto; display: flex; gap: 1.5rem; flex-wrap: wrap; }
section { flex: 1 1 30rem; background: #fff; border-radius: 0.75rem; padding: 1.25rem; border: 1px solid #e5e7eb; }
.mixed { white-space: pre-wrap; line-height: 1.8; }
.math-error { color: #b91c1c; background: #fef2f2; }
.busy { color: #4338ca; }
.failed { color: #b91c1c; }
.placeholder { color: #9ca3af; text-align: center; }
.solution { background: #f9fafb; padding: 1rem; border-radius: 0.5rem; font-size: 0.9em; }
textarea { width: 100%; min-height: 12rem; font-family: monospace; }
"#;

struct PageWriter<W> {
    writer: W,
}

impl<W: StrWrite> PageWriter<W> {
    fn write(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_str(s)
    }

    fn text(&mut self, s: &str) -> Result<(), W::Error> {
        escape_html_body_text(&mut self.writer, s)
    }

    fn attr(&mut self, s: &str) -> Result<(), W::Error> {
        escape_html(&mut self.writer, s)
    }

    fn mixed(&mut self, content: &RenderedContent<'_>) -> Result<(), W::Error> {
        self.write(r#"<div class="mixed">"#)?;
        write_spans(&mut self.writer, &content.spans)?;
        self.write("</div>\n")
    }

    fn run(mut self, view: &View<'_>) -> Result<(), W::Error> {
        let labels = view.labels;
        self.write("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>")?;
        self.text(labels.title)?;
        self.write("</title>\n<style>")?;
        self.write(STYLE)?;
        self.write("</style>\n</head>\n<body>\n<header><h1>")?;
        self.text(labels.title)?;
        self.write("</h1></header>\n<main>\n")?;
        self.input_pane(view, &view.input)?;
        self.result_pane(view, &view.result)?;
        self.write("</main>\n</body>\n</html>\n")
    }

    fn input_pane(&mut self, view: &View<'_>, pane: &InputPane<'_>) -> Result<(), W::Error> {
        let labels = view.labels;
        self.write("<section class=\"input\">\n<h2>")?;
        self.text(labels.input_heading)?;
        self.write("</h2>\n<select name=\"subject\">")?;
        for subject in Subject::ALL {
            self.option(
                subject.as_str(),
                labels.subject(subject),
                subject == pane.subject,
            )?;
        }
        self.write("</select>\n<select name=\"difficulty\">")?;
        for level in Difficulty::levels() {
            let label = format!("{}: {level}", labels.difficulty);
            self.option(&level.to_string(), &label, level == pane.difficulty)?;
        }
        self.write("</select>\n<textarea name=\"content\" placeholder=\"")?;
        self.attr(labels.content_placeholder)?;
        self.write("\">")?;
        self.text(pane.content)?;
        self.write("</textarea>\n")?;
        if !pane.preview.is_empty() {
            self.mixed(&pane.preview)?;
        }
        self.write("<button type=\"submit\"")?;
        if !pane.submit.enabled {
            self.write(" disabled")?;
        }
        self.write(">")?;
        self.text(pane.submit.label)?;
        self.write("</button>\n</section>\n")
    }

    fn option(&mut self, value: &str, label: &str, selected: bool) -> Result<(), W::Error> {
        self.write("<option value=\"")?;
        self.attr(value)?;
        self.write("\"")?;
        if selected {
            self.write(" selected")?;
        }
        self.write(">")?;
        self.text(label)?;
        self.write("</option>")
    }

    fn result_pane(&mut self, view: &View<'_>, pane: &ResultPane<'_>) -> Result<(), W::Error> {
        let labels = view.labels;
        self.write("<section class=\"result\">\n<h2>")?;
        self.text(labels.result_heading)?;
        self.write("</h2>\n")?;
        match pane {
            ResultPane::Placeholder { message } => {
                self.write("<p class=\"placeholder\">")?;
                self.text(message)?;
                self.write("</p>\n")?;
            }
            ResultPane::Busy { status } => {
                self.write("<p class=\"busy\" role=\"status\">")?;
                self.text(status)?;
                self.write("</p>\n")?;
            }
            ResultPane::Failed { message } => {
                self.write("<p class=\"failed\" role=\"alert\">")?;
                self.text(message)?;
                self.write("</p>\n")?;
            }
            ResultPane::Generated { problem, solution } => {
                self.mixed(problem)?;
                if let Some(solution) = solution {
                    self.write("<hr>\n<div class=\"solution\">\n<h3>")?;
                    self.text(labels.solution_heading)?;
                    self.write("</h3>\n")?;
                    self.mixed(solution)?;
                    self.write("</div>\n")?;
                }
            }
        }
        self.write("</section>\n")
    }
}

/// Write `view` as a complete HTML document.
pub fn write_page<W: StrWrite>(writer: W, view: &View<'_>) -> Result<(), W::Error> {
    PageWriter { writer }.run(view)
}

/// Render `view` as a complete HTML document.
pub fn to_page(view: &View<'_>) -> String {
    let mut html = String::new();
    // writing to a String can't fail
    let _ = write_page(&mut html, view);
    html
}

/// Only the result pane, for embedding in another page.
pub fn result_fragment(view: &View<'_>) -> String {
    let mut html = String::new();
    let mut page = PageWriter { writer: &mut html };
    let _ = page.result_pane(view, &view.result);
    html
}
