use pulldown_cmark::{html, Event, Options, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether raw HTML embedded in markdown is passed through or escaped.
pub enum RawHtml {
    Allow,
    Escape,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render markdown (tables, lists, headings) to an HTML fragment.
pub fn render_markdown(text: &str, raw_html: RawHtml) -> String {
    let parser = Parser::new_ext(text, markdown_options()).map(|event| match (raw_html, event) {
        (RawHtml::Escape, Event::Html(raw)) | (RawHtml::Escape, Event::InlineHtml(raw)) => {
            Event::Text(raw)
        }
        (_, event) => event,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
