use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use super::print::escape_html;

/// Render markdown for the in-app preview pane.
///
/// Mermaid blocks are replaced by a boxed copy of their source: the preview
/// widget has no script engine, so diagrams only render in the print view.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut in_diagram = false;
    let mut diagram_source = String::new();
    let parser = Parser::new_ext(text, options).filter_map(|event| match event {
        Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref lang)))
            if lang.trim().eq_ignore_ascii_case("mermaid") =>
        {
            in_diagram = true;
            diagram_source.clear();
            None
        }
        Event::Text(ref t) if in_diagram => {
            diagram_source.push_str(t);
            None
        }
        Event::End(TagEnd::CodeBlock) if in_diagram => {
            in_diagram = false;
            Some(Event::Html(CowStr::from(diagram_placeholder(&diagram_source))))
        }
        other => Some(other),
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn diagram_placeholder(source: &str) -> String {
    format!(
        "<table border=\"1\" cellpadding=\"6\" width=\"100%\"><tr><td>\
         <b>Diagram</b> <i>(rendered in print view)</i>\
         <pre>{}</pre></td></tr></table>\n",
        escape_html(source.trim_end())
    )
}

/// Wrap rendered HTML for FLTK's HelpView, which understands body colors and
/// font tags but not CSS.
pub fn wrap_for_helpview(html: &str, is_dark: bool) -> String {
    let (bg, fg, link) = if is_dark {
        ("#1e1e1e", "#dcdcdc", "#6cb6ff")
    } else {
        ("#ffffff", "#1f2328", "#0969da")
    };
    format!(
        "<html><body bgcolor=\"{}\" text=\"{}\" link=\"{}\"><font face=\"Helvetica\" size=\"4\">{}</font></body></html>",
        bg, fg, link, html
    )
}

/// Check if a file path points to a markdown file.
pub fn is_markdown_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown") || lower.ends_with(".mdown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let html = render_markdown("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_mermaid_becomes_placeholder() {
        let html = render_markdown("```mermaid\ngraph LR\n  A --> B\n```\n");
        assert!(html.contains("<b>Diagram</b>"));
        assert!(html.contains("<pre>graph LR\n  A --&gt; B</pre>"));
        assert!(!html.contains("language-mermaid"));
    }

    #[test]
    fn test_other_code_blocks_untouched() {
        let html = render_markdown("```rust\nlet x = 1;\n```\n");
        assert!(html.contains("<code class=\"language-rust\">"));
        assert!(!html.contains("Diagram"));
    }

    #[test]
    fn test_wrap_for_helpview_uses_theme_colors() {
        let light = wrap_for_helpview("<p>Hi</p>", false);
        assert!(light.contains("bgcolor=\"#ffffff\""));
        assert!(light.contains("<p>Hi</p>"));

        let dark = wrap_for_helpview("<p>Hi</p>", true);
        assert!(dark.contains("bgcolor=\"#1e1e1e\""));
    }

    #[test]
    fn test_is_markdown_file() {
        assert!(is_markdown_file("notes/README.MD"));
        assert!(is_markdown_file("a.markdown"));
        assert!(!is_markdown_file("main.rs"));
    }
}
