//! Print view: a standalone HTML page opened in the system browser, which
//! then brings up its own print dialog. Mermaid diagrams are rendered there
//! by the browser.
//!
//! The markdown conversion here is a line-oriented regex substitution, not a
//! CommonMark parser. It covers what people put in notes and slides; the live
//! preview uses pulldown-cmark instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;

use super::draft_store::{KeyValueStore, load_draft};
use crate::app::infrastructure::error::Result;
use crate::app::infrastructure::platform::open_in_browser;

const MERMAID_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";
const PRINT_FILE_NAME: &str = "markpress-print.html";

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("heading regex"));
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}([-*_])(\s*[-*_]){2,}\s*$").expect("rule regex"));
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}>\s?(.*)$").expect("quote regex"));
static UNORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").expect("list regex"));
static ORDERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+(.*)$").expect("list regex"));
static TASK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([ xX])\]\s+(.*)$").expect("task regex"));
static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{0,3}(```+|~~~+)\s*([\w+-]*)").expect("fence regex"));

static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\)").expect("image regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("link regex"));
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code regex"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^~]+)~~").expect("strike regex"));

/// Pick what the print view shows: explicit content first, then the stored
/// draft, then nothing.
pub fn resolve_print_source(content_param: Option<&str>, store: &dyn KeyValueStore) -> String {
    if let Some(content) = content_param.filter(|c| !c.is_empty()) {
        return content.to_string();
    }
    load_draft(store).unwrap_or_default()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Finished markup set aside while the rest of a line is rewritten. Tokens
/// look like `<N>`: escaped text never contains a raw `<`, so user input
/// cannot forge one.
#[derive(Default)]
struct Stash(Vec<String>);

impl Stash {
    fn put(&mut self, html: String) -> String {
        self.0.push(html);
        format!("<{}>", self.0.len() - 1)
    }

    fn restore(&self, mut text: String) -> String {
        // Later entries may contain earlier tokens
        for (i, html) in self.0.iter().enumerate().rev() {
            text = text.replace(&format!("<{}>", i), html);
        }
        text
    }
}

/// Relative references and http(s)/mailto links. Anything else with a
/// scheme (`javascript:`, `data:`, `file:`) is dropped.
fn is_safe_url(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return true;
    };
    if scheme.contains(['/', '?', '#']) {
        // The colon is in the path or query, not a scheme separator
        return true;
    }
    matches!(
        scheme.to_ascii_lowercase().as_str(),
        "http" | "https" | "mailto"
    )
}

fn emphasis(text: &str) -> String {
    let html = BOLD.replace_all(text, "<strong>$1</strong>");
    let html = ITALIC.replace_all(&html, "<em>$1</em>");
    STRIKE.replace_all(&html, "<del>$1</del>").into_owned()
}

fn inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut stash = Stash::default();

    // Code spans first so their contents are not treated as emphasis.
    let html = CODE.replace_all(&escaped, |caps: &regex_lite::Captures| {
        stash.put(format!("<code>{}</code>", &caps[1]))
    });
    let html = IMAGE.replace_all(&html, |caps: &regex_lite::Captures| {
        if is_safe_url(&caps[2]) {
            stash.put(format!("<img src=\"{}\" alt=\"{}\">", &caps[2], &caps[1]))
        } else {
            caps[1].to_string()
        }
    });
    // Emphasis applies to link text only, never to the href.
    let html = LINK.replace_all(&html, |caps: &regex_lite::Captures| {
        if is_safe_url(&caps[2]) {
            stash.put(format!("<a href=\"{}\">{}</a>", &caps[2], emphasis(&caps[1])))
        } else {
            caps[1].to_string()
        }
    });

    stash.restore(emphasis(&html))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

#[derive(Default)]
struct Blocks {
    html: String,
    paragraph: Vec<String>,
    quote: Vec<String>,
    list: Option<(ListKind, Vec<String>)>,
}

impl Blocks {
    fn flush(&mut self) {
        if !self.paragraph.is_empty() {
            let lines: Vec<String> = self.paragraph.drain(..).map(|l| inline(l.trim())).collect();
            self.html.push_str(&format!("<p>{}</p>\n", lines.join("<br>\n")));
        }
        if !self.quote.is_empty() {
            let lines: Vec<String> = self.quote.drain(..).map(|l| inline(l.trim())).collect();
            self.html
                .push_str(&format!("<blockquote><p>{}</p></blockquote>\n", lines.join("<br>\n")));
        }
        if let Some((kind, items)) = self.list.take() {
            let tag = match kind {
                ListKind::Unordered => "ul",
                ListKind::Ordered => "ol",
            };
            self.html.push_str(&format!("<{}>\n", tag));
            for item in items {
                self.html.push_str(&format!("<li>{}</li>\n", list_item(&item)));
            }
            self.html.push_str(&format!("</{}>\n", tag));
        }
    }

    fn push_item(&mut self, kind: ListKind, text: &str) {
        if self.list.as_ref().is_some_and(|(k, _)| *k != kind) || !self.paragraph.is_empty() || !self.quote.is_empty() {
            self.flush();
        }
        self.list
            .get_or_insert_with(|| (kind, Vec::new()))
            .1
            .push(text.to_string());
    }
}

fn list_item(text: &str) -> String {
    match TASK.captures(text) {
        Some(caps) => {
            let checked = if &caps[1] == " " { "" } else { " checked" };
            format!("<input type=\"checkbox\" disabled{}> {}", checked, inline(&caps[2]))
        }
        None => inline(text),
    }
}

/// Convert markdown to an HTML fragment for the print page.
pub fn markdown_to_print_html(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    let mut blocks = Blocks::default();
    let mut lines = normalized.lines();

    while let Some(line) = lines.next() {
        if let Some(caps) = FENCE.captures(line) {
            blocks.flush();
            let fence = caps[1].to_string();
            let lang = caps[2].to_ascii_lowercase();
            let mut code = Vec::new();
            for inner in lines.by_ref() {
                if inner.trim_start().starts_with(&fence) {
                    break;
                }
                code.push(inner);
            }
            let body = escape_html(&code.join("\n"));
            if lang == "mermaid" {
                blocks.html.push_str(&format!("<div class=\"mermaid\">\n{}\n</div>\n", body));
            } else if lang.is_empty() {
                blocks.html.push_str(&format!("<pre><code>{}</code></pre>\n", body));
            } else {
                blocks.html.push_str(&format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>\n",
                    lang, body
                ));
            }
            continue;
        }

        if line.trim().is_empty() {
            blocks.flush();
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            blocks.flush();
            let level = caps[1].len();
            blocks
                .html
                .push_str(&format!("<h{0}>{1}</h{0}>\n", level, inline(&caps[2])));
            continue;
        }

        if RULE.is_match(line) {
            blocks.flush();
            blocks.html.push_str("<hr>\n");
            continue;
        }

        if let Some(caps) = QUOTE.captures(line) {
            if !blocks.paragraph.is_empty() || blocks.list.is_some() {
                blocks.flush();
            }
            blocks.quote.push(caps[1].to_string());
            continue;
        }

        if let Some(caps) = UNORDERED.captures(line) {
            blocks.push_item(ListKind::Unordered, &caps[1]);
            continue;
        }

        if let Some(caps) = ORDERED.captures(line) {
            blocks.push_item(ListKind::Ordered, &caps[1]);
            continue;
        }

        if blocks.list.is_some() || !blocks.quote.is_empty() {
            blocks.flush();
        }
        blocks.paragraph.push(line.to_string());
    }

    blocks.flush();
    blocks.html
}

/// Text of the first heading, used as the page title.
pub fn document_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| HEADING.captures(line).map(|caps| caps[2].trim().to_string()))
        .filter(|t| !t.is_empty())
}

/// Wrap a body fragment in a complete print-ready page.
pub fn render_print_document(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
  body {{ font-family: -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
         line-height: 1.6; color: #1f2328; max-width: 820px; margin: 2rem auto; padding: 0 1rem; }}
  h1, h2 {{ border-bottom: 1px solid #d0d7de; padding-bottom: .3em; }}
  pre {{ background: #f6f8fa; padding: 1em; overflow-x: auto; border-radius: 6px; }}
  code {{ font-family: ui-monospace, Menlo, Consolas, monospace; font-size: 0.9em; }}
  blockquote {{ margin: 0; padding: 0 1em; color: #59636e; border-left: .25em solid #d0d7de; }}
  img {{ max-width: 100%; }}
  .mermaid {{ text-align: center; margin: 1em 0; }}
  @media print {{
    body {{ margin: 0; max-width: none; }}
    pre, blockquote, .mermaid, img {{ page-break-inside: avoid; }}
    h1, h2, h3 {{ page-break-after: avoid; }}
  }}
</style>
<script src="{mermaid}"></script>
</head>
<body>
<main id="content">
{body}</main>
<script>
  if (window.mermaid) {{ mermaid.initialize({{ startOnLoad: true }}); }}
  window.addEventListener("load", function () {{ setTimeout(function () {{ window.print(); }}, 600); }});
</script>
</body>
</html>
"#,
        title = escape_html(title),
        mermaid = MERMAID_SCRIPT,
        body = body_html,
    )
}

/// A rendered print page ready to be written and opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    pub title: String,
    pub html: String,
}

impl PrintJob {
    pub fn from_markdown(markdown: &str) -> Self {
        let title = document_title(markdown).unwrap_or_else(|| "Untitled".to_string());
        let html = render_print_document(&title, &markdown_to_print_html(markdown));
        Self { title, html }
    }

    /// Write the page into `dir`, replacing the previous print page.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(PRINT_FILE_NAME);
        fs::write(&path, &self.html)?;
        tracing::debug!(path = %path.display(), "Print view written");
        Ok(path)
    }
}

pub fn print_dir() -> PathBuf {
    std::env::temp_dir().join("markpress")
}

/// Render `markdown`, write the page under `print_dir()` and hand it to the
/// browser. Returns the written path.
pub fn open_print_view(markdown: &str) -> Result<PathBuf> {
    let job = PrintJob::from_markdown(markdown);
    let path = job.write_to(&print_dir())?;
    open_in_browser(&path)?;
    tracing::info!(title = %job.title, "Print view opened");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::draft_store::{DRAFT_KEY, MemoryStore};

    #[test]
    fn test_source_prefers_explicit_content() {
        let mut store = MemoryStore::new();
        store.set(DRAFT_KEY, "# Stored").unwrap();
        assert_eq!(resolve_print_source(Some("# Given"), &store), "# Given");
        assert_eq!(resolve_print_source(Some(""), &store), "# Stored");
        assert_eq!(resolve_print_source(None, &store), "# Stored");
    }

    #[test]
    fn test_no_draft_no_param_renders_empty() {
        let store = MemoryStore::new();
        let source = resolve_print_source(None, &store);
        assert_eq!(source, "");

        let job = PrintJob::from_markdown(&source);
        assert_eq!(job.title, "Untitled");
        assert!(job.html.contains("<main id=\"content\">\n</main>"));
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let html = markdown_to_print_html("# Title\n\nSome **bold** and *italic* text.\n\n### Sub ###");
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>Some <strong>bold</strong> and <em>italic</em> text.</p>\n<h3>Sub</h3>\n"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        let html = markdown_to_print_html("a <script>alert(1)</script> & b");
        assert_eq!(html, "<p>a &lt;script&gt;alert(1)&lt;/script&gt; &amp; b</p>\n");
    }

    #[test]
    fn test_code_span_is_not_emphasized() {
        let html = markdown_to_print_html("call `a*b*c` now");
        assert_eq!(html, "<p>call <code>a*b*c</code> now</p>\n");
    }

    #[test]
    fn test_links_and_images() {
        let html = markdown_to_print_html("![logo](img/logo.png) see [docs](https://example.com/?a=1&b=2)");
        assert_eq!(
            html,
            "<p><img src=\"img/logo.png\" alt=\"logo\"> see <a href=\"https://example.com/?a=1&amp;b=2\">docs</a></p>\n"
        );
    }

    #[test]
    fn test_trailing_hash_kept_without_closing_sequence() {
        let html = markdown_to_print_html("# Learn C#\n\n## F# notes\n\n### Closed ##");
        assert_eq!(html, "<h1>Learn C#</h1>\n<h2>F# notes</h2>\n<h3>Closed</h3>\n");
        assert_eq!(document_title("# Learn C#"), Some("Learn C#".to_string()));
    }

    #[test]
    fn test_emphasis_never_touches_urls() {
        let html = markdown_to_print_html("see [docs](http://x/a*b*c) and ![d](img/a_*b*_.png)");
        assert_eq!(
            html,
            "<p>see <a href=\"http://x/a*b*c\">docs</a> and <img src=\"img/a_*b*_.png\" alt=\"d\"></p>\n"
        );
    }

    #[test]
    fn test_link_text_keeps_emphasis() {
        let html = markdown_to_print_html("[**bold** docs](https://example.com)");
        assert_eq!(
            html,
            "<p><a href=\"https://example.com\"><strong>bold</strong> docs</a></p>\n"
        );
    }

    #[test]
    fn test_placeholder_lookalikes_stay_literal() {
        let html = markdown_to_print_html("a \u{0}0\u{0} and <0> with `code`");
        assert_eq!(html, "<p>a \u{0}0\u{0} and &lt;0&gt; with <code>code</code></p>\n");
    }

    #[test]
    fn test_script_urls_are_dropped() {
        let html = markdown_to_print_html("[click](javascript:void) ![x](JavaScript:boom)");
        assert!(!html.to_ascii_lowercase().contains("javascript"));
        assert_eq!(html, "<p>click x</p>\n");
    }

    #[test]
    fn test_url_safety() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("docs/intro.md"));
        assert!(is_safe_url("#section"));
        assert!(is_safe_url("/wiki/a:b"));
        assert!(is_safe_url("mailto:team@example.com"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("data:text/html;base64,AAAA"));
    }

    #[test]
    fn test_lists_and_tasks() {
        let html = markdown_to_print_html("- one\n- [x] done\n- [ ] todo\n\n1. first\n2. second");
        assert_eq!(
            html,
            "<ul>\n<li>one</li>\n<li><input type=\"checkbox\" disabled checked> done</li>\n\
             <li><input type=\"checkbox\" disabled> todo</li>\n</ul>\n\
             <ol>\n<li>first</li>\n<li>second</li>\n</ol>\n"
        );
    }

    #[test]
    fn test_fenced_code_and_mermaid() {
        let md = "```rust\nfn main() { println!(\"<hi>\"); }\n```\n\n```mermaid\ngraph TD; A-->B;\n```";
        let html = markdown_to_print_html(md);
        assert!(html.contains(
            "<pre><code class=\"language-rust\">fn main() { println!(&quot;&lt;hi&gt;&quot;); }</code></pre>"
        ));
        assert!(html.contains("<div class=\"mermaid\">\ngraph TD; A--&gt;B;\n</div>"));
    }

    #[test]
    fn test_code_fence_keeps_markdown_literal() {
        let html = markdown_to_print_html("```\n# not a heading\n- not a list\n```");
        assert_eq!(html, "<pre><code># not a heading\n- not a list</code></pre>\n");
    }

    #[test]
    fn test_blockquote_and_rule() {
        let html = markdown_to_print_html("> quoted\n> more\n\n---\nafter");
        assert_eq!(
            html,
            "<blockquote><p>quoted<br>\nmore</p></blockquote>\n<hr>\n<p>after</p>\n"
        );
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("intro\n## Deck title\n# Later"), Some("Deck title".to_string()));
        assert_eq!(document_title("no headings"), None);
    }

    #[test]
    fn test_page_includes_mermaid_and_print_hook() {
        let job = PrintJob::from_markdown("# A & B");
        assert_eq!(job.title, "A & B");
        assert!(job.html.contains("<title>A &amp; B</title>"));
        assert!(job.html.contains(MERMAID_SCRIPT));
        assert!(job.html.contains("window.print()"));
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let job = PrintJob::from_markdown("# Hi");
        let path = job.write_to(&dir.path().join("print")).unwrap();
        assert_eq!(path.file_name().unwrap(), PRINT_FILE_NAME);
        assert_eq!(fs::read_to_string(path).unwrap(), job.html);
    }
}
