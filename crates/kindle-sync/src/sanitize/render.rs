//! Indented serialization of a cleaned article body.

use scraper::{ElementRef, Html, Node, Selector};

/// What to do with the n-th `<img>` of the document (in document order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImageRewrite {
    /// Leave the element as parsed.
    Keep,
    /// Replace `src` with the given data URI.
    Inline(String),
    /// Remove the element.
    Drop,
}

/// Elements removed together with their content. `noscript` bodies are
/// raw text under a scripting-enabled parse.
const STRIPPED: &[&str] = &["script", "style", "noscript"];

/// Elements whose content must not be re-indented.
const PREFORMATTED: &[&str] = &["pre", "textarea"];

const VOID: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Render the children of `<body>` (or the whole document when there is no
/// body) one node per line, applying `rewrites` to images by ordinal.
pub(crate) fn render_body(document: &Html, rewrites: &[ImageRewrite]) -> String {
    let body_selector = Selector::parse("body").expect("Invalid body selector");
    let has_body = document.select(&body_selector).next().is_some();

    let mut renderer = Renderer {
        rewrites,
        next_image: 0,
        out: String::new(),
    };
    renderer.element(document.root_element(), 0, !has_body);
    renderer.out
}

struct Renderer<'a> {
    rewrites: &'a [ImageRewrite],
    next_image: usize,
    out: String,
}

impl Renderer<'_> {
    /// Walk `element`. Nothing is written until `emitting` is set, which
    /// happens on entering `<body>`; images are counted either way so that
    /// ordinals match a plain `img` selection over the document.
    fn element(&mut self, element: ElementRef<'_>, depth: usize, emitting: bool) {
        let name = element.value().name();
        if STRIPPED.contains(&name) {
            return;
        }

        let src = if name == "img" {
            match self.take_image() {
                ImageRewrite::Drop => return,
                ImageRewrite::Inline(uri) => Some(uri),
                ImageRewrite::Keep => None,
            }
        } else {
            None
        };

        if !emitting {
            let entering_body = name == "body";
            self.children(element, 0, entering_body);
            return;
        }

        if PREFORMATTED.contains(&name) {
            self.indent(depth);
            self.inline(element);
            self.out.push('\n');
            return;
        }

        self.indent(depth);
        self.open_tag(element, src.as_deref());
        self.out.push('\n');
        if VOID.contains(&name) {
            return;
        }

        self.children(element, depth + 1, true);

        self.indent(depth);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push_str(">\n");
    }

    fn children(&mut self, element: ElementRef<'_>, depth: usize, emitting: bool) {
        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child, depth, emitting);
                    }
                }
                Node::Text(text) if emitting => {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.indent(depth);
                        self.out.push_str(&escape_text(text));
                        self.out.push('\n');
                    }
                }
                Node::Comment(comment) if emitting => {
                    self.indent(depth);
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->\n");
                }
                _ => {}
            }
        }
    }

    /// Serialize without adding or removing whitespace.
    fn inline(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if STRIPPED.contains(&name) {
            return;
        }

        let src = if name == "img" {
            match self.take_image() {
                ImageRewrite::Drop => return,
                ImageRewrite::Inline(uri) => Some(uri),
                ImageRewrite::Keep => None,
            }
        } else {
            None
        };

        self.open_tag(element, src.as_deref());
        if VOID.contains(&name) {
            return;
        }

        for child in element.children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.inline(child);
                    }
                }
                Node::Text(text) => self.out.push_str(&escape_text(text)),
                Node::Comment(comment) => {
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->");
                }
                _ => {}
            }
        }

        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn take_image(&mut self) -> ImageRewrite {
        let rewrite = self
            .rewrites
            .get(self.next_image)
            .cloned()
            .unwrap_or(ImageRewrite::Keep);
        self.next_image += 1;
        rewrite
    }

    fn open_tag(&mut self, element: ElementRef<'_>, src_override: Option<&str>) {
        let name = element.value().name();
        self.out.push('<');
        self.out.push_str(name);

        let mut wrote_src = false;
        for (attr, value) in element.value().attrs() {
            let value = if attr == "src" {
                wrote_src = true;
                src_override.unwrap_or(value)
            } else {
                value
            };
            self.attribute(attr, value);
        }
        if let (false, Some(src)) = (wrote_src, src_override) {
            self.attribute("src", src);
        }

        if VOID.contains(&name) {
            self.out.push_str("/>");
        } else {
            self.out.push('>');
        }
    }

    fn attribute(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape_attr(value));
        self.out.push('"');
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push(' ');
        }
    }
}

/// Escape text content.
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(html: &str, rewrites: &[ImageRewrite]) -> String {
        render_body(&Html::parse_document(html), rewrites)
    }

    #[test]
    fn test_indents_one_space_per_level() {
        let out = render("<p>Hello <b>world</b></p>", &[]);
        assert_eq!(out, "<p>\n Hello\n <b>\n  world\n </b>\n</p>\n");
    }

    #[test]
    fn test_body_tag_itself_not_emitted() {
        let out = render(
            "<html><head><title>x</title></head><body><p>a</p></body></html>",
            &[],
        );
        assert!(!out.contains("<body"));
        assert!(!out.contains("<title"));
        assert!(out.contains("<p>"));
    }

    #[test]
    fn test_strips_script_and_style() {
        let out = render(
            "<style>p{color:red}</style><p>keep</p><script>alert(1)</script>",
            &[],
        );
        assert!(!out.contains("script"));
        assert!(!out.contains("style"));
        assert!(!out.contains("alert"));
        assert!(out.contains("keep"));
    }

    #[test]
    fn test_strips_noscript_fallback_markup() {
        let out = render(
            r#"<img src="lazy.png"><noscript><img src="full.png"></noscript><p>after</p>"#,
            &[ImageRewrite::Keep],
        );
        assert!(!out.contains("noscript"));
        assert!(!out.contains("&lt;img"));
        assert!(!out.contains("full.png"));
        assert!(out.contains(r#"<img src="lazy.png"/>"#));
        assert!(out.contains("after"));
    }

    #[test]
    fn test_image_rewrites_by_ordinal() {
        let out = render(
            r#"<img src="a.png"><p><img src="b.png" alt="b"></p><img src="c.png">"#,
            &[
                ImageRewrite::Inline("data:image/png;base64,AA==".to_string()),
                ImageRewrite::Drop,
                ImageRewrite::Keep,
            ],
        );
        assert!(out.contains(r#"<img src="data:image/png;base64,AA=="/>"#));
        assert!(!out.contains("b.png"));
        assert!(out.contains(r#"<img src="c.png"/>"#));
    }

    #[test]
    fn test_preformatted_kept_verbatim() {
        let out = render("<pre>  fn main() {\n    1 < 2;\n}</pre>", &[]);
        assert_eq!(out, "<pre>  fn main() {\n    1 &lt; 2;\n}</pre>\n");
    }

    #[test]
    fn test_escapes_attributes_and_comments_kept() {
        let out = render(r#"<a title="say &quot;hi&quot;">x</a><!-- note -->"#, &[]);
        assert!(out.contains(r#"<a title="say &quot;hi&quot;">"#));
        assert!(out.contains("<!-- note -->"));
    }
}
