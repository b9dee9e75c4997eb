//! Styled Markdown for the prose side of a stream.
//!
//! The stream renderer hands over one prose line at a time, so every line is
//! parsed as its own document and flattened to an ANSI-styled string. Block
//! constructs that need more than one source line (tables, nested lists) can
//! never form here; fenced code never reaches this module at all.

use markdown::{mdast, to_mdast, ParseOptions};

use crate::style::{blue, bold, cyan, dim, green, italic, strikethrough, underline, yellow};

pub type MarkdownStyleFn = Box<dyn Fn(&str) -> String>;

pub struct MarkdownTheme {
    pub heading: MarkdownStyleFn,
    pub link: MarkdownStyleFn,
    pub link_url: MarkdownStyleFn,
    pub code: MarkdownStyleFn,
    pub code_block: MarkdownStyleFn,
    pub quote: MarkdownStyleFn,
    pub quote_border: MarkdownStyleFn,
    pub hr: MarkdownStyleFn,
    pub list_bullet: MarkdownStyleFn,
    pub bold: MarkdownStyleFn,
    pub italic: MarkdownStyleFn,
    pub strikethrough: MarkdownStyleFn,
    pub underline: MarkdownStyleFn,
}

impl Default for MarkdownTheme {
    fn default() -> Self {
        Self {
            heading: Box::new(cyan),
            link: Box::new(blue),
            link_url: Box::new(dim),
            code: Box::new(yellow),
            code_block: Box::new(green),
            quote: Box::new(italic),
            quote_border: Box::new(dim),
            hr: Box::new(dim),
            list_bullet: Box::new(cyan),
            bold: Box::new(bold),
            italic: Box::new(italic),
            strikethrough: Box::new(strikethrough),
            underline: Box::new(underline),
        }
    }
}

#[derive(Clone, Copy)]
enum InlineStyleKind {
    Default,
    Quote,
}

struct InlineStyleContext {
    kind: InlineStyleKind,
    style_prefix: String,
}

/// Renders one prose line to styled terminal text.
pub struct MarkdownLine {
    theme: MarkdownTheme,
}

impl Default for MarkdownLine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownLine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: MarkdownTheme::default(),
        }
    }

    #[must_use]
    pub fn with_theme(theme: MarkdownTheme) -> Self {
        Self { theme }
    }

    /// Parses `line` as GFM and returns it styled. `width` only matters for
    /// thematic breaks, which span it (capped at 80 columns). Blank input
    /// renders as an empty string so callers keep paragraph spacing.
    pub fn render(&self, line: &str, width: usize) -> String {
        if line.trim().is_empty() {
            return String::new();
        }

        let normalized = line.replace('\t', "   ");
        let root = match to_mdast(&normalized, &ParseOptions::gfm()) {
            Ok(node) => node,
            Err(_) => mdast::Node::Text(mdast::Text {
                value: normalized.clone(),
                position: None,
            }),
        };

        let nodes = match root {
            mdast::Node::Root(root) => root.children,
            other => vec![other],
        };

        let mut rendered = Vec::new();
        for node in &nodes {
            rendered.extend(self.render_node(node, width));
        }
        rendered.join("\n")
    }

    fn render_node(&self, node: &mdast::Node, width: usize) -> Vec<String> {
        match node {
            mdast::Node::Heading(heading) => {
                let context = self.default_inline_context();
                let heading_text = self.render_inline_nodes(&heading.children, &context);
                let styled = match heading.depth {
                    1 => (self.theme.heading)(&(self.theme.bold)(&(self.theme.underline)(
                        &heading_text,
                    ))),
                    2 => (self.theme.heading)(&(self.theme.bold)(&heading_text)),
                    _ => {
                        let prefix = "#".repeat(heading.depth as usize);
                        (self.theme.heading)(&(self.theme.bold)(&format!(
                            "{prefix} {heading_text}"
                        )))
                    }
                };
                vec![styled]
            }
            mdast::Node::Paragraph(paragraph) => {
                let context = self.default_inline_context();
                let paragraph_text = self.render_inline_nodes(&paragraph.children, &context);
                paragraph_text.split('\n').map(str::to_string).collect()
            }
            mdast::Node::Code(code) => code
                .value
                .split('\n')
                .map(|line| format!("  {}", (self.theme.code_block)(line)))
                .collect(),
            mdast::Node::List(list) => self.render_list(list),
            mdast::Node::Blockquote(blockquote) => self.render_blockquote(blockquote),
            mdast::Node::ThematicBreak(_) => {
                vec![(self.theme.hr)(&"─".repeat(width.min(80)))]
            }
            mdast::Node::Html(html) => vec![html.value.trim().to_string()],
            mdast::Node::Text(text) => vec![text.value.clone()],
            mdast::Node::Break(_) => vec![String::new()],
            _ => Vec::new(),
        }
    }

    fn render_inline_nodes(&self, nodes: &[mdast::Node], context: &InlineStyleContext) -> String {
        let style_prefix = context.style_prefix.as_str();
        let kind = context.kind;

        let mut result = String::new();

        for node in nodes {
            match node {
                mdast::Node::Text(text) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&text.value, kind));
                }
                mdast::Node::Paragraph(paragraph) => {
                    let text = self.render_inline_nodes(&paragraph.children, context);
                    result.push_str(&text);
                }
                mdast::Node::Strong(strong) => {
                    let content = self.render_inline_nodes(&strong.children, context);
                    result.push_str(&(self.theme.bold)(&content));
                    result.push_str(style_prefix);
                }
                mdast::Node::Emphasis(emphasis) => {
                    let content = self.render_inline_nodes(&emphasis.children, context);
                    result.push_str(&(self.theme.italic)(&content));
                    result.push_str(style_prefix);
                }
                mdast::Node::Delete(delete) => {
                    let content = self.render_inline_nodes(&delete.children, context);
                    result.push_str(&(self.theme.strikethrough)(&content));
                    result.push_str(style_prefix);
                }
                mdast::Node::InlineCode(code) => {
                    result.push_str(&(self.theme.code)(&code.value));
                    result.push_str(style_prefix);
                }
                mdast::Node::Link(link) => {
                    let link_text = self.render_inline_nodes(&link.children, context);
                    let link_text_plain = plain_text_from_nodes(&link.children);
                    let href = link.url.as_str();
                    let href_cmp = href.strip_prefix("mailto:").unwrap_or(href);
                    let styled = (self.theme.link)(&(self.theme.underline)(&link_text));
                    result.push_str(&styled);
                    if link_text_plain != href && link_text_plain != href_cmp {
                        result.push_str(&(self.theme.link_url)(&format!(" ({href})")));
                    }
                    result.push_str(style_prefix);
                }
                mdast::Node::Break(_) => {
                    result.push('\n');
                }
                mdast::Node::Html(html) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&html.value, kind));
                }
                mdast::Node::Image(image) => {
                    let alt = if image.alt.is_empty() {
                        image.url.as_str()
                    } else {
                        image.alt.as_str()
                    };
                    result.push_str(&self.apply_inline_style_with_newlines(alt, kind));
                }
                mdast::Node::InlineMath(math) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&math.value, kind));
                }
                mdast::Node::Math(math) => {
                    result.push_str(&self.apply_inline_style_with_newlines(&math.value, kind));
                }
                _ => {}
            }
        }

        result
    }

    fn render_list(&self, list: &mdast::List) -> Vec<String> {
        let mut lines = Vec::new();
        let start_number = list.start.unwrap_or(1);

        for (i, node) in list.children.iter().enumerate() {
            let mdast::Node::ListItem(item) = node else {
                continue;
            };
            let bullet = if list.ordered {
                format!("{}. ", start_number + i as u32)
            } else {
                "- ".to_string()
            };

            let item_lines = self.render_list_item(item);
            if item_lines.is_empty() {
                lines.push((self.theme.list_bullet)(&bullet));
                continue;
            }

            lines.push(format!(
                "{}{}",
                (self.theme.list_bullet)(&bullet),
                item_lines[0]
            ));
            for line in item_lines.iter().skip(1) {
                lines.push(format!("  {line}"));
            }
        }

        lines
    }

    fn render_list_item(&self, item: &mdast::ListItem) -> Vec<String> {
        let context = self.default_inline_context();
        let mut lines = Vec::new();

        for node in item.children.iter() {
            let text = self.render_inline_nodes(std::slice::from_ref(node), &context);
            if !text.is_empty() {
                lines.extend(text.split('\n').map(str::to_string));
            }
        }

        lines
    }

    fn render_blockquote(&self, blockquote: &mdast::Blockquote) -> Vec<String> {
        let style_prefix =
            self.style_prefix(|text| (self.theme.quote)(&(self.theme.italic)(text)));
        let context = InlineStyleContext {
            kind: InlineStyleKind::Quote,
            style_prefix,
        };

        let quote_text = self.render_inline_nodes(&blockquote.children, &context);

        quote_text
            .split('\n')
            .map(|line| format!("{}{}", (self.theme.quote_border)("│ "), line))
            .collect()
    }

    fn default_inline_context(&self) -> InlineStyleContext {
        InlineStyleContext {
            kind: InlineStyleKind::Default,
            style_prefix: String::new(),
        }
    }

    fn apply_inline_style(&self, text: &str, kind: InlineStyleKind) -> String {
        match kind {
            InlineStyleKind::Default => text.to_string(),
            InlineStyleKind::Quote => (self.theme.quote)(&(self.theme.italic)(text)),
        }
    }

    fn apply_inline_style_with_newlines(&self, text: &str, kind: InlineStyleKind) -> String {
        text.split('\n')
            .map(|segment| self.apply_inline_style(segment, kind))
            .collect::<Vec<String>>()
            .join("\n")
    }

    // Re-opens an outer style after an inner reset, e.g. italics around an
    // inline code span inside a quote.
    fn style_prefix<F>(&self, style_fn: F) -> String
    where
        F: Fn(&str) -> String,
    {
        let sentinel = "\u{0000}";
        let styled = style_fn(sentinel);
        styled
            .find(sentinel)
            .map(|idx| styled[..idx].to_string())
            .unwrap_or_default()
    }
}

fn plain_text_from_nodes(nodes: &[mdast::Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            mdast::Node::Text(text) => out.push_str(&text.value),
            mdast::Node::InlineCode(code) => out.push_str(&code.value),
            mdast::Node::Strong(strong) => out.push_str(&plain_text_from_nodes(&strong.children)),
            mdast::Node::Emphasis(emphasis) => {
                out.push_str(&plain_text_from_nodes(&emphasis.children))
            }
            mdast::Node::Delete(delete) => out.push_str(&plain_text_from_nodes(&delete.children)),
            mdast::Node::Link(link) => out.push_str(&plain_text_from_nodes(&link.children)),
            mdast::Node::Html(html) => out.push_str(&html.value),
            mdast::Node::Image(image) => out.push_str(&image.alt),
            _ => {}
        }
    }
    out
}
