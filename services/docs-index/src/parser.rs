//! Turns a documentation file into one or more [`DocSection`]s.
//!
//! HTML is parsed with `scraper`/`html5ever`; Markdown is rendered to HTML
//! first via `pulldown-cmark`; plain text is wrapped into a synthetic
//! `<main>` so it goes through the same section-segmentation code path.

use crate::assets::resolve_assets;
use crate::ids::{section_ref, stable_anchor};
use crate::model::{Asset, DocSection};
use docsearch_core::{DocsearchError, Result};
use docsearch_search::normalize_whitespace;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;

const HEADING_TAGS: [&str; 2] = ["h2", "h3"];
const BANNED_TAGS: [&str; 6] = ["script", "style", "noscript", "nav", "header", "footer"];
// "aside" handled separately below since arrays can't easily grow inline;
const BANNED_TAGS_EXTRA: &str = "aside";

fn is_banned(tag: &str) -> bool {
    BANNED_TAGS.contains(&tag) || tag == BANNED_TAGS_EXTRA
}

fn is_heading(tag: &str) -> bool {
    HEADING_TAGS.contains(&tag)
}

/// Reads and parses one documentation file into its sections. `rel_path`
/// is the POSIX path of `path` relative to the docset root.
pub fn parse_doc_file(docset_id: &str, rel_path: &str, path: &Path) -> Result<Vec<DocSection>> {
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let html_text = match suffix.as_str() {
        "html" | "htm" => std::fs::read_to_string(path)?,
        "md" | "markdown" => {
            let markdown_text = std::fs::read_to_string(path)?;
            render_markdown(&markdown_text)
        }
        "txt" => {
            let text = std::fs::read_to_string(path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled");
            plain_text_to_html(&text, stem)
        }
        other => {
            return Err(DocsearchError::bad_input(format!(
                "unsupported doc type: .{other}"
            )))
        }
    };

    Ok(parse_html_to_sections(docset_id, rel_path, &html_text))
}

fn render_markdown(markdown_text: &str) -> String {
    use pulldown_cmark::{html, Options, Parser};
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    let parser = Parser::new_ext(markdown_text, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn plain_text_to_html(text: &str, title: &str) -> String {
    let escaped_title = html_escape(title);
    let stripped = text.trim();
    if stripped.is_empty() {
        return format!("<main><h2>{escaped_title}</h2></main>");
    }

    let mut body = String::new();
    for para in split_blank_lines(stripped) {
        let cleaned = para.trim_matches('\n');
        if cleaned.is_empty() {
            continue;
        }
        let escaped = html_escape(cleaned).replace('\n', "<br />\n");
        body.push_str("<p>");
        body.push_str(&escaped);
        body.push_str("</p>");
    }
    format!("<main><h2>{escaped_title}</h2>{body}</main>")
}

fn split_blank_lines(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if text[i..].starts_with("\n\n") {
            parts.push(&text[start..i]);
            while text.as_bytes().get(i) == Some(&b'\n') {
                i += 1;
            }
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&text[start..]);
    parts
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Segments `html` into [`DocSection`]s per §4.3: content root discovery,
/// banned-tag removal, `h2`/`h3` segmentation, and fragment extraction.
pub fn parse_html_to_sections(docset_id: &str, file_path: &str, html: &str) -> Vec<DocSection> {
    let document = Html::parse_document(html);
    let container = find_container(&document);

    let heading_selector = Selector::parse("h2, h3").unwrap();
    let headings: Vec<ElementRef> = container
        .select(&heading_selector)
        .filter(|h| !has_banned_ancestor(h.parent(), &container))
        .collect();

    if headings.is_empty() {
        let title = document_title(&document)
            .or_else(|| file_stem(file_path))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled".to_string());
        let anchor = "#".to_string();
        let heading_path = vec![title];
        let sref = section_ref(docset_id, file_path, &anchor, &heading_path);
        let (text, code_blocks, assets) = extract_fragment(container.id(), &document);
        let assets = resolve_assets(assets, file_path);
        return vec![DocSection {
            section_ref: sref,
            docset_id: docset_id.to_string(),
            file_path: file_path.to_string(),
            anchor,
            heading_path,
            text,
            code_blocks,
            assets,
        }];
    }

    let mut sections = Vec::new();
    let mut current_h2: Option<String> = None;

    for (i, heading) in headings.iter().enumerate() {
        let heading_text = normalize_inline_text(&heading.text().collect::<Vec<_>>().join(" "));
        if heading_text.is_empty() {
            continue;
        }

        let tag = heading.value().name();
        let heading_path = if tag == "h2" {
            current_h2 = Some(heading_text.clone());
            vec![heading_text.clone()]
        } else if let Some(h2) = &current_h2 {
            vec![h2.clone(), heading_text.clone()]
        } else {
            vec![heading_text.clone()]
        };

        let anchor = heading
            .value()
            .attr("id")
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| stable_anchor(file_path, &heading_path));

        let end = headings.get(i + 1).map(|h| h.id());
        let sibling_nodes = collect_sibling_nodes_until(**heading, end);
        let (text, code_blocks, assets) = extract_fragment_from_nodes(&sibling_nodes);
        let assets = resolve_assets(assets, file_path);

        let sref = section_ref(docset_id, file_path, &anchor, &heading_path);
        sections.push(DocSection {
            section_ref: sref,
            docset_id: docset_id.to_string(),
            file_path: file_path.to_string(),
            anchor,
            heading_path,
            text,
            code_blocks,
            assets,
        });
    }

    sections
}

fn find_container<'a>(document: &'a Html) -> ElementRef<'a> {
    let main_sel = Selector::parse("main").unwrap();
    let article_sel = Selector::parse("article").unwrap();
    let role_main_sel = Selector::parse("[role=\"main\"]").unwrap();
    let body_sel = Selector::parse("body").unwrap();

    document
        .select(&main_sel)
        .next()
        .or_else(|| document.select(&article_sel).next())
        .or_else(|| document.select(&role_main_sel).next())
        .or_else(|| document.select(&body_sel).next())
        .unwrap_or_else(|| document.root_element())
}

fn document_title(document: &Html) -> Option<String> {
    let title_sel = Selector::parse("title").unwrap();
    document.select(&title_sel).next().map(|t| {
        normalize_inline_text(&t.text().collect::<Vec<_>>().join(" "))
    })
}

fn file_stem(file_path: &str) -> Option<String> {
    Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

fn normalize_inline_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_banned_ancestor(mut node: Option<NodeRef<Node>>, stop_at: &ElementRef) -> bool {
    while let Some(n) = node {
        if n.id() == stop_at.id() {
            return false;
        }
        if let Some(el) = n.value().as_element() {
            if is_banned(el.name()) {
                return true;
            }
        }
        node = n.parent();
    }
    false
}

/// Immediate siblings following `heading` (same parent), stopping before
/// `end` or before any further `h2`/`h3` sibling.
fn collect_sibling_nodes_until<'a>(
    heading: NodeRef<'a, Node>,
    end: Option<ego_tree::NodeId>,
) -> Vec<NodeRef<'a, Node>> {
    let mut nodes = Vec::new();
    let mut cursor = heading.next_sibling();
    while let Some(node) = cursor {
        if Some(node.id()) == end {
            break;
        }
        if let Some(el) = node.value().as_element() {
            if is_heading(el.name()) {
                break;
            }
        }
        nodes.push(node);
        cursor = node.next_sibling();
    }
    nodes
}

fn extract_fragment(container_id: ego_tree::NodeId, document: &Html) -> (String, Vec<String>, Vec<Asset>) {
    let container = ElementRef::wrap(document.tree.get(container_id).unwrap()).unwrap();
    let nodes: Vec<NodeRef<Node>> = container.children().collect();
    extract_fragment_from_nodes(&nodes)
}

fn extract_fragment_from_nodes(nodes: &[NodeRef<Node>]) -> (String, Vec<String>, Vec<Asset>) {
    let mut code_blocks = Vec::new();
    let mut assets = Vec::new();
    let mut text_parts = Vec::new();
    for &node in nodes {
        walk(node, &mut code_blocks, &mut assets, &mut text_parts);
    }
    let text = normalize_whitespace(&text_parts.join("\n"));
    (text, code_blocks, assets)
}

fn walk(
    node: NodeRef<Node>,
    code_blocks: &mut Vec<String>,
    assets: &mut Vec<Asset>,
    text_parts: &mut Vec<String>,
) {
    match node.value() {
        Node::Text(text) => {
            let s = text.trim();
            if !s.is_empty() {
                text_parts.push(s.to_string());
            }
        }
        Node::Element(el) => {
            let tag = el.name();
            if is_banned(tag) {
                return;
            }
            match tag {
                "pre" => {
                    if let Some(pre_ref) = ElementRef::wrap(node) {
                        let code_sel = Selector::parse("code").unwrap();
                        let raw = match pre_ref.select(&code_sel).next() {
                            Some(code) => code.text().collect::<Vec<_>>().join(""),
                            None => pre_ref.text().collect::<Vec<_>>().join(""),
                        };
                        let trimmed = raw.trim_matches('\n');
                        if !trimmed.trim().is_empty() {
                            code_blocks.push(trimmed.to_string());
                        }
                    }
                }
                "img" => {
                    if let Some(src) = el.attr("src") {
                        let alt = el.attr("alt").filter(|s| !s.is_empty()).map(str::to_string);
                        let caption = node.parent().and_then(|parent| {
                            let parent_el = ElementRef::wrap(parent)?;
                            if parent_el.value().name() != "figure" {
                                return None;
                            }
                            let figcaption_sel = Selector::parse("figcaption").unwrap();
                            let text = parent_el
                                .select(&figcaption_sel)
                                .next()?
                                .text()
                                .collect::<Vec<_>>()
                                .join(" ");
                            let trimmed = text.trim().to_string();
                            if trimmed.is_empty() {
                                None
                            } else {
                                Some(trimmed)
                            }
                        });
                        assets.push(Asset {
                            src: src.to_string(),
                            alt,
                            caption,
                            path: None,
                        });
                    }
                }
                _ => {
                    for child in node.children() {
                        walk(child, code_blocks, assets, text_parts);
                    }
                }
            }
        }
        _ => {}
    }
}
