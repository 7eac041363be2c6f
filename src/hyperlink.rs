//! Turns URLs in rendered text into links.

use std::sync::OnceLock;

use regex::Regex;

use crate::markup::{Element, InlineTag, Node, Paragraph};

static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| Regex::new(r"https?://[^ ]+").expect("url pattern is valid"))
}

/// Rewrites the first URL of every text node in `paragraph` into
/// text, an `<a>` showing the URL's host, and the remaining text.
/// Text already inside a link is left alone.
pub fn link_urls(paragraph: &mut Paragraph) {
    paragraph.nodes = link_nodes(std::mem::take(&mut paragraph.nodes));
}

fn link_nodes(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => split_first_url(text, &mut out),
            Node::Element(mut element) if element.tag != InlineTag::A => {
                element.children = link_nodes(std::mem::take(&mut element.children));
                out.push(Node::Element(element));
            }
            link => out.push(link),
        }
    }
    out
}

fn split_first_url(text: String, out: &mut Vec<Node>) {
    let found = url_pattern().find(&text).and_then(|found| {
        url_host(found.as_str()).map(|host| (found.start(), found.end(), host))
    });
    let Some((start, end, host)) = found else {
        out.push(Node::Text(text));
        return;
    };
    let (front, back) = (&text[..start], &text[end..]);
    if !front.is_empty() {
        out.push(Node::text(front));
    }
    out.push(Node::Element(
        Element::new(InlineTag::A)
            .with_attr("href", &text[start..end])
            .with_child(Node::text(host)),
    ));
    if !back.is_empty() {
        out.push(Node::text(back));
    }
}

/// Host part of an `http(s)://` URL, lower-cased, without user info or port.
pub fn url_host(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = if host_port.starts_with('[') {
        host_port.split_inclusive(']').next().unwrap_or_default()
    } else {
        host_port.split(':').next().unwrap_or_default()
    };
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}
