//! Document outline: heading extraction and heading tree.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::fence::FenceTracker;

/// ATX heading: 1 to 6 `#`, whitespace, title, optional closing `#` run.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+\s*)?$").unwrap());

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Heading found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1 to 6
    pub depth: u8,
    /// Title text without markers
    pub title: String,
    /// Zero-based source line
    pub line: usize,
}

impl Heading {
    pub fn new(depth: u8, title: impl Into<String>, line: usize) -> Self {
        Self {
            depth,
            title: title.into(),
            line,
        }
    }
}

/// Tree node with children nested by heading depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub item: T,
    pub children: Vec<Node<T>>,
}

impl<T> Node<T> {
    fn leaf(item: T) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }
}

/// Outline tree node.
pub type OutlineNode = Node<Heading>;

/// Extracts ATX headings, skipping lines inside fenced code blocks.
///
/// Trailing `#` runs are stripped as cosmetic cleanup. A line needs at
/// least one whitespace character after its `#` run to be a heading.
///
/// # Examples
///
/// ```
/// use markforge::outline::parse_headings;
///
/// let headings = parse_headings("# Intro\ntext\n## Usage ##\n");
/// assert_eq!(headings.len(), 2);
/// assert_eq!(headings[1].title, "Usage");
/// assert_eq!(headings[1].line, 2);
/// ```
pub fn parse_headings(text: &str) -> Vec<Heading> {
    let mut tracker = FenceTracker::new();
    let mut headings = Vec::new();

    for (line_number, line) in text.lines().enumerate() {
        if tracker.is_code(line) {
            continue;
        }

        if let Some(caps) = HEADING.captures(line.trim()) {
            headings.push(Heading::new(
                caps[1].len() as u8,
                caps[2].trim(),
                line_number,
            ));
        }
    }

    headings
}

/// Builds a heading tree.
///
/// Keeps a stack of open nodes; entries whose depth is greater than or
/// equal to the new heading's depth are closed first, then the heading is
/// attached under the remaining top, or as a root when the stack is empty.
pub fn build_tree(headings: &[Heading]) -> Vec<OutlineNode> {
    nest_by_depth(headings.iter().cloned(), |heading| heading.depth)
}

/// Nests items by a depth key using the open-node stack.
pub fn nest_by_depth<T>(
    items: impl IntoIterator<Item = T>,
    depth: impl Fn(&T) -> u8,
) -> Vec<Node<T>> {
    let mut roots = Vec::new();
    let mut stack: Vec<(u8, Node<T>)> = Vec::new();

    for item in items {
        let level = depth(&item);
        while stack.last().is_some_and(|(top, _)| *top >= level) {
            if let Some((_, node)) = stack.pop() {
                attach(&mut stack, &mut roots, node);
            }
        }
        stack.push((level, Node::leaf(item)));
    }

    while let Some((_, node)) = stack.pop() {
        attach(&mut stack, &mut roots, node);
    }

    roots
}

/// Turns heading text into an anchor id.
///
/// Lowercases, drops characters other than word characters, whitespace
/// and hyphens, then joins words with single hyphens.
///
/// # Examples
///
/// ```
/// use markforge::outline::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Rust -- 2024 "), "rust-2024");
/// ```
pub fn slugify(title: &str) -> String {
    let cleaned = NON_SLUG.replace_all(title, "");
    let lowered = cleaned.trim().to_lowercase();
    SEPARATORS.replace_all(&lowered, "-").into_owned()
}

fn attach<T>(stack: &mut [(u8, Node<T>)], roots: &mut Vec<Node<T>>, node: Node<T>) {
    match stack.last_mut() {
        Some((_, parent)) => parent.children.push(node),
        None => roots.push(node),
    }
}
