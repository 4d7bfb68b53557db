//! Streaming product reader over a vendor feed or a persisted catalog.
//!
//! Products are located by tag name anywhere in the document and yielded one
//! at a time; only the current product's subtree is held in memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use katalog_core::{CatalogSchema, Field, FieldValue, Product, TextField, Variant};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FeedError;

/// Lazily yields the products of an XML document.
///
/// The iterator fuses after the first error. Reaching the end of the
/// document with unclosed elements, or without any root element, is reported
/// as [`FeedError::Malformed`].
pub struct ProductReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    schema: CatalogSchema,
    depth: usize,
    roots: usize,
    finished: bool,
}

impl ProductReader<BufReader<File>> {
    /// Opens `path` for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Io`] if the file cannot be opened.
    pub fn from_path(path: &Path, schema: &CatalogSchema) -> Result<Self, FeedError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), schema))
    }
}

impl<'a> ProductReader<&'a [u8]> {
    #[must_use]
    pub fn from_bytes(bytes: &'a [u8], schema: &CatalogSchema) -> Self {
        Self::new(bytes, schema)
    }
}

impl<R: BufRead> ProductReader<R> {
    pub fn new(source: R, schema: &CatalogSchema) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            schema: schema.clone(),
            depth: 0,
            roots: 0,
            finished: false,
        }
    }

    fn next_product(&mut self) -> Result<Option<Product>, FeedError> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?.into_owned();
            match event {
                Event::Start(e) => {
                    let name = tag_name(&e)?;
                    self.enter_top_level()?;
                    self.depth += 1;
                    if name == self.schema.product_tag {
                        let node = self.read_subtree(name)?;
                        return Ok(Some(self.to_product(node)));
                    }
                }
                Event::Empty(e) => {
                    let name = tag_name(&e)?;
                    self.enter_top_level()?;
                    if name == self.schema.product_tag {
                        return Ok(Some(Product::default()));
                    }
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(FeedError::malformed(format!(
                            "document ended with {} unclosed element(s)",
                            self.depth
                        )));
                    }
                    if self.roots == 0 {
                        return Err(FeedError::malformed("document has no root element"));
                    }
                    return Ok(None);
                }
                Event::Text(e) => {
                    if self.depth == 0 && !e.unescape()?.trim().is_empty() {
                        return Err(FeedError::malformed("text outside the root element"));
                    }
                }
                Event::CData(e) => {
                    if self.depth == 0 && !String::from_utf8_lossy(&e).trim().is_empty() {
                        return Err(FeedError::malformed("CDATA outside the root element"));
                    }
                }
                _ => {}
            }
        }
    }

    /// Counts an element starting at depth 0; a document has exactly one.
    fn enter_top_level(&mut self) -> Result<(), FeedError> {
        if self.depth > 0 {
            return Ok(());
        }
        if self.roots >= 1 {
            return Err(FeedError::malformed("multiple root elements"));
        }
        self.roots += 1;
        Ok(())
    }

    /// Reads everything up to the end tag matching an already consumed start tag.
    fn read_subtree(&mut self, name: String) -> Result<Node, FeedError> {
        let mut stack = vec![Node::new(name)];
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    stack.push(Node::new(tag_name(&e)?));
                    self.depth += 1;
                }
                Event::Empty(e) => {
                    let child = Node::new(tag_name(&e)?);
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(child);
                    }
                }
                Event::Text(e) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    let Some(done) = stack.pop() else {
                        return Err(FeedError::malformed("unbalanced end tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => return Ok(done),
                    }
                }
                Event::Eof => {
                    return Err(FeedError::malformed(format!(
                        "document ended inside <{}>",
                        stack.last().map_or("?", |n| n.name.as_str())
                    )));
                }
                _ => {}
            }
        }
    }

    fn to_product(&self, node: Node) -> Product {
        let fields = node
            .children
            .into_iter()
            .map(|child| {
                let value = if child.name == self.schema.variant_list_tag {
                    FieldValue::Variants(self.to_variants(child.children))
                } else if child.children.is_empty() {
                    FieldValue::Text(child.text)
                } else {
                    FieldValue::Group(child.children.into_iter().map(Node::into_leaf).collect())
                };
                Field {
                    name: child.name,
                    value,
                }
            })
            .collect();
        Product { fields }
    }

    fn to_variants(&self, nodes: Vec<Node>) -> Vec<Variant> {
        nodes
            .into_iter()
            .filter_map(|node| {
                if node.name == self.schema.variant_tag {
                    Some(Variant {
                        fields: node.children.into_iter().map(Node::into_leaf).collect(),
                    })
                } else {
                    tracing::debug!(tag = %node.name, "ignoring non-variant element in variant list");
                    None
                }
            })
            .collect()
    }
}

impl<R: BufRead> Iterator for ProductReader<R> {
    type Item = Result<Product, FeedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_product() {
            Ok(Some(product)) => Some(Ok(product)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Streams the whole document and returns the number of products in it.
///
/// Used as a well-formedness gate before any translation work is spent.
///
/// # Errors
///
/// Returns the first [`FeedError`] encountered.
pub fn check_well_formed<R: BufRead>(source: R, schema: &CatalogSchema) -> Result<usize, FeedError> {
    ProductReader::new(source, schema).try_fold(0usize, |count, product| {
        product.map(|_| count + 1)
    })
}

struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Leaf view of an element; text of nested descendants is dropped.
    fn into_leaf(self) -> TextField {
        TextField {
            name: self.name,
            value: self.text,
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, FeedError> {
    std::str::from_utf8(e.name().as_ref())
        .map(str::to_owned)
        .map_err(|err| FeedError::malformed(format!("tag name is not UTF-8: {err}")))
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
