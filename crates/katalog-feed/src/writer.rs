//! Serialization of a [`Catalog`] into the output XML document.

use std::io::Write;

use katalog_core::{Catalog, CatalogSchema, FieldValue, Product, TextField, Variant};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FeedError;

/// Writes `catalog` as `<?xml?><Root><Urunler><Urun>..</Urun></Urunler></Root>`
/// (tag names taken from `schema`), indented by two spaces.
///
/// # Errors
///
/// Returns [`FeedError::Io`] or [`FeedError::Xml`] if the sink fails.
pub fn write_catalog<W: Write>(
    sink: W,
    catalog: &Catalog,
    schema: &CatalogSchema,
) -> Result<(), FeedError> {
    let mut writer = Writer::new_with_indent(sink, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(schema.root_tag.as_str())))?;
    writer.write_event(Event::Start(BytesStart::new(
        schema.product_list_tag.as_str(),
    )))?;

    for product in &catalog.products {
        write_product(&mut writer, product, schema)?;
    }

    writer.write_event(Event::End(BytesEnd::new(schema.product_list_tag.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(schema.root_tag.as_str())))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_product<W: Write>(
    writer: &mut Writer<W>,
    product: &Product,
    schema: &CatalogSchema,
) -> Result<(), FeedError> {
    let tag = schema.product_tag.as_str();
    writer.write_event(Event::Start(BytesStart::new(tag)))?;

    for field in &product.fields {
        match &field.value {
            FieldValue::Text(text) => write_leaf(writer, &field.name, text)?,
            FieldValue::Group(children) => write_group(writer, &field.name, children)?,
            FieldValue::Variants(variants) => {
                write_variants(writer, &field.name, variants, schema)?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_variants<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    variants: &[Variant],
    schema: &CatalogSchema,
) -> Result<(), FeedError> {
    if variants.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    for variant in variants {
        write_group(writer, &schema.variant_tag, &variant.fields)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_group<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    children: &[TextField],
) -> Result<(), FeedError> {
    if children.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    for child in children {
        write_leaf(writer, &child.name, &child.value)?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_leaf<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), FeedError> {
    // An indenting writer would put whitespace between an empty start/end pair.
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
