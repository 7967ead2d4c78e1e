//! # SVG Baking
//!
//! A baked badge is an SVG whose root carries one
//! `<openbadges:credential verify="…"/>` child in the OpenBadges namespace.
//! The `verify` attribute holds the credential text exactly as
//! [`SignedCredential::to_embedded_text()`] produced it: the compact token,
//! or the canonical JSON of a Data-Integrity credential.
//!
//! The document is streamed event by event; everything except the root start
//! tag and existing credential elements is written back unchanged. The
//! credential never appears as character data.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::Writer;
use thiserror::Error;

use crate::error::VcError;
use crate::signed::SignedCredential;

/// OpenBadges 3.0 namespace of the credential element.
pub const OPENBADGES_NAMESPACE: &str = "https://purl.imsglobal.org/ob/v3p0";

const PREFIX: &str = "openbadges";
const CREDENTIAL_ELEMENT: &str = "credential";
const VERIFY_ATTRIBUTE: &str = "verify";

/// Failure to bake into or extract from an SVG document.
#[derive(Error, Debug)]
pub enum BakeError {
    /// The document is not well-formed XML.
    #[error("SVG is not well-formed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("SVG write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The root element is missing or is not `<svg>`.
    #[error("not an SVG document: {0}")]
    NotSvg(String),

    /// Output was not valid UTF-8.
    #[error("SVG encoding error: {0}")]
    Encoding(String),

    /// The credential could not be turned into embedded text.
    #[error(transparent)]
    Credential(#[from] VcError),
}

/// Embed `credential` into `svg`, replacing any credential already baked in.
///
/// # Errors
///
/// `BakeError::Xml` for malformed input, `BakeError::NotSvg` when the root
/// element is not `<svg>`.
pub fn bake(svg: &str, credential: &SignedCredential) -> Result<String, BakeError> {
    let text = credential.to_embedded_text()?;
    let mut reader = NsReader::from_str(svg);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_ob_namespace = ns == ResolveResult::Bound(Namespace(OPENBADGES_NAMESPACE.as_bytes()));

        match event {
            Event::Start(root) if !seen_root => {
                seen_root = true;
                depth = 1;
                writer.write_event(Event::Start(declare_namespace(&root)?))?;
                writer.write_event(Event::Empty(credential_element(&text)))?;
            }
            Event::Empty(root) if !seen_root => {
                seen_root = true;
                let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
                writer.write_event(Event::Start(declare_namespace(&root)?))?;
                writer.write_event(Event::Empty(credential_element(&text)))?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::Start(e) if depth == 1 && in_ob_namespace && is_credential(&e) => {
                skip_element(&mut reader, &e)?;
            }
            Event::Empty(e) if depth == 1 && in_ob_namespace && is_credential(&e) => {}
            Event::Start(e) => {
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !seen_root {
        return Err(BakeError::NotSvg("document has no root element".into()));
    }
    String::from_utf8(writer.into_inner()).map_err(|e| BakeError::Encoding(e.to_string()))
}

/// Read the baked credential text back out of `svg`.
///
/// Returns `Ok(None)` when the SVG carries no credential element or the
/// element has no `verify` attribute.
pub fn extract(svg: &str) -> Result<Option<String>, BakeError> {
    let mut reader = NsReader::from_str(svg);
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let (ns, event) = reader.read_resolved_event()?;
        let in_ob_namespace = ns == ResolveResult::Bound(Namespace(OPENBADGES_NAMESPACE.as_bytes()));

        let (element, is_empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if !seen_root {
            check_root(&element)?;
            seen_root = true;
            if is_empty {
                return Ok(None);
            }
            depth = 1;
            continue;
        }

        if depth == 1 && in_ob_namespace && is_credential(&element) {
            let attr = element
                .try_get_attribute(VERIFY_ATTRIBUTE)
                .map_err(quick_xml::Error::from)?;
            return match attr {
                Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
                None => Ok(None),
            };
        }
        if !is_empty {
            depth += 1;
        }
    }

    if !seen_root {
        return Err(BakeError::NotSvg("document has no root element".into()));
    }
    Ok(None)
}

/// Drop the events of an element whose start tag was just read.
///
/// Goes through `read_event` rather than `read_to_end` so the reader pops
/// the namespace scope the element opened.
fn skip_element(reader: &mut NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<(), BakeError> {
    let mut open = 1usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => open += 1,
            Event::End(_) => {
                open -= 1;
                if open == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                return Err(quick_xml::Error::UnexpectedEof(name).into());
            }
            _ => {}
        }
    }
}

fn check_root(root: &BytesStart<'_>) -> Result<(), BakeError> {
    if root.local_name().as_ref() != b"svg" {
        return Err(BakeError::NotSvg(format!(
            "root element is <{}>",
            String::from_utf8_lossy(root.name().as_ref())
        )));
    }
    Ok(())
}

fn is_credential(element: &BytesStart<'_>) -> bool {
    element.local_name().as_ref() == CREDENTIAL_ELEMENT.as_bytes()
}

/// Copy of the root start tag with the OpenBadges prefix bound.
fn declare_namespace<'a>(root: &BytesStart<'a>) -> Result<BytesStart<'a>, BakeError> {
    check_root(root)?;
    let xmlns = format!("xmlns:{PREFIX}");
    let mut out = root.clone();
    out.clear_attributes();
    for attr in root.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() != xmlns.as_bytes() {
            out.push_attribute(attr);
        }
    }
    out.push_attribute((xmlns.as_str(), OPENBADGES_NAMESPACE));
    Ok(out)
}

fn credential_element(text: &str) -> BytesStart<'static> {
    let mut element = BytesStart::new(format!("{PREFIX}:{CREDENTIAL_ELEMENT}"));
    element.push_attribute((VERIFY_ATTRIBUTE, text));
    element
}
