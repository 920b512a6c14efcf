//! A thin XML driver: reads a document with `quick-xml` and feeds the events to a [`Session`].
//!
//! Namespace prefixes are resolved by the reader, so sessions see namespace URIs and local names.
//! Empty elements are expanded into a start/end pair and text is passed through untrimmed.

use crate::{Attribute, Attributes, BindError, Session};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::io::BufRead;

/// Drive `session` through one complete document read from `source`.
pub(crate) fn drive<R: BufRead>(session: &mut Session<'_>, source: R) -> Result<(), BindError> {
    let mut reader = NsReader::from_reader(source);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;

    let mut buf = Vec::new();
    session.start_document()?;

    loop {
        let position = reader.buffer_position();
        let xml_err = |message: String| BindError::Xml {
            position: position as u64,
            message,
        };

        let (resolved, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| xml_err(e.to_string()))?;

        match event {
            Event::Start(start) => {
                let namespace = namespace_uri(&resolved).map_err(xml_err)?;
                let local_name = utf8(start.local_name().as_ref()).map_err(xml_err)?;
                let attributes = attributes(&reader, &start).map_err(xml_err)?;
                session.start_element(&namespace, &local_name, &attributes)?;
            }
            Event::End(end) => {
                let namespace = namespace_uri(&resolved).map_err(xml_err)?;
                let local_name = utf8(end.local_name().as_ref()).map_err(xml_err)?;
                session.end_element(&namespace, &local_name)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| xml_err(e.to_string()))?;
                session.characters(&text)?;
            }
            Event::CData(data) => {
                let text = utf8(&data.into_inner()).map_err(xml_err)?;
                session.characters(&text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no bindings.
            _ => {}
        }
        buf.clear();
    }

    session.end_document()
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> Result<String, String> {
    match resolved {
        ResolveResult::Bound(ns) => utf8(ns.as_ref()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(format!(
            "undeclared namespace prefix \"{}\"",
            String::from_utf8_lossy(prefix)
        )),
    }
}

fn attributes<R>(reader: &NsReader<R>, start: &BytesStart<'_>) -> Result<Attributes, String> {
    let mut out = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let qname = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let local_name = utf8(local.as_ref())?;
        let attribute = match resolved {
            ResolveResult::Bound(ns) => {
                Attribute::namespaced(qname, utf8(ns.as_ref())?, local_name, value)
            }
            _ => Attribute::new(qname, value),
        };
        out.push(attribute);
    }
    Ok(out)
}

fn utf8(bytes: &[u8]) -> Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| e.to_string())
}
