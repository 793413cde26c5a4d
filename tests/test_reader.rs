use doctree::parser::{ParsingErrorType, TextLocation, XmlEventKind, XmlEventReader, XmlStreamReader};

/// Reads all events, rendering each as a short string.
fn events(xml: &str) -> Vec<String> {
    let mut reader = XmlStreamReader::for_str(xml);
    let mut events = Vec::new();
    loop {
        let kind = reader.next_event().unwrap();
        let event = match kind {
            XmlEventKind::StartElement | XmlEventKind::EndElement => match reader.namespace() {
                Some(ns) => format!("{kind} {{{ns}}}{}", reader.local_name()),
                None => format!("{kind} {}", reader.local_name()),
            },
            XmlEventKind::EntityReference => format!("{kind} {}", reader.local_name()),
            XmlEventKind::Characters
            | XmlEventKind::Whitespace
            | XmlEventKind::CData
            | XmlEventKind::Comment => format!("{kind} {:?}", reader.text()),
            _ => kind.to_string(),
        };
        events.push(event);
        if kind == XmlEventKind::EndDocument {
            return events;
        }
    }
}

fn error_kind(xml: &str) -> ParsingErrorType {
    let mut reader = XmlStreamReader::for_str(xml);
    loop {
        match reader.next_event() {
            Ok(XmlEventKind::EndDocument) => panic!("no error in {xml}"),
            Ok(_) => continue,
            Err(err) => return err.kind().clone(),
        }
    }
}

// --- EVENTS ---
#[test]
fn test_basic_event_sequence() {
    let events = events("<?xml version=\"1.0\"?>\n<a>x<!--c--><![CDATA[<d>]]><b/></a>\n");
    assert_eq!(
        events,
        [
            "START_DOCUMENT",
            "START_ELEMENT a",
            "CHARACTERS \"x\"",
            "COMMENT \"c\"",
            "CDATA \"<d>\"",
            "START_ELEMENT b",
            "END_ELEMENT b",
            "END_ELEMENT a",
            "END_DOCUMENT",
        ]
    );
}

#[test]
fn test_whitespace_is_reported_separately() {
    let events = events("<a>\n  <b> x </b>\n</a>");
    assert_eq!(events[2], "SPACE \"\\n  \"");
    assert_eq!(events[4], "CHARACTERS \" x \"");
}

#[test]
fn test_prolog_constructs_are_reported() {
    let events = events("<!DOCTYPE a [<!ENTITY e 'x'>]><?style href='a'?><!--top--><a/>");
    assert_eq!(events[1], "DTD");
    assert_eq!(events[2], "PROCESSING_INSTRUCTION");
    assert_eq!(events[3], "COMMENT \"top\"");
    assert_eq!(events[4], "START_ELEMENT a");
}

#[test]
fn test_references() {
    let events = events("<a>1 &lt; 2 &amp;&#x41;&#66;&nbsp;!</a>");
    assert_eq!(events[2], "CHARACTERS \"1 < 2 &AB\"");
    assert_eq!(events[3], "ENTITY_REFERENCE nbsp");
    assert_eq!(events[4], "CHARACTERS \"!\"");
}

#[test]
fn test_line_endings_are_normalized() {
    let events = events("<a>x\r\ny\rz&#13;</a>");
    assert_eq!(events[2], "CHARACTERS \"x\\ny\\nz\\r\"");
}

#[test]
fn test_attributes() {
    let mut reader = XmlStreamReader::for_str(
        "<a xmlns:p='urn:p' id=\"1\" p:kind='x&amp;y' note='t\tu&#10;v' xml:lang='en'/>",
    );
    reader.next_event().unwrap();
    assert_eq!(reader.next_event().unwrap(), XmlEventKind::StartElement);

    // Namespace declarations are not attributes
    assert_eq!(reader.attribute_count(), 4);
    assert_eq!(reader.attribute_local_name(0), "id");
    assert_eq!(reader.attribute_namespace(0), None);
    assert_eq!(reader.attribute_namespace(1), Some("urn:p"));
    assert_eq!(reader.attribute_value(1), "x&y");
    assert_eq!(reader.attribute_value(2), "t u\nv");
    assert_eq!(reader.attribute_namespace(3), Some("http://www.w3.org/XML/1998/namespace"));
}

// --- NAMESPACES ---
#[test]
fn test_namespace_scoping() {
    let events = events("<a xmlns='urn:a' xmlns:q='urn:q'><q:b><c xmlns=''/></q:b><d/></a>");
    assert_eq!(
        &events[1..events.len() - 1],
        [
            "START_ELEMENT {urn:a}a",
            "START_ELEMENT {urn:q}b",
            "START_ELEMENT c",
            "END_ELEMENT c",
            "END_ELEMENT {urn:q}b",
            "START_ELEMENT {urn:a}d",
            "END_ELEMENT {urn:a}d",
            "END_ELEMENT {urn:a}a",
        ]
    );
}

#[test]
fn test_undeclared_prefix() {
    assert_eq!(error_kind("<p:a/>"), ParsingErrorType::UndeclaredPrefix("p".to_string()));
    assert_eq!(error_kind("<a p:x='1'/>"), ParsingErrorType::UndeclaredPrefix("p".to_string()));
}

#[test]
fn test_prefix_goes_out_of_scope() {
    assert!(matches!(
        error_kind("<r><a xmlns:p='urn:p'/><p:b/></r>"),
        ParsingErrorType::UndeclaredPrefix(_)
    ));
}

// --- OFFSETS ---
#[test]
fn test_self_closing_end_keeps_offset() {
    let mut reader = XmlStreamReader::for_str("<a><b/><c></c></a>");
    reader.next_event().unwrap();
    reader.next_event().unwrap();

    assert_eq!(reader.next_event().unwrap(), XmlEventKind::StartElement);
    let start_b = reader.offset();
    assert_eq!(reader.next_event().unwrap(), XmlEventKind::EndElement);
    assert_eq!(reader.offset(), start_b);

    assert_eq!(reader.next_event().unwrap(), XmlEventKind::StartElement);
    let start_c = reader.offset();
    assert_eq!(reader.next_event().unwrap(), XmlEventKind::EndElement);
    assert!(reader.offset() > start_c);
}

#[test]
fn test_depth_tracks_open_elements() {
    let mut reader = XmlStreamReader::for_str("<a><b></b></a>");
    reader.next_event().unwrap();
    reader.next_event().unwrap();
    reader.next_event().unwrap();
    assert_eq!(reader.depth(), 2);
    reader.next_event().unwrap();
    assert_eq!(reader.depth(), 1);
}

// --- ERRORS ---
#[test]
fn test_mismatched_end_tag() {
    assert_eq!(
        error_kind("<a><b></a>"),
        ParsingErrorType::MismatchedEndTag {
            expected: "b".to_string(),
            found: "a".to_string()
        }
    );
}

#[test]
fn test_unclosed_element() {
    assert_eq!(error_kind("<a><b></b>"), ParsingErrorType::UnexpectedEOF);
    assert_eq!(error_kind("<a><!-- open"), ParsingErrorType::UnexpectedEOF);
}

#[test]
fn test_malformed_markup() {
    let cases = [
        "<a x='1'y='2'/>",
        "<a x=1/>",
        "<a x='<'/>",
        "text<a/>",
        "<![CDATA[x]]><a/>",
        "<a>&#xZZ;</a>",
        "<a>&amp</a>",
        "<a x='&e;'/>",
        "</a>",
    ];
    for xml in cases {
        assert!(
            matches!(error_kind(xml), ParsingErrorType::MalformedMarkup(_)),
            "expected malformed markup for {xml}"
        );
    }
}

#[test]
fn test_error_message_has_position() {
    let mut reader = XmlStreamReader::for_str("<a></b>");
    reader.next_event().unwrap();
    reader.next_event().unwrap();
    let err = reader.next_event().unwrap_err();

    assert_eq!(err.position(), 7);
    assert_eq!(err.location(), Some(TextLocation { line: 1, column: 8 }));
    assert!(err.to_string().contains("</b> does not match start tag <a>"));
    assert!(err.to_string().contains("at line 1, column 8 (byte 7)"));
}

#[test]
fn test_error_location_spans_lines() {
    let mut reader = XmlStreamReader::for_str("<a>\r\n<b>\n</a>");
    let err = loop {
        if let Err(err) = reader.next_event() {
            break err;
        }
    };
    assert!(matches!(err.kind(), ParsingErrorType::MismatchedEndTag { .. }));
    assert_eq!(err.position(), 13);
    assert_eq!(err.location(), Some(TextLocation { line: 3, column: 5 }));
}

#[test]
fn test_missing_file() {
    let result = XmlStreamReader::for_file("tests/data/does_not_exist.xml");
    assert!(matches!(result.map(|_| ()).unwrap_err().kind(), ParsingErrorType::IoError(_)));
}
