use doctree::builder::{DocumentBuilder, EMPTY_MARKER_KEY};
use doctree::dom::{DomDocument, DomError, DomNodeKind, NamespaceContext};
use doctree::model::{Named, Node, NodeType, ParentNode, TreeNode, factory};
use doctree::parser::{ParsingErrorType, XmlStreamReader};

/// Shows the builder's trace output with `RUST_LOG=doctree=trace`.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn parse(xml: &str) -> doctree::Document {
    DocumentBuilder::new().parse(&mut XmlStreamReader::for_str(xml)).unwrap()
}

fn parse_collapsed(xml: &str) -> doctree::Document {
    DocumentBuilder::new()
        .with_collapse_whitespace(true)
        .parse(&mut XmlStreamReader::for_str(xml))
        .unwrap()
}

// --- PARSING ---
#[test]
fn test_parse_structure() {
    init_logging();
    let document = parse(
        "<?xml version='1.0'?>\n\
         <!DOCTYPE order>\n\
         <order xmlns='urn:shop' id='7'><?audit x?>\
         <line qty='2'>Kettle &amp; lid</line><note><![CDATA[<fragile>]]></note>&sig;\
         </order>",
    );

    let order = document.document_element().unwrap();
    assert_eq!(order.namespace(), Some("urn:shop"));
    assert_eq!(order.attribute_value(None, "id"), Some("7"));

    // PI dropped, DTD dropped
    let kinds: Vec<NodeType> = order.children().iter().map(|c| c.node_type()).collect();
    assert_eq!(kinds, [NodeType::Element, NodeType::Element, NodeType::EntityReference]);

    let line = order.children()[0].as_element().unwrap();
    assert_eq!(line.children()[0].as_text(), Some("Kettle & lid"));
    let note = order.children()[1].as_element().unwrap();
    assert_eq!(note.children()[0].node_type(), NodeType::CData);

    // document + order + id + line + qty + text + note + cdata + entity
    assert_eq!(document.weight(), 9);
}

#[test]
fn test_parse_returns_initialized_tree() {
    let document = parse("<a><b/></a>");
    assert!(document.is_initialized());
    assert!(document.children()[0].is_initialized());
}

#[test]
fn test_self_closing_detection() {
    let document = parse("<a><b/><c></c><d /></a>");
    let a = document.document_element().unwrap();
    let flags: Vec<bool> = a
        .children()
        .iter()
        .map(|c| c.as_element().unwrap().is_self_closing())
        .collect();
    assert_eq!(flags, [true, false, true]);
    assert!(!a.is_self_closing());
}

#[test]
fn test_self_closing_does_not_change_identity() {
    assert!(parse("<a/>").structurally_equals(&parse("<a></a>")));
}

#[test]
fn test_attribute_order_in_source_is_irrelevant() {
    let a = parse(r#"<p xmlns:x="urn:x" b="2" x:c="3" a="1"/>"#);
    let b = parse(r#"<p a="1" xmlns:y="urn:x" y:c="3" b="2"/>"#);
    assert!(a.structurally_equals(&b));
}

#[test]
fn test_whitespace_is_content_by_default() {
    let spaced = parse("<a>\n  <b/>\n</a>");
    let tight = parse("<a><b/></a>");
    assert!(!spaced.structurally_equals(&tight));
    assert_eq!(spaced.weight(), tight.weight() + 2);
}

#[test]
fn test_collapse_drops_whitespace_and_comments() {
    init_logging();
    let builder = DocumentBuilder::new().with_collapse_whitespace(true);
    assert!(builder.collapse_whitespace());

    let spaced = parse_collapsed("<a>\n  <b/> <!-- remove -->\n  <c> keep </c>\n</a>");
    let tight = parse_collapsed("<a><b/><c> keep </c></a>");
    assert!(spaced.structurally_equals(&tight));

    // Text with content survives, including its surrounding spaces
    let c = spaced.document_element().unwrap().children()[1].as_element().unwrap();
    assert_eq!(c.children()[0].as_text(), Some(" keep "));
}

#[test]
fn test_top_level_comments_are_kept() {
    let document = parse("<!-- head --><a/><!-- tail -->");
    assert_eq!(document.num_children(), 3);
    assert_eq!(document.children()[0].node_type(), NodeType::Comment);
}

#[test]
fn test_parse_errors_are_propagated() {
    let err = DocumentBuilder::new()
        .parse(&mut XmlStreamReader::for_str("<a><b></a>"))
        .unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::MismatchedEndTag { .. }));
}

#[test]
fn test_quick_parse_functions() {
    let document = doctree::parse_str("<a> <b/> </a>").unwrap();
    let collapsed = doctree::parse_str_collapsed("<a> <b/> </a>").unwrap();
    assert_eq!(document.weight(), 5);
    assert_eq!(collapsed.weight(), 3);
}

#[test]
fn test_parse_file_round_trip() {
    let path = std::env::temp_dir().join("doctree_test_parse_file.xml");
    let document = parse("<list><item n='1'/><item n='2'>two</item></list>");

    doctree::write_xml_file(&path, &document).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

    let reread = doctree::parse_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(reread.structurally_equals(&document));
}

// --- DOM CONVERSION ---
/// `<p:root xmlns:p="urn:p" xmlns="urn:d" p:id="r"><child/>text<!--c--></p:root>`
fn sample_dom() -> DomDocument {
    let mut dom = DomDocument::new();
    let root = dom.create_element_ns(Some("urn:p"), "p:root");
    dom.append_child(dom.root(), root).unwrap();
    dom.set_attribute_ns(root, Some(doctree::dom::XMLNS_NAMESPACE), "xmlns:p", "urn:p")
        .unwrap();
    dom.set_attribute_ns(root, Some(doctree::dom::XMLNS_NAMESPACE), "xmlns", "urn:d")
        .unwrap();
    dom.set_attribute_ns(root, Some("urn:p"), "p:id", "r").unwrap();

    let child = dom.create_element_ns(Some("urn:d"), "child");
    dom.set_user_data(child, EMPTY_MARKER_KEY, "true").unwrap();
    let text = dom.create_text_node("text");
    let comment = dom.create_comment("c");
    for id in [child, text, comment] {
        dom.append_child(root, id).unwrap();
    }
    dom
}

#[test]
fn test_convert_from_dom() {
    let dom = sample_dom();
    let builder = DocumentBuilder::new();
    let node = builder.convert_from_dom(&dom, dom.root()).unwrap();

    assert!(node.is_initialized());
    let Node::Document(document) = &node else {
        panic!("expected a document");
    };
    let root = document.document_element().unwrap();
    assert_eq!(root.namespace(), Some("urn:p"));
    // Declarations are not attributes
    assert_eq!(root.attribute_count(), 1);
    assert_eq!(root.attribute_value(Some("urn:p"), "id"), Some("r"));

    let child = root.children()[0].as_element().unwrap();
    assert_eq!(child.namespace(), Some("urn:d"));
    assert!(child.is_self_closing());

    // document + root + id + child + text + comment
    assert_eq!(node.weight(), 6);
}

#[test]
fn test_dom_round_trip_preserves_identity() {
    let dom = sample_dom();
    let builder = DocumentBuilder::new();
    let original = builder.convert_from_dom(&dom, dom.root()).unwrap();

    let mut exported = DomDocument::new();
    let root = exported.root();
    let mut namespaces = NamespaceContext::new();
    let returned = builder
        .convert_to_dom(&original, &mut exported, root, None, &mut namespaces)
        .unwrap();
    assert_eq!(returned, root);

    let reimported = builder.convert_from_dom(&exported, exported.root()).unwrap();
    assert_eq!(reimported.structural_hash(), original.structural_hash());

    let child = exported.children(exported.document_element().unwrap()).unwrap()[0];
    assert_eq!(exported.user_data(child, EMPTY_MARKER_KEY), Some("true"));
}

#[test]
fn test_parsed_document_round_trips_through_dom() {
    let document = parse(
        r#"<a xmlns="urn:a" xmlns:q="urn:q" q:k="v"><b xmlns=""><c q:k="w"/></b><q:d/>&ent;</a>"#,
    );
    let builder = DocumentBuilder::new();

    let dom = builder
        .to_dom_document(&document, &mut NamespaceContext::new().with_prefix("urn:q", "q"))
        .unwrap();
    let back = builder.convert_from_dom(&dom, dom.root()).unwrap();
    assert_eq!(back.structural_hash(), document.structural_hash());
}

#[test]
fn test_convert_to_dom_inserts_before_reference() {
    let builder = DocumentBuilder::new();
    let mut dom = DomDocument::new();
    let list = dom.create_element_ns(None, "list");
    dom.append_child(dom.root(), list).unwrap();
    let last = dom.create_element_ns(None, "last");
    dom.append_child(list, last).unwrap();

    let mut first = Node::from(factory::element_ns(None, "first"));
    first.init();
    let id = builder
        .convert_to_dom(&first, &mut dom, list, Some(last), &mut NamespaceContext::new())
        .unwrap();
    assert_eq!(dom.children(list).unwrap(), [id, last]);
}

#[test]
fn test_fragment_becomes_dom_fragment() {
    let builder = DocumentBuilder::new();
    let mut fragment = factory::fragment();
    fragment.append_child(factory::text("a"));
    fragment.append_child(factory::element_ns(None, "b"));

    let mut dom = DomDocument::new();
    let holder = dom.create_element_ns(None, "holder");
    dom.append_child(dom.root(), holder).unwrap();
    let id = builder
        .convert_to_dom(&Node::from(fragment), &mut dom, holder, None, &mut NamespaceContext::new())
        .unwrap();

    assert!(matches!(dom.kind(id).unwrap(), DomNodeKind::DocumentFragment));
    assert_eq!(dom.children(id).unwrap().len(), 2);

    let back = builder.convert_from_dom(&dom, id).unwrap();
    assert_eq!(back.node_type(), NodeType::Fragment);
    assert_eq!(back.weight(), 2);
}

#[test]
fn test_unsupported_dom_nodes() {
    let mut dom = DomDocument::new();
    let doctype = dom.create_document_type("html");
    dom.append_child(dom.root(), doctype).unwrap();

    let err = DocumentBuilder::new().convert_from_dom(&dom, dom.root()).unwrap_err();
    assert!(matches!(err, DomError::UnsupportedNode(_)));

    let err = DocumentBuilder::new().convert_from_dom(&dom, 99).unwrap_err();
    assert_eq!(err, DomError::InvalidNode(99));
}
