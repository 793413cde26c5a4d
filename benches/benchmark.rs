use criterion::{Criterion, criterion_group, criterion_main};
use doctree::builder::DocumentBuilder;
use doctree::parser::XmlStreamReader;
use std::hint::black_box;

/// (name, number of records)
const DOCUMENT_SIZES: &[(&str, usize)] = &[("small", 10), ("medium", 1_000), ("large", 20_000)];

/// A catalog with `records` entries mixing attributes, text, CDATA and comments.
fn catalog(records: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog xmlns=\"urn:catalog\" xmlns:m=\"urn:meta\">\n");
    for i in 0..records {
        xml.push_str(&format!(
            "  <record id=\"r{i}\" m:rev=\"{}\">\n    <title>Record &amp; title {i}</title>\n    \
             <body><![CDATA[<p>{i}</p>]]></body>\n    <!-- checked -->\n    <flag/>\n  </record>\n",
            i % 7
        ));
    }
    xml.push_str("</catalog>\n");
    xml
}

fn parse_and_hash(c: &mut Criterion) {
    for (name, records) in DOCUMENT_SIZES {
        let xml = catalog(*records);
        c.bench_function(&format!("parse {name}"), |b| {
            b.iter(|| {
                let document = DocumentBuilder::new()
                    .parse(&mut XmlStreamReader::for_str(black_box(&xml)))
                    .unwrap();
                black_box(document);
            });
        });
    }
}

fn parse_collapsed(c: &mut Criterion) {
    let xml = catalog(1_000);
    let builder = DocumentBuilder::new().with_collapse_whitespace(true);
    c.bench_function("parse collapsed medium", |b| {
        b.iter(|| black_box(builder.parse(&mut XmlStreamReader::for_str(black_box(&xml))).unwrap()));
    });
}

fn serialize(c: &mut Criterion) {
    for (name, records) in DOCUMENT_SIZES {
        let document = doctree::parse_str(&catalog(*records)).unwrap();
        c.bench_function(&format!("serialize {name}"), |b| {
            b.iter(|| black_box(doctree::to_xml_string(black_box(&document)).unwrap()));
        });
    }
}

criterion_group!(regression, parse_and_hash, serialize);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = parse_collapsed
}
criterion_main!(regression, reporting);
