//! Dispatch benchmarks — the hot path.
//!
//! Measures: raw event dispatch, object-building documents end to end, deferred calls, and
//! trace overhead.

use xbind::prelude::*;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct Item {
    id: String,
    text: String,
}

#[derive(Debug, Default)]
struct Feed {
    items: Vec<Value>,
}

fn feed_binder() -> Binder {
    let item_props = Properties::new().property::<Item, _>("id", ParamType::String, |item, v| {
        item.id = v.to_text().unwrap_or_default();
        Ok(())
    });
    let set_text = Method::on::<Item, _>("Item.set_text", |item, args| {
        item.text = args[0].to_text().unwrap_or_default();
        Ok(())
    });
    let add = Method::on::<Feed, _>("Feed.add", |feed, args| {
        feed.items.push(args[0].clone());
        Ok(())
    });

    Binder::builder()
        .rule("feed", ObjectCreateAction::new("feed", Feed::default))
        .and_then(|b| b.rule("feed/item", ObjectCreateAction::new("item", Item::default)))
        .and_then(|b| b.rule("feed/item", SetPropertiesAction::new(item_props)))
        .and_then(|b| b.rule("feed/item", SetNextAction::new(add)))
        .and_then(|b| b.rule("feed/item/text", CallMethodAction::body_text(set_text)))
        .map(BinderBuilder::build)
        .unwrap_or_else(|e| panic!("fixture rules: {e}"))
}

fn feed_document(items: usize) -> String {
    let mut xml = String::from("<feed>");
    for i in 0..items {
        xml.push_str(&format!(r#"<item id="i{i}"><text>entry {i}</text></item>"#));
    }
    xml.push_str("</feed>");
    xml
}

fn nested_document(depth: usize) -> String {
    let mut xml = "<w>".repeat(depth);
    xml.push_str(&"</w>".repeat(depth));
    xml
}

// ═══════════════════════════════════════════════════════════════════════════════
// Event loop without XML
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 10, 100])]
fn events_no_rules(bencher: divan::Bencher, depth: usize) {
    let binder = Binder::builder().build();
    let attributes = Attributes::new();

    bencher.bench_local(|| {
        let mut session = binder.session();
        session.start_document().unwrap();
        for _ in 0..depth {
            session.start_element("", "w", &attributes).unwrap();
        }
        for _ in 0..depth {
            session.end_element("", "w").unwrap();
        }
        session.end_document().unwrap();
    });
}

#[divan::bench(args = [1, 10, 100])]
fn events_wildcard_rule(bencher: divan::Bencher, depth: usize) {
    let binder = Binder::builder()
        .rule("*/w", FnAction::new())
        .map(BinderBuilder::build)
        .unwrap();
    let attributes = Attributes::new();

    bencher.bench_local(|| {
        let mut session = binder.session();
        session.start_document().unwrap();
        for _ in 0..depth {
            session.start_element("", "w", &attributes).unwrap();
        }
        for _ in 0..depth {
            session.end_element("", "w").unwrap();
        }
        session.end_document().unwrap();
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// End to end through quick-xml
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 1000])]
fn parse_feed(bencher: divan::Bencher, items: usize) {
    let binder = feed_binder();
    let xml = feed_document(items);

    bencher.bench_local(|| binder.parse_str(divan::black_box(&xml)).unwrap());
}

#[divan::bench(args = [10, 100])]
fn parse_nested(bencher: divan::Bencher, depth: usize) {
    let binder = Binder::builder()
        .rule("*/w", FnAction::new())
        .map(BinderBuilder::build)
        .unwrap();
    let xml = nested_document(depth);

    bencher.bench_local(|| binder.parse_str(divan::black_box(&xml)).unwrap());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Deferred calls
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn deferred_invocation_two_params(bencher: divan::Bencher) {
    let join = Method::on::<Vec<String>, _>("join", |log, args| {
        log.push(format!("{:?}{:?}", args[0], args[1]));
        Ok(())
    });
    let converter: std::sync::Arc<dyn Converter> = std::sync::Arc::new(StandardConverter);

    bencher.bench_local(|| {
        let target = Value::object(Vec::<String>::new());
        let mut call =
            DeferredInvocation::new(target, join.clone(), 2, converter.clone()).unwrap();
        call.set_param(1, "b".into()).unwrap();
        call.set_param(0, "a".into()).unwrap();
        call.fired()
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// Trace overhead
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn feed_without_trace(bencher: divan::Bencher) {
    let binder = feed_binder();
    let xml = feed_document(50);

    bencher.bench_local(|| {
        let mut session = binder.session();
        session.feed_str(&xml).unwrap();
        session.root()
    });
}

#[divan::bench]
fn feed_with_trace(bencher: divan::Bencher) {
    let binder = feed_binder();
    let xml = feed_document(50);

    bencher.bench_local(|| {
        let mut session = binder.session().with_trace();
        session.feed_str(&xml).unwrap();
        session.trace().len()
    });
}
