use watchdom::{Document, ElementRef, Selector, SelectorErrorKind};
use watchdom_test_utils::builders::ElementBuilder;
use watchdom_test_utils::init_tracing;

/// Fixture tree:
///
/// ```text
/// div#app.container
/// ├── ul.list
/// │   ├── li.item.first        "one"
/// │   ├── li.item [data-state] "two"
/// │   └── li.item.last         "three"
/// └── p.note
/// ```
fn fixture(document: &Document) -> ElementRef {
    ElementBuilder::new("div")
        .id("app")
        .class("container")
        .child(
            ElementBuilder::new("ul").class("list").child(
                ElementBuilder::new("li")
                    .class("item")
                    .class("first")
                    .text("one"),
            )
            .child(
                ElementBuilder::new("li")
                    .class("item")
                    .attribute("data-state", "active")
                    .text("two"),
            )
            .child(
                ElementBuilder::new("li")
                    .class("item")
                    .class("last")
                    .text("three"),
            ),
        )
        .child(ElementBuilder::new("p").class("note"))
        .attach_to(document)
}

fn query(document: &Document, source: &str) -> Vec<String> {
    let selector = Selector::parse(source).unwrap();
    document
        .query_all(&selector)
        .iter()
        .map(|el| {
            let classes = el.classes().join(".");
            if classes.is_empty() {
                el.tag()
            } else {
                format!("{}.{}", el.tag(), classes)
            }
        })
        .collect()
}

#[test]
fn tag_and_universal_selectors() {
    init_tracing();
    let document = Document::new();
    fixture(&document);

    assert_eq!(
        query(&document, "li"),
        vec!["li.item.first", "li.item", "li.item.last"]
    );
    assert_eq!(query(&document, "LI").len(), 3);
    assert_eq!(query(&document, "*").len(), 6);
    assert_eq!(query(&document, "span"), Vec::<String>::new());
}

#[test]
fn id_class_and_attribute_selectors() {
    init_tracing();
    let document = Document::new();
    fixture(&document);

    assert_eq!(query(&document, "#app"), vec!["div.container"]);
    assert_eq!(query(&document, ".item.first"), vec!["li.item.first"]);
    assert_eq!(query(&document, "[data-state]"), vec!["li.item"]);
    assert_eq!(query(&document, "[data-state=active]"), vec!["li.item"]);
    assert_eq!(query(&document, "[data-state='active']"), vec!["li.item"]);
    assert_eq!(query(&document, "[data-state=\"active\"]"), vec!["li.item"]);
    assert_eq!(query(&document, "[data-state=idle]"), Vec::<String>::new());
    assert_eq!(query(&document, "li[data-state].item"), vec!["li.item"]);
}

#[test]
fn combinators_walk_ancestors() {
    init_tracing();
    let document = Document::new();
    fixture(&document);

    assert_eq!(query(&document, "div li").len(), 3);
    assert_eq!(query(&document, ".container .note"), vec!["p.note"]);
    assert_eq!(query(&document, "ul > li").len(), 3);
    // li is a grandchild of the div, not a child.
    assert_eq!(query(&document, "div > li"), Vec::<String>::new());
    assert_eq!(query(&document, "#app > ul > li.first"), vec!["li.item.first"]);
    assert_eq!(query(&document, "p li"), Vec::<String>::new());
}

#[test]
fn groups_match_any_alternative_in_document_order() {
    init_tracing();
    let document = Document::new();
    fixture(&document);

    assert_eq!(
        query(&document, ".first, .last"),
        vec!["li.item.first", "li.item.last"]
    );
    assert_eq!(
        query(&document, "p, #app"),
        vec!["div.container", "p.note"]
    );
}

#[test]
fn detached_subtrees_never_match() {
    init_tracing();
    let document = Document::new();
    let app = fixture(&document);

    assert_eq!(query(&document, "li").len(), 3);
    app.remove();
    assert_eq!(query(&document, "li").len(), 0);
    assert_eq!(document.element_count(), 0);
}

#[test]
fn inline_style_removal_falls_back_to_defaults() {
    init_tracing();
    let document = Document::new();
    let element = ElementBuilder::new("div")
        .style("visibility", "hidden")
        .attach_to(&document);

    assert!(element.is_attached());
    assert_eq!(element.style("visibility"), "hidden");

    element.remove_style("visibility");
    assert_eq!(element.style("visibility"), "visible");

    element.remove();
    assert!(!element.is_attached());
}

#[test]
fn selector_display_round_trips_the_source() {
    init_tracing();

    let source = "ul > li.item, #app [data-state='active']";
    let selector = Selector::parse(source).unwrap();
    assert_eq!(selector.to_string(), source);
    assert_eq!(selector.source(), source);

    let parsed: Selector = "div .note".parse().unwrap();
    assert_eq!(parsed.source(), "div .note");
}

#[test]
fn parse_errors_carry_kind_and_position() {
    init_tracing();

    let kind_of = |source: &str| Selector::parse(source).unwrap_err().kind().clone();

    assert_eq!(kind_of(""), SelectorErrorKind::Empty);
    assert_eq!(kind_of("   "), SelectorErrorKind::Empty);
    assert_eq!(kind_of("div >"), SelectorErrorKind::DanglingCombinator);
    assert_eq!(kind_of("> div"), SelectorErrorKind::DanglingCombinator);
    assert_eq!(kind_of("div > > p"), SelectorErrorKind::DanglingCombinator);
    assert_eq!(kind_of("div,,p"), SelectorErrorKind::EmptyGroup);
    assert_eq!(kind_of("div,"), SelectorErrorKind::EmptyGroup);
    assert_eq!(kind_of(",div"), SelectorErrorKind::EmptyGroup);
    assert_eq!(kind_of(".#"), SelectorErrorKind::ExpectedName);
    assert_eq!(kind_of("#"), SelectorErrorKind::ExpectedName);
    assert_eq!(kind_of("[=x]"), SelectorErrorKind::ExpectedName);
    assert_eq!(kind_of("[attr=]"), SelectorErrorKind::ExpectedName);
    assert_eq!(kind_of("[attr"), SelectorErrorKind::UnterminatedAttribute);
    assert_eq!(kind_of("[attr='x"), SelectorErrorKind::UnterminatedAttribute);
    assert_eq!(kind_of("div$"), SelectorErrorKind::UnexpectedChar('$'));
    assert_eq!(kind_of("div*"), SelectorErrorKind::UnexpectedChar('*'));

    let err = Selector::parse("> div").unwrap_err();
    assert_eq!(err.position(), 0);
    let err = Selector::parse("div$").unwrap_err();
    assert_eq!(err.position(), 3);
    let err = Selector::parse("div >").unwrap_err();
    assert_eq!(err.position(), 5);
}
