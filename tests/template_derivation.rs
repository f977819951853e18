// tests/template_derivation.rs
//! Blank-copy derivation of pages for use as creation templates.

use notion_api::{Page, PropertyValue, RichTextItem};
use pretty_assertions::assert_eq;

fn source_page() -> Page {
    serde_json::from_str(include_str!("fixtures/api_responses/page_with_properties.json"))
        .expect("page fixture decodes")
}

#[test]
fn source_fixture_decodes_every_property() {
    let page = source_page();
    assert_eq!(page.properties.len(), 15);
    assert_eq!(page.title(), "Tuscan kale");
    assert!(page.created_time.as_ref().is_some_and(|t| !t.is_zero()));
    assert_eq!(
        page.properties["Last ordered"].value.to_string(),
        "2022-02-22"
    );
}

#[test]
fn template_clears_identity_and_timestamps() {
    let template = source_page().derive_template().unwrap();

    assert_eq!(template.id(), "");
    assert_eq!(template.created_time, None);
    assert_eq!(template.last_edited_time, None);
    assert_eq!(
        template.parent_database_id(),
        Some("d9824bdc-8445-4327-be8b-5b47500af6ce")
    );
}

#[test]
fn template_drops_empty_and_server_computed_properties() {
    let template = source_page().derive_template().unwrap();

    let kept: Vec<&str> = template.properties.keys().map(String::as_str).collect();
    assert_eq!(
        kept,
        vec![
            "Name",
            "Recipes",
            "Store availability",
            "Price",
            "In stock",
            "Description",
            "Last ordered",
            "SKU",
        ]
    );
    for dropped in [
        "Substitutes",
        "Aisle",
        "Food group",
        "Created",
        "Created by",
        "Last edited",
        "Last edited by",
    ] {
        assert!(
            !template.properties.contains_key(dropped),
            "{} should be dropped",
            dropped
        );
    }
}

#[test]
fn template_values_are_copied_verbatim() {
    let source = source_page();
    let template = source.derive_template().unwrap();

    for key in ["Recipes", "Store availability", "SKU", "Price"] {
        assert_eq!(template.properties[key], source.properties[key], "{}", key);
    }
}

#[test]
fn template_shares_no_storage_with_source() {
    let source = source_page();
    let mut template = source.derive_template().unwrap();

    if let PropertyValue::Title { title } = &mut template.properties["Name"].value {
        title.clear();
        title.push(RichTextItem::plain_text("Curly kale"));
    }
    template.properties.shift_remove("Recipes");

    assert_eq!(template.title(), "Curly kale");
    assert_eq!(source.title(), "Tuscan kale");
    assert!(source.properties.contains_key("Recipes"));
}
