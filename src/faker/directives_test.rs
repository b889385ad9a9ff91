use super::directives::{DirectiveSet, ListLength, ValueDirective};
use crate::domain::FakerError;
use crate::schema::{MergeOptions, WorkingSchema};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

const SDL: &str = r#"
    scalar Money @fake(type: money)
    extend scalar Money @fake(type: number)

    scalar Tag @examples(values: ["a", "b"])

    type Query {
      price: Money
      discount: Money @fake(type: money, options: { minMoney: 1, maxMoney: 2 })
      tags: [Tag] @listLength(min: 5, max: 3)
      label: Tag @fake(type: word)
      plain: String
      both: Money @fake(type: word) @examples(values: ["x"])
      pinned: Money @examples(values: ["y"])
      localized: String @fake(type: city, locale: fr_FR)
    }
"#;

fn schema() -> WorkingSchema {
    WorkingSchema::build(SDL.to_string(), None, MergeOptions::default()).unwrap()
}

fn directives(schema: &WorkingSchema, field: &str) -> Result<DirectiveSet, FakerError> {
    let query = schema.schema.get_object("Query").unwrap();
    DirectiveSet::for_field(&schema.schema, query.fields.get(field).unwrap())
}

#[test]
fn test_type_extension_applies_last() {
    let schema = schema();
    let set = directives(&schema, "price").unwrap();
    assert_eq!(set.fake.unwrap().generator, "number");
}

#[test]
fn test_field_directive_beats_type_directive() {
    let schema = schema();
    let set = directives(&schema, "discount").unwrap();
    let fake = set.fake.unwrap();
    assert_eq!(fake.generator, "money");
    assert_eq!(fake.options.get("minMoney"), Some(&json!(1)));
}

#[test]
fn test_precedence_is_per_directive_name() {
    let schema = schema();
    // @fake from the field, @examples from the scalar
    let set = directives(&schema, "label").unwrap();
    assert_eq!(set.fake.as_ref().unwrap().generator, "word");
    assert_eq!(set.examples.as_ref().unwrap().values, vec![json!("a"), json!("b")]);
    assert!(matches!(set.value_directive(), ValueDirective::Examples(_)));
}

#[test]
fn test_examples_beat_fake_on_the_same_field() {
    let schema = schema();
    // Money carries a type-level @fake as well
    let set = directives(&schema, "both").unwrap();
    assert_eq!(set.fake.as_ref().unwrap().generator, "word");
    match set.value_directive() {
        ValueDirective::Examples(examples) => assert_eq!(examples.values, vec![json!("x")]),
        other => panic!("expected examples, got {other:?}"),
    }

    let set = directives(&schema, "pinned").unwrap();
    assert_eq!(set.fake.as_ref().unwrap().generator, "number");
    match set.value_directive() {
        ValueDirective::Examples(examples) => assert_eq!(examples.values, vec![json!("y")]),
        other => panic!("expected examples, got {other:?}"),
    }
}

#[test]
fn test_no_directives() {
    let schema = schema();
    let set = directives(&schema, "plain").unwrap();
    assert_eq!(set, DirectiveSet::default());
    assert_eq!(set.value_directive(), ValueDirective::None);
    assert_eq!(set.list_length(), ListLength { min: 2, max: 4 });
}

#[test]
fn test_locale_argument() {
    let schema = schema();
    let set = directives(&schema, "localized").unwrap();
    assert_eq!(set.fake.unwrap().locale.as_deref(), Some("fr_FR"));
}

#[test]
fn test_inverted_list_length_is_repaired() {
    let schema = schema();
    let set = directives(&schema, "tags").unwrap();
    assert_eq!(set.list_length(), ListLength { min: 5, max: 6 });

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let len = set.list_length().sample(&mut rng);
        assert!((5..=6).contains(&len));
    }
}

#[test]
fn test_list_length_new() {
    assert_eq!(ListLength::new(1, 3), ListLength { min: 1, max: 3 });
    assert_eq!(ListLength::new(0, 0), ListLength { min: 0, max: 0 });
    assert_eq!(ListLength::new(4, 1), ListLength { min: 4, max: 5 });
}

#[test]
fn test_for_type_reads_scalar_directives() {
    let schema = schema();
    let money = schema.schema.types.get("Money").unwrap();
    let set = DirectiveSet::for_type(money).unwrap();
    assert_eq!(set.fake.unwrap().generator, "number");
    assert!(set.examples.is_none());
}
