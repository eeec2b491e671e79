//! End-to-end path resolution against the pet store contract.

use http::Method;
use theseus::{
    find_path, ContractLoader, MatchOrder, ResolverConfig, SpecLocation, Theseus, TheseusConfig,
    ValidationType,
};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn theseus(resolver: ResolverConfig) -> Theseus {
    let contract = ContractLoader::from_yaml(PETSTORE).unwrap();
    let config = TheseusConfig {
        resolver,
        ..TheseusConfig::default()
    };
    Theseus::new(contract, &config)
}

#[test]
fn literal_template_resolves() {
    let resolution = theseus(ResolverConfig::default()).resolve(&Method::GET, "/pets");
    assert!(resolution.matched);
    assert_eq!(resolution.template, "/pets");
    assert_eq!(resolution.operation_id.as_deref(), Some("listPets"));
    assert!(resolution.errors.is_empty());
}

#[test]
fn integer_parameter_resolves_and_is_extracted() {
    let resolution = theseus(ResolverConfig::default()).resolve(&Method::GET, "/pets/7");
    assert_eq!(resolution.template, "/pets/{petId}");
    assert_eq!(resolution.operation_id.as_deref(), Some("getPet"));
    assert_eq!(resolution.path_params["petId"], "7");
}

#[test]
fn literal_declared_before_placeholder_wins() {
    let resolution = theseus(ResolverConfig::default()).resolve(&Method::GET, "/pets/mine");
    assert_eq!(resolution.template, "/pets/mine");
    assert_eq!(resolution.operation_id.as_deref(), Some("listMyPets"));
}

#[test]
fn non_integer_value_is_not_found() {
    let resolution = theseus(ResolverConfig::default()).resolve(&Method::GET, "/pets/rex");
    assert!(!resolution.matched);
    assert_eq!(resolution.template, "");
    assert_eq!(resolution.errors.len(), 1);

    let error = &resolution.errors[0];
    assert!(error.is(ValidationType::Path, "missing"));
    assert_eq!(error.message, "Path '/pets/rex' not found");
    assert_eq!(error.spec_location, SpecLocation::UNKNOWN);
}

#[test]
fn parameter_type_errors_point_into_the_contract() {
    let config = ResolverConfig::default().with_parameter_type_errors(true);
    let resolution = theseus(config).resolve(&Method::GET, "/pets/rex");

    assert_eq!(resolution.errors.len(), 2);
    assert!(resolution.errors[0].is(ValidationType::Path, "number"));
    assert_eq!(resolution.errors[0].spec_location, SpecLocation::new(25, 11));
    assert!(resolution.errors[1].is(ValidationType::Path, "missing"));
}

#[test]
fn string_parameter_rejects_numbers() {
    let theseus = theseus(ResolverConfig::default());
    assert_eq!(
        theseus.resolve(&Method::GET, "/owners/alice").operation_id.as_deref(),
        Some("getOwner")
    );
    assert!(!theseus.resolve(&Method::GET, "/owners/42").matched);
    assert!(!theseus.resolve(&Method::POST, "/orders/123").matched);
    assert!(theseus.resolve(&Method::POST, "/orders/abc").matched);
}

#[test]
fn operation_level_parameter_type_is_located() {
    let config = ResolverConfig::default().with_parameter_type_errors(true);
    let resolution = theseus(config).resolve(&Method::GET, "/owners/42");
    assert!(resolution.errors[0].is(ValidationType::Path, "string"));
    assert_eq!(resolution.errors[0].spec_location, SpecLocation::new(40, 13));
}

#[test]
fn method_must_be_bound() {
    let theseus = theseus(ResolverConfig::default());
    assert!(!theseus.resolve(&Method::PUT, "/pets").matched);
    assert!(!theseus.resolve(&Method::POST, "/pets/mine").matched);

    let delete = theseus.resolve(&Method::DELETE, "/pets/7");
    assert_eq!(delete.operation_id.as_deref(), Some("deletePet"));
    assert!(delete.deprecated);
    assert_eq!(delete.tags, vec!["admin".to_string()]);
}

#[test]
fn segment_count_must_agree() {
    let theseus = theseus(ResolverConfig::default());
    assert!(!theseus.resolve(&Method::GET, "/pets/7/toys").matched);
    assert!(!theseus.resolve(&Method::GET, "/").matched);
}

#[test]
fn specificity_order_lists_literals_first() {
    let resolver = theseus(ResolverConfig::default().with_match_order(MatchOrder::Specificity))
        .resolver();
    assert_eq!(
        resolver.templates_for_method(&Method::GET),
        vec!["/pets/mine", "/pets", "/owners/{ownerName}", "/pets/{petId}"]
    );
    assert_eq!(
        resolver.methods(),
        vec![Method::GET, Method::POST, Method::DELETE]
    );
}

#[test]
fn borrowed_match_exposes_path_item() {
    let contract = ContractLoader::from_yaml(PETSTORE).unwrap();
    let found = find_path(&Method::POST, "/pets", &contract);
    let operation = found.operation.unwrap();
    assert!(operation.request_body.is_some());
    assert!(found.path_item.unwrap().operation(&Method::GET).is_some());

    let (item, errors, template) = found.into_parts();
    assert!(item.is_some());
    assert!(errors.is_empty());
    assert_eq!(template, "/pets");
}

#[test]
fn resolution_is_repeatable() {
    let theseus = theseus(ResolverConfig::strict());
    for path in ["/pets/7", "/pets/rex", "/owners/42", "/nowhere"] {
        assert_eq!(
            theseus.resolve(&Method::GET, path),
            theseus.resolve(&Method::GET, path),
            "{path}"
        );
    }
}
