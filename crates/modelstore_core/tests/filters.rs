mod support;

use modelstore_core::{
    DatabaseProvider, DbError, FetchRequest, Filter, ModelConvertible, PersistentContainer,
    SortDescriptor,
};
use support::{memory_container, people_client, sorted_names, Person, PersonRecord};

async fn seeded() -> PersistentContainer {
    let container = memory_container();
    let client = people_client(&container);

    let mut ada = Person::new("Ada", "ada@example.com", 36);
    ada.nickname = Some("countess".to_string());
    let mut alan = Person::new("alan", "alan@example.com", 41);
    alan.nickname = Some("prof".to_string());
    let grace = Person::new("Grace", "grace@navy.mil", 45);
    let star = Person::new("St*r", "star@example.com", 19);

    for person in [ada, alan, grace, star] {
        client.create(&person).await.unwrap();
    }
    container
}

fn names(container: &PersistentContainer, request: FetchRequest<PersonRecord>) -> Vec<String> {
    let records = container
        .with_context(|context| -> Result<Vec<PersonRecord>, DbError> { context.fetch(&request) })
        .unwrap();
    records.into_iter().map(|record| record.name).collect()
}

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

#[tokio::test]
async fn conjunction_is_order_independent() {
    let container = seeded().await;
    let adults = Filter::greater_than_or_equal("age", 21);
    let example = Filter::ends_with("email", "@example.com");

    let forward = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::and([adults.clone(), example.clone()])),
    );
    let backward = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::and([example, adults])),
    );

    assert_eq!(sorted(forward.clone()), vec!["Ada", "alan"]);
    assert_eq!(sorted(forward), sorted(backward));
}

#[tokio::test]
async fn sort_and_paging_apply_in_order() {
    let container = seeded().await;

    let by_age = names(
        &container,
        PersonRecord::fetch_request()
            .sorted_by(SortDescriptor::descending("age"))
            .with_limit(2)
            .with_offset(1),
    );
    assert_eq!(by_age, vec!["alan", "Ada"]);

    let skipped = names(
        &container,
        PersonRecord::fetch_request()
            .sorted_by(SortDescriptor::ascending("age"))
            .with_offset(3),
    );
    assert_eq!(skipped, vec!["Grace"]);
}

#[tokio::test]
async fn string_matches_are_case_sensitive_and_literal() {
    let container = seeded().await;

    let upper_a = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::begins_with("name", "A")),
    );
    assert_eq!(upper_a, vec!["Ada"]);

    let asterisk = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::contains("name", "*")),
    );
    assert_eq!(asterisk, vec!["St*r"]);

    let navy = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::ends_with("email", ".mil")),
    );
    assert_eq!(navy, vec!["Grace"]);
}

#[tokio::test]
async fn null_membership_range_and_negation() {
    let container = seeded().await;

    let without_nickname = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::equals("nickname", None::<String>)),
    );
    assert_eq!(sorted(without_nickname), vec!["Grace", "St*r"]);

    let with_nickname = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::is_not_null("nickname")),
    );
    assert_eq!(sorted(with_nickname), vec!["Ada", "alan"]);

    let listed = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::is_in("age", [19, 45, 100])),
    );
    assert_eq!(sorted(listed), vec!["Grace", "St*r"]);

    let nobody = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::is_in("age", Vec::<i64>::new())),
    );
    assert!(nobody.is_empty());

    let middle = names(
        &container,
        PersonRecord::fetch_request().with_predicate(!Filter::between("age", 36, 41)),
    );
    assert_eq!(sorted(middle), vec!["Grace", "St*r"]);

    let either = names(
        &container,
        PersonRecord::fetch_request().with_predicate(Filter::or([
            Filter::equals("name", "Ada"),
            Filter::less_than("age", 20),
        ])),
    );
    assert_eq!(sorted(either), vec!["Ada", "St*r"]);
}

#[tokio::test]
async fn client_fetch_matching_converts_filtered_records() {
    let container = seeded().await;
    let client = people_client(&container);

    let request = PersonRecord::fetch_request()
        .filter(Filter::greater_than("age", 40))
        .filter(Filter::not_equals("name", "Grace"));
    let people = client.fetch_matching(request).await.unwrap();
    assert_eq!(sorted_names(&people), vec!["alan".to_string()]);

    assert_eq!(client.fetch().await.unwrap().len(), 4);
}
