use chrono::{Duration, SubsecRound, Utc};
use claims::{assert_err, assert_none, assert_ok, assert_some};
use pretty_assertions::assert_eq;

use super::util::{insert_grade, insert_subject, insert_tag, new_resource, taxonomy_fixture, user};
use crate::model::{
    repository::{self, db::DbConn, RepositoryError},
    ContentFilter, GradeId, Resource, ResourceId, ResourceType, TagId, PAGE_SIZE,
};

#[test]
fn insert_retrieve_with_detail() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let tag_b = insert_tag(&mut conn, "geometry");
    let tag_a = insert_tag(&mut conn, "algebra");
    let resource = new_resource("Triangles", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[tag_b.id, tag_a.id, tag_b.id]
    ));
    let retrieved = assert_some!(assert_ok!(repository::resource::get_resource(
        &mut conn,
        resource.id
    )));
    assert_eq!(retrieved, resource);

    let detail = assert_some!(assert_ok!(repository::resource::get_resource_detail(
        &mut conn,
        resource.id,
        user(2)
    )));
    assert_eq!(detail.resource, resource);
    assert_eq!(detail.grade, grade);
    assert_eq!(detail.subject, subject);
    assert_eq!(detail.tags, vec![tag_a, tag_b]);
    assert_eq!(detail.vote_count, 0);
    assert!(!detail.voted_by_user);
    assert!(!detail.bookmarked_by_user);
}

#[test]
fn detail_of_unknown_is_none() {
    let mut conn = super::db::open_in_memory_and_migrate();
    assert_none!(assert_ok!(repository::resource::get_resource_detail(
        &mut conn,
        ResourceId::new_random(),
        user(1)
    )));
}

#[test]
fn insert_with_unknown_grade_fails() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let mut resource = new_resource("Orphan", &grade, &subject, user(1));
    resource.grade_id = crate::model::GradeId::new_random();
    assert_err!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[]
    ));
}

#[test]
fn update_replaces_fields_and_tags() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let other_grade = insert_grade(&mut conn, "Grade 6");
    let old_tag = insert_tag(&mut conn, "old");
    let new_tag = insert_tag(&mut conn, "new");
    let resource = new_resource("Draft", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[old_tag.id]
    ));
    let updated = Resource {
        title: "Final".to_owned(),
        grade_id: other_grade.id,
        link_url: Some("https://example.com/final".to_owned()),
        attachment_url: None,
        resource_type: ResourceType::Weblink,
        audit: resource.audit.touched_by(user(3)),
        ..resource.clone()
    };
    assert_ok!(repository::resource::update_resource(
        &mut conn,
        &updated,
        &[new_tag.id]
    ));
    let detail = assert_some!(assert_ok!(repository::resource::get_resource_detail(
        &mut conn,
        resource.id,
        user(1)
    )));
    assert_eq!(detail.resource, updated);
    assert_eq!(detail.grade, other_grade);
    assert_eq!(detail.tags, vec![new_tag]);
}

#[test]
fn update_unknown_is_not_found() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let resource = new_resource("Ghost", &grade, &subject, user(1));
    let err = assert_err!(repository::resource::update_resource(
        &mut conn,
        &resource,
        &[]
    ));
    assert_eq!(
        err.downcast_ref::<RepositoryError>(),
        Some(&RepositoryError::NotFound(resource.id.to_string()))
    );
}

#[test]
fn search_filters() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let grade2 = insert_grade(&mut conn, "Grade 7");
    let subject2 = insert_subject(&mut conn, "History");
    let tag = insert_tag(&mut conn, "quiz");
    let r1 = new_resource("Fractions worksheet", &grade, &subject, user(1));
    let r2 = new_resource("Roman empire", &grade2, &subject2, user(2));
    let mut r3 = new_resource("Percent_values 100%", &grade, &subject2, user(2));
    r3.description = "Covers discounts".to_owned();
    assert_ok!(repository::resource::insert_resource(&mut conn, &r1, &[tag.id]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r2, &[]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r3, &[tag.id]));

    let search = |conn: &mut DbConn, filter: ContentFilter| -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> =
            assert_ok!(repository::resource::search_resources(conn, &filter))
                .into_iter()
                .map(|r| r.id)
                .collect();
        ids.sort();
        ids
    };
    let sorted = |mut ids: Vec<ResourceId>| {
        ids.sort();
        ids
    };

    assert_eq!(
        search(&mut conn, ContentFilter::default()),
        sorted(vec![r1.id, r2.id, r3.id])
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                grade_ids: vec![grade.id],
                ..Default::default()
            }
        ),
        sorted(vec![r1.id, r3.id])
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                subject_ids: vec![subject2.id],
                grade_ids: vec![grade.id],
                ..Default::default()
            }
        ),
        vec![r3.id]
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                tag_ids: vec![tag.id],
                ..Default::default()
            }
        ),
        sorted(vec![r1.id, r3.id])
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                created_by: vec![user(2)],
                ..Default::default()
            }
        ),
        sorted(vec![r2.id, r3.id])
    );
    // matches description too, case-insensitively
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                search_text: Some("DISCOUNT".to_owned()),
                ..Default::default()
            }
        ),
        vec![r3.id]
    );
    // wildcards in the search text are literal
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                search_text: Some("100%".to_owned()),
                ..Default::default()
            }
        ),
        vec![r3.id]
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                search_text: Some("r_m".to_owned()),
                ..Default::default()
            }
        ),
        Vec::<ResourceId>::new()
    );
    assert_eq!(
        search(
            &mut conn,
            ContentFilter {
                search_text: Some("   ".to_owned()),
                ..Default::default()
            }
        )
        .len(),
        3
    );
}

#[test]
fn search_pages_most_recent_first() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let base = Utc::now().trunc_subsecs(3);
    let total = PAGE_SIZE + 5;
    let mut resources = Vec::new();
    for i in 0..total {
        let mut resource = new_resource(&format!("r{}", i), &grade, &subject, user(1));
        resource.audit.updated_on = base + Duration::seconds(i);
        assert_ok!(repository::resource::insert_resource(
            &mut conn,
            &resource,
            &[]
        ));
        resources.push(resource);
    }
    resources.reverse();
    let first = assert_ok!(repository::resource::search_resources(
        &mut conn,
        &ContentFilter::default()
    ));
    let second = assert_ok!(repository::resource::search_resources(
        &mut conn,
        &ContentFilter {
            page: 1,
            ..Default::default()
        }
    ));
    assert_eq!(first, resources[..PAGE_SIZE as usize].to_vec());
    assert_eq!(second, resources[PAGE_SIZE as usize..].to_vec());

    let window = assert_ok!(repository::resource::search_resources_window(
        &mut conn,
        &ContentFilter {
            page: 7,
            ..Default::default()
        },
        3,
        4
    ));
    assert_eq!(window, resources[3..7].to_vec());
}

#[test]
fn delete_cascades() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let tag = insert_tag(&mut conn, "cascade");
    let resource = new_resource("Doomed", &grade, &subject, user(1));
    let kept = new_resource("Kept", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &resource, &[tag.id]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &kept, &[]));
    let module = super::util::new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    assert_ok!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[resource.id, kept.id],
        user(1)
    ));
    assert_ok!(repository::vote::add_resource_vote(&mut conn, resource.id, user(5)));
    assert_ok!(repository::bookmark::add_user_resource(&mut conn, user(5), resource.id));

    assert_ok!(repository::resource::delete_resource(&mut conn, resource.id));
    assert_none!(assert_ok!(repository::resource::get_resource(
        &mut conn,
        resource.id
    )));
    assert_eq!(
        assert_ok!(repository::vote::count_resource_votes(&mut conn, resource.id)),
        0
    );
    assert!(assert_ok!(repository::bookmark::get_user_resources(&mut conn, user(5))).is_empty());
    let in_module = assert_ok!(repository::resource_module::get_resources_in_module(
        &mut conn, module.id
    ));
    assert_eq!(in_module, vec![kept.clone()]);
    // the tag itself is now unused and can go
    assert_ok!(repository::taxonomy::tag::delete_many(&mut conn, &[tag.id]));

    let err = assert_err!(repository::resource::delete_resource(&mut conn, resource.id));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::NotFound(_))
    ));
}

#[test]
fn authors_are_distinct() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    for (i, author) in [user(1), user(2), user(1)].into_iter().enumerate() {
        let resource = new_resource(&format!("r{}", i), &grade, &subject, author);
        assert_ok!(repository::resource::insert_resource(&mut conn, &resource, &[]));
    }
    let mut authors = assert_ok!(repository::resource::get_resource_authors(&mut conn));
    authors.sort();
    assert_eq!(authors, vec![user(1), user(2)]);
}

#[test]
fn page_past_the_end_is_empty() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let resource = new_resource("Fractions", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[]
    ));
    for page in [1, i64::MAX / 2, i64::MAX] {
        let found = assert_ok!(repository::resource::search_resources(
            &mut conn,
            &ContentFilter {
                page,
                ..Default::default()
            }
        ));
        assert_eq!(found, vec![]);
    }
}

#[test]
fn unknown_grade_or_tag_is_not_found() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let mut resource = new_resource("Fractions", &grade, &subject, user(1));
    resource.grade_id = GradeId::new_random();
    let err = assert_err!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[]
    ));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::NotFound(_))
    ));

    let resource = new_resource("Fractions", &grade, &subject, user(1));
    let err = assert_err!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[TagId::new_random()]
    ));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::NotFound(_))
    ));
    assert_none!(assert_ok!(repository::resource::get_resource(
        &mut conn,
        resource.id
    )));

    assert_ok!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[]
    ));
    let mut updated = resource.clone();
    updated.subject_id = crate::model::SubjectId::new_random();
    let err = assert_err!(repository::resource::update_resource(
        &mut conn,
        &updated,
        &[]
    ));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::NotFound(_))
    ));
}
