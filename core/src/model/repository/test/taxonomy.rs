use claims::{assert_err, assert_ok, assert_some};
use pretty_assertions::assert_eq;

use super::util::{insert_grade, insert_subject, insert_tag, new_resource, taxonomy_fixture, user};
use crate::model::{
    repository::{self, RepositoryError},
    Audit, Grade, GradeId,
};

#[test]
fn insert_retrieve() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let grade_b = insert_grade(&mut conn, "Grade 2");
    let grade_a = insert_grade(&mut conn, "Grade 1");
    let retrieved = assert_some!(assert_ok!(repository::taxonomy::grade::get(
        &mut conn, grade_a.id
    )));
    assert_eq!(retrieved, grade_a);
    let all = assert_ok!(repository::taxonomy::grade::get_all(&mut conn));
    assert_eq!(all, vec![grade_a, grade_b]);
}

#[test]
fn get_unknown_is_none() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let retrieved = assert_ok!(repository::taxonomy::tag::get(
        &mut conn,
        crate::model::TagId::new_random()
    ));
    assert_eq!(retrieved, None);
}

#[test]
fn get_by_name_ignores_case() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let subject = insert_subject(&mut conn, "Science");
    let retrieved = assert_some!(assert_ok!(repository::taxonomy::subject::get_by_name(
        &mut conn, "sCiEnCe"
    )));
    assert_eq!(retrieved, subject);
}

#[test]
fn inserting_duplicate_name_is_conflict() {
    let mut conn = super::db::open_in_memory_and_migrate();
    insert_tag(&mut conn, "algebra");
    let duplicate = crate::model::Tag {
        id: crate::model::TagId::new_random(),
        tag_name: "Algebra".to_owned(),
        audit: Audit::new(user(2)),
    };
    let err = assert_err!(repository::taxonomy::tag::insert(&mut conn, &duplicate));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::Conflict(_))
    ));
}

#[test]
fn update_name() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let grade = insert_grade(&mut conn, "Grade 1");
    let renamed = Grade {
        grade_name: "First grade".to_owned(),
        audit: grade.audit.touched_by(user(7)),
        ..grade.clone()
    };
    assert_ok!(repository::taxonomy::grade::update_name(&mut conn, &renamed));
    let retrieved = assert_some!(assert_ok!(repository::taxonomy::grade::get(
        &mut conn, grade.id
    )));
    assert_eq!(retrieved, renamed);
    assert_eq!(retrieved.audit.created_by, grade.audit.created_by);
}

#[test]
fn update_unknown_is_not_found() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let grade = Grade {
        id: GradeId::new_random(),
        grade_name: "nope".to_owned(),
        audit: Audit::new(user(1)),
    };
    let err = assert_err!(repository::taxonomy::grade::update_name(&mut conn, &grade));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::NotFound(_))
    ));
}

#[test]
fn delete_many_unused() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let a = insert_tag(&mut conn, "a");
    let b = insert_tag(&mut conn, "b");
    let c = insert_tag(&mut conn, "c");
    let deleted = assert_ok!(repository::taxonomy::tag::delete_many(
        &mut conn,
        &[a.id, c.id]
    ));
    assert_eq!(deleted, 2);
    let all = assert_ok!(repository::taxonomy::tag::get_all(&mut conn));
    assert_eq!(all, vec![b]);
}

#[test]
fn delete_in_use_is_refused() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let unused_grade = insert_grade(&mut conn, "Grade 9");
    let tag = insert_tag(&mut conn, "fractions");
    let resource = new_resource("Fractions", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(
        &mut conn,
        &resource,
        &[tag.id]
    ));
    let err = assert_err!(repository::taxonomy::grade::delete_many(
        &mut conn,
        &[grade.id, unused_grade.id]
    ));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::Conflict(_))
    ));
    // nothing deleted, not even the unused one
    assert_eq!(
        assert_ok!(repository::taxonomy::grade::get_all(&mut conn)).len(),
        2
    );
    assert_err!(repository::taxonomy::tag::delete_many(&mut conn, &[tag.id]));
    assert_err!(repository::taxonomy::subject::delete_many(
        &mut conn,
        &[subject.id]
    ));
}
