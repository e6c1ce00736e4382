use claims::assert_ok;
use pretty_assertions::assert_eq;

use super::util::{new_learning_module, new_resource, taxonomy_fixture, user};
use crate::model::repository;

#[test]
fn resource_votes_are_idempotent() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let resource = new_resource("Votes", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &resource, &[]));

    assert!(assert_ok!(repository::vote::add_resource_vote(&mut conn, resource.id, user(2))));
    assert!(!assert_ok!(repository::vote::add_resource_vote(&mut conn, resource.id, user(2))));
    assert!(assert_ok!(repository::vote::add_resource_vote(&mut conn, resource.id, user(3))));
    assert!(assert_ok!(repository::vote::has_voted_resource(&mut conn, resource.id, user(2))));
    assert!(!assert_ok!(repository::vote::has_voted_resource(&mut conn, resource.id, user(4))));
    assert_eq!(
        assert_ok!(repository::vote::count_resource_votes(&mut conn, resource.id)),
        2
    );
    assert!(assert_ok!(repository::vote::remove_resource_vote(&mut conn, resource.id, user(2))));
    assert!(!assert_ok!(repository::vote::remove_resource_vote(&mut conn, resource.id, user(2))));
    assert_eq!(
        assert_ok!(repository::vote::count_resource_votes(&mut conn, resource.id)),
        1
    );
}

#[test]
fn learning_module_votes() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let module = new_learning_module("Votes", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    assert!(assert_ok!(repository::vote::add_learning_module_vote(
        &mut conn,
        module.id,
        user(2)
    )));
    assert!(!assert_ok!(repository::vote::add_learning_module_vote(
        &mut conn,
        module.id,
        user(2)
    )));
    assert_eq!(
        assert_ok!(repository::vote::count_learning_module_votes(
            &mut conn, module.id
        )),
        1
    );
    assert!(assert_ok!(repository::vote::has_voted_learning_module(
        &mut conn,
        module.id,
        user(2)
    )));
    assert!(assert_ok!(repository::vote::remove_learning_module_vote(
        &mut conn,
        module.id,
        user(2)
    )));
    assert_eq!(
        assert_ok!(repository::vote::count_learning_module_votes(
            &mut conn, module.id
        )),
        0
    );
}

#[test]
fn bookmarks_per_user() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let r1 = new_resource("one", &grade, &subject, user(1));
    let r2 = new_resource("two", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r1, &[]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r2, &[]));
    let module = new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));

    assert!(assert_ok!(repository::bookmark::add_user_resource(&mut conn, user(2), r1.id)));
    assert!(!assert_ok!(repository::bookmark::add_user_resource(&mut conn, user(2), r1.id)));
    assert!(assert_ok!(repository::bookmark::add_user_resource(&mut conn, user(3), r2.id)));
    assert_eq!(
        assert_ok!(repository::bookmark::get_user_resources(&mut conn, user(2))),
        vec![r1.clone()]
    );
    assert!(assert_ok!(repository::bookmark::remove_user_resource(&mut conn, user(2), r1.id)));
    assert!(assert_ok!(repository::bookmark::get_user_resources(&mut conn, user(2))).is_empty());

    assert!(assert_ok!(repository::bookmark::add_user_learning_module(
        &mut conn,
        user(2),
        module.id
    )));
    assert_eq!(
        assert_ok!(repository::bookmark::get_user_learning_modules(&mut conn, user(2))),
        vec![module.clone()]
    );
    assert!(assert_ok!(repository::bookmark::remove_user_learning_module(
        &mut conn,
        user(2),
        module.id
    )));
    assert!(!assert_ok!(repository::bookmark::remove_user_learning_module(
        &mut conn,
        user(2),
        module.id
    )));
}
