use claims::{assert_err, assert_none, assert_ok, assert_some};
use pretty_assertions::assert_eq;

use super::util::{new_learning_module, taxonomy_fixture, user};
use crate::model::{repository, Audit, LearningModuleId, TabConfiguration, TabConfigurationId};

#[test]
fn insert_update_delete() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let m1 = new_learning_module("First", &grade, &subject, user(1));
    let m2 = new_learning_module("Second", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(&mut conn, &m1, &[]));
    assert_ok!(repository::learning_module::insert_learning_module(&mut conn, &m2, &[]));
    let tab = TabConfiguration {
        id: TabConfigurationId::new_random(),
        team_id: "19:team@thread.tacv2".to_owned(),
        channel_id: Some("19:channel@thread.tacv2".to_owned()),
        learning_module_id: m1.id,
        audit: Audit::new(user(1)),
    };
    assert_ok!(repository::tab_configuration::insert_tab_configuration(
        &mut conn, &tab
    ));
    let retrieved = assert_some!(assert_ok!(
        repository::tab_configuration::get_tab_configuration(&mut conn, tab.id)
    ));
    assert_eq!(retrieved, tab);

    let rebound = TabConfiguration {
        learning_module_id: m2.id,
        audit: tab.audit.touched_by(user(4)),
        ..tab.clone()
    };
    assert_ok!(repository::tab_configuration::update_tab_configuration(
        &mut conn, &rebound
    ));
    let retrieved = assert_some!(assert_ok!(
        repository::tab_configuration::get_tab_configuration(&mut conn, tab.id)
    ));
    assert_eq!(retrieved, rebound);

    // deleting the module deletes the tabs bound to it
    assert_ok!(repository::learning_module::delete_learning_module(
        &mut conn, m2.id
    ));
    assert_none!(assert_ok!(
        repository::tab_configuration::get_tab_configuration(&mut conn, tab.id)
    ));
    assert_err!(repository::tab_configuration::delete_tab_configuration(
        &mut conn, tab.id
    ));
}

#[test]
fn unknown_learning_module_fails() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let tab = TabConfiguration {
        id: TabConfigurationId::new_random(),
        team_id: "team".to_owned(),
        channel_id: None,
        learning_module_id: LearningModuleId::new_random(),
        audit: Audit::new(user(1)),
    };
    assert_err!(repository::tab_configuration::insert_tab_configuration(
        &mut conn, &tab
    ));
}
