use claims::{assert_err, assert_none, assert_ok, assert_some};
use diesel::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::util::{insert_tag, new_learning_module, new_resource, taxonomy_fixture, user};
use crate::model::{
    repository::{self, db::DbConn, schema, RepositoryError},
    ContentFilter, LearningModule, LearningModuleId, Resource, ResourceId,
};

#[test]
fn insert_retrieve_with_detail() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let tag = insert_tag(&mut conn, "ecology");
    let module = new_learning_module("Ecosystems", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[tag.id]
    ));
    let r1 = new_resource("Food chains", &grade, &subject, user(1));
    let r2 = new_resource("Biomes", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r1, &[]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r2, &[]));
    assert_ok!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[r2.id, r1.id],
        user(1)
    ));
    assert_ok!(repository::vote::add_learning_module_vote(
        &mut conn,
        module.id,
        user(2)
    ));
    assert_ok!(repository::bookmark::add_user_learning_module(
        &mut conn,
        user(2),
        module.id
    ));

    let detail = assert_some!(assert_ok!(
        repository::learning_module::get_learning_module_detail(&mut conn, module.id, user(2))
    ));
    assert_eq!(detail.learning_module, module);
    assert_eq!(detail.tags, vec![tag]);
    assert_eq!(detail.resource_count, 2);
    assert_eq!(detail.vote_count, 1);
    assert!(detail.voted_by_user);
    assert!(detail.bookmarked_by_user);

    let other_user = assert_some!(assert_ok!(
        repository::learning_module::get_learning_module_detail(&mut conn, module.id, user(3))
    ));
    assert!(!other_user.voted_by_user);
    assert!(!other_user.bookmarked_by_user);

    let resources = assert_ok!(repository::resource_module::get_resources_in_module(
        &mut conn, module.id
    ));
    assert_eq!(resources, vec![r2, r1]);
}

#[test]
fn append_skips_resources_already_in_module() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let module = new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    let r1 = new_resource("one", &grade, &subject, user(1));
    let r2 = new_resource("two", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r1, &[]));
    assert_ok!(repository::resource::insert_resource(&mut conn, &r2, &[]));
    let appended = assert_ok!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[r1.id, r1.id],
        user(1)
    ));
    assert_eq!(appended, 1);
    let appended = assert_ok!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[r1.id, r2.id],
        user(1)
    ));
    assert_eq!(appended, 1);
    let resources = assert_ok!(repository::resource_module::get_resources_in_module(
        &mut conn, module.id
    ));
    assert_eq!(resources, vec![r1, r2]);
}

#[test]
fn append_unknown_resource_is_conflict() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let module = new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    let err = assert_err!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[ResourceId::new_random()],
        user(1)
    ));
    assert!(matches!(
        err.downcast_ref::<RepositoryError>(),
        Some(RepositoryError::Conflict(_))
    ));
}

#[test]
fn search_and_update() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let tag = insert_tag(&mut conn, "stars");
    let m1 = new_learning_module("Solar system", &grade, &subject, user(1));
    let m2 = new_learning_module("Volcanoes", &grade, &subject, user(2));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &m1,
        &[tag.id]
    ));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &m2,
        &[]
    ));
    let found = assert_ok!(repository::learning_module::search_learning_modules(
        &mut conn,
        &ContentFilter {
            tag_ids: vec![tag.id],
            ..Default::default()
        }
    ));
    assert_eq!(found, vec![m1.clone()]);
    let found = assert_ok!(repository::learning_module::search_learning_modules(
        &mut conn,
        &ContentFilter {
            search_text: Some("volcano".to_owned()),
            ..Default::default()
        }
    ));
    assert_eq!(found, vec![m2.clone()]);

    let updated = LearningModule {
        title: "Planets".to_owned(),
        audit: m1.audit.touched_by(user(9)),
        ..m1.clone()
    };
    assert_ok!(repository::learning_module::update_learning_module(
        &mut conn,
        &updated,
        &[]
    ));
    let retrieved = assert_some!(assert_ok!(
        repository::learning_module::get_learning_module(&mut conn, m1.id)
    ));
    assert_eq!(retrieved, updated);
    let tags = assert_ok!(repository::learning_module::get_tags_for_learning_modules(
        &mut conn,
        &[m1.id]
    ));
    assert!(tags.is_empty());

    let mut authors = assert_ok!(repository::learning_module::get_learning_module_authors(
        &mut conn
    ));
    authors.sort();
    assert_eq!(authors, vec![user(1), user(2)]);
}

#[test]
fn delete_keeps_resources() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let module = new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    let resource = new_resource("stays", &grade, &subject, user(1));
    assert_ok!(repository::resource::insert_resource(&mut conn, &resource, &[]));
    assert_ok!(repository::resource_module::append_resources_to_module(
        &mut conn,
        module.id,
        &[resource.id],
        user(1)
    ));
    assert_ok!(repository::learning_module::delete_learning_module(
        &mut conn, module.id
    ));
    assert_none!(assert_ok!(repository::learning_module::get_learning_module(
        &mut conn, module.id
    )));
    assert_some!(assert_ok!(repository::resource::get_resource(
        &mut conn,
        resource.id
    )));
    assert!(assert_ok!(repository::resource_module::get_modules_for_resource(
        &mut conn,
        resource.id
    ))
    .is_empty());
    assert_err!(repository::learning_module::delete_learning_module(
        &mut conn,
        LearningModuleId::new_random()
    ));
}

#[derive(Debug, Clone)]
enum ModuleOp {
    Append(Vec<prop::sample::Index>),
    Remove(prop::sample::Index),
    DeleteResource(prop::sample::Index),
}

fn arb_module_op() -> impl Strategy<Value = ModuleOp> {
    prop_oneof![
        3 => prop::collection::vec(any::<prop::sample::Index>(), 1..4).prop_map(ModuleOp::Append),
        2 => any::<prop::sample::Index>().prop_map(ModuleOp::Remove),
        1 => any::<prop::sample::Index>().prop_map(ModuleOp::DeleteResource),
    ]
}

fn module_indices(conn: &mut DbConn, id: LearningModuleId) -> Vec<i32> {
    use schema::ResourceModuleMapping;
    ResourceModuleMapping::table
        .filter(
            ResourceModuleMapping::learning_module_id
                .eq(crate::model::util::uuid_to_db_repr(&id.0)),
        )
        .order_by(ResourceModuleMapping::idx)
        .select(ResourceModuleMapping::idx)
        .load(conn)
        .unwrap()
}

#[test]
fn prop_module_order_stays_gap_free() {
    proptest!(|(ops in prop::collection::vec(arb_module_op(), 1..12))| {
        let mut conn = super::db::open_in_memory_and_migrate();
        let (grade, subject) = taxonomy_fixture(&mut conn);
        let module = new_learning_module("Module", &grade, &subject, user(1));
        prop_assert!(repository::learning_module::insert_learning_module(&mut conn, &module, &[]).is_ok());
        let mut pool: Vec<Resource> = Vec::new();
        for i in 0..6 {
            let resource = new_resource(&format!("r{}", i), &grade, &subject, user(1));
            prop_assert!(repository::resource::insert_resource(&mut conn, &resource, &[]).is_ok());
            pool.push(resource);
        }
        let mut expected: Vec<ResourceId> = Vec::new();
        for op in ops {
            match op {
                ModuleOp::Append(idxs) => {
                    let ids: Vec<ResourceId> = idxs.iter().map(|idx| idx.get(&pool).id).collect();
                    let result = repository::resource_module::append_resources_to_module(&mut conn, module.id, &ids, user(1));
                    prop_assert!(result.is_ok(), "append failed: {:?}", result);
                    for id in ids {
                        if !expected.contains(&id) {
                            expected.push(id);
                        }
                    }
                }
                ModuleOp::Remove(idx) => {
                    if expected.is_empty() {
                        continue;
                    }
                    let id = *idx.get(&expected);
                    prop_assert!(repository::resource_module::remove_resource_from_module(&mut conn, module.id, id).is_ok());
                    expected.retain(|e| *e != id);
                }
                ModuleOp::DeleteResource(idx) => {
                    if pool.is_empty() {
                        continue;
                    }
                    let resource = pool.remove(idx.index(pool.len()));
                    prop_assert!(repository::resource::delete_resource(&mut conn, resource.id).is_ok());
                    expected.retain(|e| *e != resource.id);
                }
            }
            let actual: Vec<ResourceId> = repository::resource_module::get_resources_in_module(&mut conn, module.id)
                .unwrap()
                .into_iter()
                .map(|r| r.id)
                .collect();
            prop_assert_eq!(&expected, &actual);
            let indices = module_indices(&mut conn, module.id);
            let gap_free: Vec<i32> = (0..indices.len() as i32).collect();
            prop_assert_eq!(indices, gap_free);
            if pool.is_empty() {
                break;
            }
        }
    });
}

#[test]
fn huge_page_is_empty() {
    let mut conn = super::db::open_in_memory_and_migrate();
    let (grade, subject) = taxonomy_fixture(&mut conn);
    let module = new_learning_module("Module", &grade, &subject, user(1));
    assert_ok!(repository::learning_module::insert_learning_module(
        &mut conn,
        &module,
        &[]
    ));
    let found = assert_ok!(repository::learning_module::search_learning_modules(
        &mut conn,
        &ContentFilter {
            page: i64::MAX,
            ..Default::default()
        }
    ));
    assert_eq!(found, vec![]);
}
