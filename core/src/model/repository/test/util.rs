use uuid::Uuid;

use crate::model::{
    repository::{self, db::DbConn},
    Audit, Grade, GradeId, LearningModule, LearningModuleId, Resource, ResourceId, ResourceType,
    Subject, SubjectId, Tag, TagId, UserId,
};

pub fn user(n: u128) -> UserId {
    UserId(Uuid::from_u128(n))
}

pub fn insert_grade(conn: &mut DbConn, name: &str) -> Grade {
    let grade = Grade {
        id: GradeId::new_random(),
        grade_name: name.to_owned(),
        audit: Audit::new(user(1)),
    };
    repository::taxonomy::grade::insert(conn, &grade).expect("inserting Grade failed");
    grade
}

pub fn insert_subject(conn: &mut DbConn, name: &str) -> Subject {
    let subject = Subject {
        id: SubjectId::new_random(),
        subject_name: name.to_owned(),
        audit: Audit::new(user(1)),
    };
    repository::taxonomy::subject::insert(conn, &subject).expect("inserting Subject failed");
    subject
}

pub fn insert_tag(conn: &mut DbConn, name: &str) -> Tag {
    let tag = Tag {
        id: TagId::new_random(),
        tag_name: name.to_owned(),
        audit: Audit::new(user(1)),
    };
    repository::taxonomy::tag::insert(conn, &tag).expect("inserting Tag failed");
    tag
}

pub fn new_resource(title: &str, grade: &Grade, subject: &Subject, created_by: UserId) -> Resource {
    Resource {
        id: ResourceId::new_random(),
        title: title.to_owned(),
        description: format!("{} description", title),
        subject_id: subject.id,
        grade_id: grade.id,
        image_url: "https://images.example.com/cover.png".to_owned(),
        link_url: None,
        attachment_url: Some(format!("https://files.example.com/{}.pdf", title)),
        resource_type: ResourceType::Pdf,
        audit: Audit::new(created_by),
    }
}

pub fn new_learning_module(
    title: &str,
    grade: &Grade,
    subject: &Subject,
    created_by: UserId,
) -> LearningModule {
    LearningModule {
        id: LearningModuleId::new_random(),
        title: title.to_owned(),
        description: format!("{} description", title),
        subject_id: subject.id,
        grade_id: grade.id,
        image_url: "https://images.example.com/module.png".to_owned(),
        audit: Audit::new(created_by),
    }
}

/// A grade and a subject to hang content off
pub fn taxonomy_fixture(conn: &mut DbConn) -> (Grade, Subject) {
    (insert_grade(conn, "Grade 5"), insert_subject(conn, "Mathematics"))
}
