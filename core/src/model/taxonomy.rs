use super::{Audit, GradeId, SubjectId, TagId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grade {
    pub id: GradeId,
    pub grade_name: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    pub id: SubjectId,
    pub subject_name: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub id: TagId,
    pub tag_name: String,
    pub audit: Audit,
}
