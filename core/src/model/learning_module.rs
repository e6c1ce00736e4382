use super::{Audit, Grade, GradeId, LearningModuleId, Subject, SubjectId, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LearningModule {
    pub id: LearningModuleId,
    pub title: String,
    pub description: String,
    pub subject_id: SubjectId,
    pub grade_id: GradeId,
    pub image_url: String,
    pub audit: Audit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningModuleDetail {
    pub learning_module: LearningModule,
    pub grade: Grade,
    pub subject: Subject,
    pub tags: Vec<Tag>,
    pub vote_count: i64,
    pub voted_by_user: bool,
    pub bookmarked_by_user: bool,
    pub resource_count: i64,
}
