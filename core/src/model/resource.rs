use eyre::{eyre, Result};
use strum::{Display, FromRepr};

use super::{Audit, Grade, GradeId, ResourceId, Subject, SubjectId, Tag, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(i32)]
pub enum ResourceType {
    None = 0,
    Pdf = 1,
    Word = 2,
    PowerPoint = 3,
    Excel = 4,
    Weblink = 5,
}

impl ResourceType {
    pub fn from_db_repr(value: i32) -> Result<ResourceType> {
        ResourceType::from_repr(value).ok_or_else(|| eyre!("invalid ResourceType {}", value))
    }

    pub fn to_db_repr(self) -> i32 {
        self as i32
    }

    /// Guess the type of an uploaded attachment from its file extension.
    pub fn from_file_extension(ext: &str) -> ResourceType {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => ResourceType::Pdf,
            "doc" | "docx" => ResourceType::Word,
            "ppt" | "pptx" => ResourceType::PowerPoint,
            "xls" | "xlsx" => ResourceType::Excel,
            _ => ResourceType::None,
        }
    }

    pub fn is_file(self) -> bool {
        matches!(
            self,
            ResourceType::Pdf | ResourceType::Word | ResourceType::PowerPoint | ResourceType::Excel
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub subject_id: SubjectId,
    pub grade_id: GradeId,
    pub image_url: String,
    pub link_url: Option<String>,
    pub attachment_url: Option<String>,
    pub resource_type: ResourceType,
    pub audit: Audit,
}

/// A resource together with everything a view of it needs from other tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDetail {
    pub resource: Resource,
    pub grade: Grade,
    pub subject: Subject,
    pub tags: Vec<Tag>,
    pub vote_count: i64,
    pub voted_by_user: bool,
    pub bookmarked_by_user: bool,
}

/// Filter for searching resources and learning modules.
/// Empty id lists do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    pub grade_ids: Vec<GradeId>,
    pub subject_ids: Vec<SubjectId>,
    pub tag_ids: Vec<super::TagId>,
    pub created_by: Vec<UserId>,
    pub search_text: Option<String>,
    pub page: i64,
}

pub const PAGE_SIZE: i64 = 30;
