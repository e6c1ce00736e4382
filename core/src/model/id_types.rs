use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

macro_rules! impl_id {
    ($ident:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Copy, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ident(pub Uuid);

        impl $ident {
            pub fn new_random() -> Self {
                $ident(Uuid::new_v4())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<Uuid> for $ident {
            fn from(value: Uuid) -> Self {
                $ident(value)
            }
        }

        impl Display for $ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_fmt(format_args!(concat!(stringify!($ident), "({})"), self.0))
            }
        }
    };
}

impl_id!(GradeId);
impl_id!(SubjectId);
impl_id!(TagId);
impl_id!(ResourceId);
impl_id!(LearningModuleId);
impl_id!(TabConfigurationId);
// AAD object id of a user
impl_id!(UserId);
// AAD object id of a security group
impl_id!(GroupId);
