diesel::table! {
    Grade (grade_id) {
        grade_id -> Text,
        grade_name -> Text,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    Subject (subject_id) {
        subject_id -> Text,
        subject_name -> Text,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    Tag (tag_id) {
        tag_id -> Text,
        tag_name -> Text,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    Resource (resource_id) {
        resource_id -> Text,
        title -> Text,
        description -> Text,
        subject_id -> Text,
        grade_id -> Text,
        image_url -> Text,
        link_url -> Nullable<Text>,
        attachment_url -> Nullable<Text>,
        resource_type -> Integer,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    ResourceTag (resource_id, tag_id) {
        resource_id -> Text,
        tag_id -> Text,
    }
}

diesel::table! {
    ResourceVote (resource_id, user_id) {
        resource_id -> Text,
        user_id -> Text,
        created_on -> BigInt,
    }
}

diesel::table! {
    LearningModule (learning_module_id) {
        learning_module_id -> Text,
        title -> Text,
        description -> Text,
        subject_id -> Text,
        grade_id -> Text,
        image_url -> Text,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    LearningModuleTag (learning_module_id, tag_id) {
        learning_module_id -> Text,
        tag_id -> Text,
    }
}

diesel::table! {
    LearningModuleVote (learning_module_id, user_id) {
        learning_module_id -> Text,
        user_id -> Text,
        created_on -> BigInt,
    }
}

diesel::table! {
    ResourceModuleMapping (learning_module_id, resource_id) {
        learning_module_id -> Text,
        resource_id -> Text,
        idx -> Integer,
        created_by -> Text,
        created_on -> BigInt,
    }
}

diesel::table! {
    UserResource (user_id, resource_id) {
        user_id -> Text,
        resource_id -> Text,
        created_on -> BigInt,
    }
}

diesel::table! {
    UserLearningModule (user_id, learning_module_id) {
        user_id -> Text,
        learning_module_id -> Text,
        created_on -> BigInt,
    }
}

diesel::table! {
    TabConfiguration (tab_configuration_id) {
        tab_configuration_id -> Text,
        team_id -> Text,
        channel_id -> Nullable<Text>,
        learning_module_id -> Text,
        created_by -> Text,
        updated_by -> Text,
        created_on -> BigInt,
        updated_on -> BigInt,
    }
}

diesel::table! {
    UserSetting (user_id, setting_type) {
        user_id -> Text,
        setting_type -> Integer,
        value -> Text,
        updated_on -> BigInt,
    }
}

diesel::joinable!(Resource -> Grade (grade_id));
diesel::joinable!(Resource -> Subject (subject_id));
diesel::joinable!(ResourceTag -> Resource (resource_id));
diesel::joinable!(ResourceTag -> Tag (tag_id));
diesel::joinable!(ResourceVote -> Resource (resource_id));
diesel::joinable!(LearningModule -> Grade (grade_id));
diesel::joinable!(LearningModule -> Subject (subject_id));
diesel::joinable!(LearningModuleTag -> LearningModule (learning_module_id));
diesel::joinable!(LearningModuleTag -> Tag (tag_id));
diesel::joinable!(LearningModuleVote -> LearningModule (learning_module_id));
diesel::joinable!(ResourceModuleMapping -> LearningModule (learning_module_id));
diesel::joinable!(ResourceModuleMapping -> Resource (resource_id));
diesel::joinable!(UserResource -> Resource (resource_id));
diesel::joinable!(UserLearningModule -> LearningModule (learning_module_id));
diesel::joinable!(TabConfiguration -> LearningModule (learning_module_id));

diesel::allow_tables_to_appear_in_same_query!(
    Grade,
    Subject,
    Tag,
    Resource,
    ResourceTag,
    ResourceVote,
    LearningModule,
    LearningModuleTag,
    LearningModuleVote,
    ResourceModuleMapping,
    UserResource,
    UserLearningModule,
    TabConfiguration,
    UserSetting,
);
