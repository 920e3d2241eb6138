//
//  devops-client
//  api/descriptors.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Built-in type descriptors.
//!
//! One static descriptor per entity whose responses carry timestamps, enum names or
//! described sub-objects. Entities without any such field need no descriptor.

use super::shaping::{EnumDescriptor, FieldKind, TypeDescriptor, TypeRegistry};

// Build

pub static BUILD_DEFINITION_REFERENCE: TypeDescriptor = TypeDescriptor::new(
    "BuildDefinitionReference",
    &[
        ("createdDate", FieldKind::DateTime),
        ("project", FieldKind::Nested(&TEAM_PROJECT_REFERENCE)),
    ],
);

pub static BUILD: TypeDescriptor = TypeDescriptor::new(
    "Build",
    &[
        ("queueTime", FieldKind::DateTime),
        ("startTime", FieldKind::DateTime),
        ("finishTime", FieldKind::DateTime),
        ("lastChangedDate", FieldKind::DateTime),
        ("definition", FieldKind::Nested(&BUILD_DEFINITION_REFERENCE)),
        ("project", FieldKind::Nested(&TEAM_PROJECT_REFERENCE)),
    ],
);

// Core

pub static TEAM_PROJECT_REFERENCE: TypeDescriptor = TypeDescriptor::new(
    "TeamProjectReference",
    &[("lastUpdateTime", FieldKind::DateTime)],
);

// Git

pub static GIT_REPOSITORY: TypeDescriptor = TypeDescriptor::new(
    "GitRepository",
    &[("project", FieldKind::Nested(&TEAM_PROJECT_REFERENCE))],
);

pub static GIT_USER_DATE: TypeDescriptor =
    TypeDescriptor::new("GitUserDate", &[("date", FieldKind::DateTime)]);

pub static GIT_PUSH_REF: TypeDescriptor =
    TypeDescriptor::new("GitPushRef", &[("date", FieldKind::DateTime)]);

pub static GIT_COMMIT_REF: TypeDescriptor = TypeDescriptor::new(
    "GitCommitRef",
    &[
        ("author", FieldKind::Nested(&GIT_USER_DATE)),
        ("committer", FieldKind::Nested(&GIT_USER_DATE)),
        ("push", FieldKind::Nested(&GIT_PUSH_REF)),
    ],
);

// Work item tracking

pub static WORK_ITEM_FIELDS: TypeDescriptor = TypeDescriptor::new(
    "WorkItemFields",
    &[
        ("System.CreatedDate", FieldKind::DateTime),
        ("System.ChangedDate", FieldKind::DateTime),
        ("System.AuthorizedDate", FieldKind::DateTime),
        ("System.RevisedDate", FieldKind::DateTime),
        ("Microsoft.VSTS.Common.StateChangeDate", FieldKind::DateTime),
        ("Microsoft.VSTS.Common.ClosedDate", FieldKind::DateTime),
    ],
);

pub static WORK_ITEM: TypeDescriptor =
    TypeDescriptor::new("WorkItem", &[("fields", FieldKind::Nested(&WORK_ITEM_FIELDS))]);

// Release

pub static RELEASE_STATUS: EnumDescriptor = EnumDescriptor::new(
    "ReleaseStatus",
    &[("undefined", 0), ("draft", 1), ("active", 2), ("abandoned", 4)],
);

pub static RELEASE_REASON: EnumDescriptor = EnumDescriptor::new(
    "ReleaseReason",
    &[
        ("none", 0),
        ("manual", 1),
        ("continuousIntegration", 2),
        ("schedule", 3),
        ("pullRequest", 4),
    ],
);

pub static RELEASE: TypeDescriptor = TypeDescriptor::new(
    "Release",
    &[
        ("createdOn", FieldKind::DateTime),
        ("modifiedOn", FieldKind::DateTime),
        ("status", FieldKind::Enum(&RELEASE_STATUS)),
        ("reason", FieldKind::Enum(&RELEASE_REASON)),
        ("projectReference", FieldKind::Nested(&TEAM_PROJECT_REFERENCE)),
    ],
);

// Process definitions

pub static PROCESS_TYPE: EnumDescriptor = EnumDescriptor::new(
    "ProcessType",
    &[("system", 0), ("custom", 1), ("inherited", 2)],
);

pub static PROCESS: TypeDescriptor =
    TypeDescriptor::new("Process", &[("type", FieldKind::Enum(&PROCESS_TYPE))]);

pub(crate) static BUILTIN_REGISTRY: TypeRegistry = TypeRegistry::new(&[
    &BUILD,
    &BUILD_DEFINITION_REFERENCE,
    &TEAM_PROJECT_REFERENCE,
    &GIT_REPOSITORY,
    &GIT_USER_DATE,
    &GIT_PUSH_REF,
    &GIT_COMMIT_REF,
    &WORK_ITEM,
    &WORK_ITEM_FIELDS,
    &RELEASE,
    &PROCESS,
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::shaping::shape;
    use serde_json::json;

    #[test]
    fn test_builtin_registry_names_are_unique() {
        let registry = TypeRegistry::builtin();
        let mut names: Vec<_> = registry.names().map(str::to_lowercase).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_release_enums_and_dates() {
        let raw = json!({
            "id": 12,
            "status": "active",
            "reason": "continuousIntegration",
            "createdOn": "2024-03-01T08:30:00.123Z",
            "modifiedOn": null
        });
        let shaped = shape(raw, TypeRegistry::builtin().get("Release"), false).unwrap();

        assert_eq!(shaped.get("status").unwrap().as_i64(), Some(2));
        assert_eq!(shaped.get("reason").unwrap().as_i64(), Some(2));
        assert!(shaped.get("createdOn").unwrap().as_datetime().is_some());
    }

    #[test]
    fn test_work_item_field_bag() {
        let raw = json!({
            "id": 1,
            "fields": {
                "System.Title": "Crash on save",
                "System.CreatedDate": "2024-01-02T03:04:05Z"
            }
        });
        let shaped = shape(raw, Some(&WORK_ITEM), false).unwrap();
        let fields = shaped.get("fields").unwrap();
        assert!(fields.get("System.CreatedDate").unwrap().as_datetime().is_some());
        assert_eq!(fields.get("System.Title").unwrap().as_str(), Some("Crash on save"));
    }

    #[test]
    fn test_commit_dates_in_nested_identities() {
        let raw = json!([{
            "commitId": "be67f8871a4d2c75f13a51c1d3c30ac0d74d4ef4",
            "author": {"name": "Ada", "date": "2024-05-05T12:00:00Z"},
            "committer": {"name": "Ada", "date": "2024-05-05T12:01:00Z"}
        }]);
        let shaped = shape(raw, Some(&GIT_COMMIT_REF), true).unwrap();
        let commit = &shaped.as_array().unwrap()[0];
        assert!(commit
            .get("committer")
            .and_then(|c| c.get("date"))
            .and_then(|d| d.as_datetime())
            .is_some());
    }
}
