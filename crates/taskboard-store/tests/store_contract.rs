// SPDX-License-Identifier: Apache-2.0

use taskboard_model::{
    Email, ProjectId, ProjectRole, ProjectStatus, Role, TaskId, TaskPriority, TaskStatus, UserId,
};
use taskboard_store::{
    parse_timestamp, NewProject, NewTask, NewUser, SqliteStore, StoreError, TaskPatch,
    SCHEMA_VERSION,
};
use tempfile::tempdir;

fn user(store: &SqliteStore, email: &str, role: Role) -> UserId {
    store
        .create_user(&NewUser {
            first_name: email.split('@').next().unwrap_or("x").to_string(),
            last_name: "Tester".to_string(),
            email: Email::parse(email).expect("email"),
            password_hash: "hash".to_string(),
            role,
        })
        .expect("create user")
        .id
}

fn project(store: &SqliteStore, owner: UserId, name: &str) -> ProjectId {
    store
        .create_project(&NewProject {
            name: name.to_string(),
            description: None,
            status: ProjectStatus::New,
            icon: None,
            created_by: owner,
        })
        .expect("create project")
        .id
}

fn task(store: &SqliteStore, project: ProjectId, creator: UserId, assignee: Option<UserId>) -> TaskId {
    store
        .create_task(&NewTask {
            project_id: project,
            title: "Write docs".to_string(),
            description: Some("all of them".to_string()),
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::Medium),
            due_date: Some(parse_timestamp("2030-01-31T17:00:00").expect("ts")),
            created_by: creator,
            assigned_to: assignee,
        })
        .expect("create task")
        .id
}

fn memory_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().expect("open");
    store.migrate().expect("migrate");
    store
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("taskboard.sqlite");
    {
        let store = SqliteStore::open(&path).expect("open");
        assert_eq!(store.migrate().expect("migrate"), SCHEMA_VERSION);
        user(&store, "keep@example.com", Role::User);
    }
    let store = SqliteStore::open(&path).expect("reopen");
    assert_eq!(store.schema_version().expect("version"), SCHEMA_VERSION);
    assert_eq!(store.migrate().expect("migrate again"), SCHEMA_VERSION);
    let email = Email::parse("keep@example.com").expect("email");
    assert!(store.user_by_email(&email).expect("lookup").is_some());
}

#[test]
fn membership_rules() {
    let store = memory_store();
    let owner = user(&store, "owner@example.com", Role::Manager);
    let dev = user(&store, "dev@example.com", Role::User);
    let p = project(&store, owner, "Apollo");

    let member = store
        .add_member(p, dev, ProjectRole::Developer)
        .expect("add member");
    assert_eq!(member.user.email.as_str(), "dev@example.com");
    assert_eq!(member.project_role, ProjectRole::Developer);

    assert!(matches!(
        store.add_member(p, dev, ProjectRole::Tester),
        Err(StoreError::Conflict(_))
    ));
    assert_eq!(
        store.add_member(ProjectId::generate(), dev, ProjectRole::Tester),
        Err(StoreError::NotFound("project"))
    );
    assert_eq!(
        store.add_member(p, UserId::new(999).expect("id"), ProjectRole::Tester),
        Err(StoreError::NotFound("user"))
    );

    let member_projects = store.projects_with_member(dev).expect("member projects");
    assert_eq!(member_projects.len(), 1);
    assert_eq!(member_projects[0].id, p);
    assert!(store.projects_created_by(dev).expect("own").is_empty());

    store.remove_member(p, dev).expect("remove");
    assert_eq!(store.remove_member(p, dev), Err(StoreError::NotFound("member")));
    assert!(store.membership(p, dev).expect("lookup").is_none());
}

#[test]
fn task_lifecycle_and_partial_updates() {
    let store = memory_store();
    let owner = user(&store, "owner@example.com", Role::Manager);
    let dev = user(&store, "dev@example.com", Role::User);
    let p = project(&store, owner, "Apollo");
    let t = task(&store, p, owner, Some(dev));

    let loaded = store.task_by_id(t).expect("load").expect("some");
    assert_eq!(loaded.assigned_to.as_ref().map(|u| u.id), Some(dev));
    assert_eq!(loaded.created_by.as_ref().map(|u| u.id), Some(owner));

    let updated = store
        .update_task(
            t,
            &TaskPatch {
                priority: Some(TaskPriority::High),
                ..TaskPatch::default()
            },
        )
        .expect("update");
    assert_eq!(updated.priority, Some(TaskPriority::High));
    assert_eq!(updated.title, "Write docs");
    assert_eq!(updated.status, Some(TaskStatus::Todo));
    assert_eq!(updated.due_date, loaded.due_date);

    let reviewed = store.set_task_status(t, TaskStatus::ToReview).expect("status");
    assert_eq!(reviewed.status, Some(TaskStatus::ToReview));

    assert_eq!(store.tasks_assigned_to(dev).expect("mine").len(), 1);
    assert_eq!(
        store
            .tasks_in_project_assigned_to(p, owner)
            .expect("owner's")
            .len(),
        0
    );
    assert_eq!(store.tasks_in_project(p).expect("all").len(), 1);

    assert_eq!(
        store.update_task(
            t,
            &TaskPatch {
                assigned_to: Some(UserId::new(404).expect("id")),
                ..TaskPatch::default()
            }
        ),
        Err(StoreError::NotFound("user"))
    );
    store.delete_task(t).expect("delete");
    assert_eq!(store.delete_task(t), Err(StoreError::NotFound("task")));
}

#[test]
fn comments_are_ordered_and_keep_author() {
    let store = memory_store();
    let owner = user(&store, "owner@example.com", Role::Manager);
    let p = project(&store, owner, "Apollo");
    let t = task(&store, p, owner, None);

    store.add_comment(t, owner, "first").expect("first");
    store.add_comment(t, owner, "second").expect("second");
    let comments = store.comments_for_task(t).expect("comments");
    let texts: Vec<_> = comments.iter().map(|c| c.comment.as_str()).collect();
    assert_eq!(texts, ["first", "second"]);
    assert_eq!(
        comments[0].author.as_ref().map(|a| a.email.as_str()),
        Some("owner@example.com")
    );
    assert_eq!(
        store.add_comment(TaskId::new(77).expect("id"), owner, "x"),
        Err(StoreError::NotFound("task"))
    );
}

#[test]
fn deleting_a_project_cascades_to_members_tasks_and_comments() {
    let store = memory_store();
    let owner = user(&store, "owner@example.com", Role::Manager);
    let dev = user(&store, "dev@example.com", Role::User);
    let p = project(&store, owner, "Apollo");
    store.add_member(p, dev, ProjectRole::Developer).expect("member");
    let t = task(&store, p, owner, Some(dev));
    store.add_comment(t, dev, "done?").expect("comment");

    store.delete_project(p).expect("delete");
    assert!(store.project_by_id(p).expect("load").is_none());
    assert!(store.task_by_id(t).expect("load").is_none());
    assert!(store.membership(p, dev).expect("load").is_none());
    assert!(store.comments_for_task(t).expect("load").is_empty());
}

#[test]
fn deleting_a_user_detaches_their_tasks() {
    let store = memory_store();
    let owner = user(&store, "owner@example.com", Role::Manager);
    let dev = user(&store, "dev@example.com", Role::User);
    let p = project(&store, owner, "Apollo");
    let t = task(&store, p, owner, Some(dev));

    store.delete_user(dev).expect("delete user");
    let loaded = store.task_by_id(t).expect("load").expect("task kept");
    assert!(loaded.assigned_to.is_none());
}
