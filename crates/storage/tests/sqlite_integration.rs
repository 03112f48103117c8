use chrono::Duration;
use interview_core::model::{
    ActivityAction, Difficulty, JobRole, NewActivity, QuestionCategory, QuestionDraft,
    RoleCategory, RoleDefinition, SessionCategory, SessionDraft, SessionId, SessionInsights,
    SessionStatus, UserId,
};
use interview_core::time::fixed_now;
use storage::query::{
    ActivityFilter, ActivityQuery, SessionFilter, SessionQuery, SessionSort, SessionSortField,
    SortOrder,
};
use storage::repository::{ActivityRepository, RoleRepository, SessionRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn question(text: &str, score: i64, category: QuestionCategory) -> QuestionDraft {
    QuestionDraft {
        question_text: text.into(),
        user_answer: "An answer".into(),
        score,
        feedback: "Feedback".into(),
        category,
        difficulty: Difficulty::Hard,
    }
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_question_order_and_json_columns() {
    let repo = connect("memdb_session_roundtrip").await;

    let mut draft = SessionDraft::new(JobRole::FrontendDeveloper, SessionCategory::Mixed, 45);
    draft.questions = vec![
        question("First", 85, QuestionCategory::Technical),
        question("Second", 75, QuestionCategory::Behavioral),
        question("Third", 90, QuestionCategory::SystemDesign),
    ];
    draft.tags = vec!["react".into(), "hooks".into()];
    let validated = draft.validate(UserId::new(1), fixed_now()).unwrap();

    let mut session = repo.insert_session(validated).await.unwrap();
    assert_eq!(session.total_score(), 83);

    let fetched = repo.get_session(session.id()).await.unwrap().expect("stored");
    let texts: Vec<&str> = fetched.questions().iter().map(|q| q.question_text()).collect();
    assert_eq!(texts, ["First", "Second", "Third"]);
    assert_eq!(fetched.tags(), ["react".to_string(), "hooks".to_string()]);
    assert_eq!(fetched.questions()[2].difficulty(), Difficulty::Hard);

    session.set_status(SessionStatus::Completed);
    session.attach_insights(SessionInsights {
        strengths: vec!["Strong performance in Technical".into()],
        overall_feedback: "Good performance with room for improvement.".into(),
        ..SessionInsights::default()
    });
    session.replace_questions(vec![fetched.questions()[0].clone()]);
    session.touch(fixed_now() + Duration::minutes(5));
    repo.update_session(&session).await.unwrap();

    let updated = repo.get_session(session.id()).await.unwrap().expect("stored");
    assert_eq!(updated.status(), SessionStatus::Completed);
    assert_eq!(updated.questions().len(), 1);
    assert_eq!(updated.insights(), session.insights());
    assert_eq!(updated.updated_at(), fixed_now() + Duration::minutes(5));

    repo.delete_session(session.id()).await.unwrap();
    assert!(repo.get_session(session.id()).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_session(session.id()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_does_not_reuse_deleted_session_ids() {
    let repo = connect("memdb_session_ids").await;
    let new_session = || {
        SessionDraft::new(JobRole::BackendDeveloper, SessionCategory::Technical, 30)
            .validate(UserId::new(1), fixed_now())
            .unwrap()
    };

    let first = repo.insert_session(new_session()).await.unwrap();
    repo.delete_session(first.id()).await.unwrap();
    let second = repo.insert_session(new_session()).await.unwrap();

    assert_ne!(second.id(), first.id());
    assert!(second.id().value() > first.id().value());
}

#[tokio::test]
async fn sqlite_filters_search_sort_and_pages() {
    let repo = connect("memdb_session_query").await;
    let user = UserId::new(7);

    let specs = [
        (JobRole::FrontendDeveloper, 60, vec!["React"], 3),
        (JobRole::BackendDeveloper, 90, vec!["postgres"], 2),
        (JobRole::BackendDeveloper, 40, vec![], 1),
    ];
    for (role, score, tags, hours_ago) in specs {
        let mut draft = SessionDraft::new(role, SessionCategory::Technical, 30);
        draft.total_score = Some(score);
        draft.tags = tags.into_iter().map(String::from).collect();
        let validated = draft
            .validate(user, fixed_now() - Duration::hours(hours_ago))
            .unwrap();
        repo.insert_session(validated).await.unwrap();
    }
    let other = SessionDraft::new(JobRole::BackendDeveloper, SessionCategory::Technical, 30)
        .validate(UserId::new(8), fixed_now())
        .unwrap();
    repo.insert_session(other).await.unwrap();

    let filter = SessionFilter::for_user(user);
    let newest = repo.find_sessions(&SessionQuery::all(filter.clone())).await.unwrap();
    let scores: Vec<u8> = newest.iter().map(|s| s.total_score()).collect();
    assert_eq!(scores, [40, 90, 60]);
    assert_eq!(repo.count_sessions(&filter).await.unwrap(), 3);

    let mut backend = filter.clone();
    backend.role = Some(JobRole::BackendDeveloper);
    assert_eq!(repo.count_sessions(&backend).await.unwrap(), 2);

    let mut search = filter.clone();
    search.search = Some("react".into());
    let found = repo.find_sessions(&SessionQuery::all(search)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].role(), JobRole::FrontendDeveloper);

    let mut search_role = filter.clone();
    search_role.search = Some("backend".into());
    assert_eq!(repo.count_sessions(&search_role).await.unwrap(), 2);

    let paged = repo
        .find_sessions(&SessionQuery {
            filter,
            sort: SessionSort {
                field: SessionSortField::TotalScore,
                order: SortOrder::Desc,
            },
            skip: 1,
            limit: Some(1),
        })
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].total_score(), 60);
}

#[tokio::test]
async fn sqlite_activity_log_filters_and_groups() {
    let repo = connect("memdb_activity").await;
    let user = UserId::new(3);
    let now = fixed_now();

    let entries = [
        (ActivityAction::Created, 10),
        (ActivityAction::Updated, 3),
        (ActivityAction::Updated, 2),
        (ActivityAction::Completed, 1),
    ];
    for (action, days_ago) in entries {
        let activity = NewActivity::new(user, SessionId::new(1), action, now - Duration::days(days_ago))
            .with_detail("role", "Backend Developer");
        repo.append_activity(activity).await.unwrap();
    }
    repo.append_activity(NewActivity::new(
        UserId::new(4),
        SessionId::new(2),
        ActivityAction::Deleted,
        now,
    ))
    .await
    .unwrap();

    let all = ActivityFilter::for_user(user);
    assert_eq!(repo.count_activities(&all).await.unwrap(), 4);
    assert_eq!(
        repo.count_activities(&all.clone().since(now - Duration::days(7)))
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        repo.action_counts(&all).await.unwrap(),
        [
            (ActivityAction::Updated, 2),
            (ActivityAction::Completed, 1),
            (ActivityAction::Created, 1),
        ]
    );

    let page = repo
        .find_activities(&ActivityQuery {
            filter: all,
            skip: 0,
            limit: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].action, ActivityAction::Completed);
    assert_eq!(page[0].details["role"], "Backend Developer");
}

#[tokio::test]
async fn sqlite_role_catalogue_upserts() {
    let repo = connect("memdb_roles").await;

    let mut role = RoleDefinition {
        name: "Backend Developer".into(),
        description: "APIs and data".into(),
        categories: vec![RoleCategory {
            name: "Technical".into(),
            description: None,
            ai_prompt: "Focus on HTTP semantics".into(),
        }],
        is_active: true,
    };
    repo.upsert_role(&role).await.unwrap();
    role.description = "APIs, queues and data".into();
    repo.upsert_role(&role).await.unwrap();

    let retired = RoleDefinition {
        name: "Astronaut".into(),
        description: "Space".into(),
        categories: Vec::new(),
        is_active: false,
    };
    repo.upsert_role(&retired).await.unwrap();

    let fetched = repo.get_role("Backend Developer").await.unwrap().expect("role");
    assert_eq!(fetched, role);
    assert_eq!(repo.list_roles(true).await.unwrap().len(), 1);
    assert_eq!(repo.list_roles(false).await.unwrap().len(), 2);
    assert!(repo.get_role("Nope").await.unwrap().is_none());
}
