mod common;

use common::{ALICE, BOB, GROUP_GENERAL, GROUP_OTHER_NEWS, GROUP_SCREENSHOTS, MODERATOR};
use tribune_core::repo::event_repo::{EventRepository, SqliteEventRepository};
use tribune_core::repo::poll_repo::{PollRepository, SqlitePollRepository};
use tribune_core::{
    ImageStore, ImageStoreError, NewPoll, PlacedImage, ServiceError, TopicId, TopicService,
};

#[test]
fn add_topic_persists_metadata_and_body() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_GENERAL);

    let request = common::new_topic("first post", "hello world");
    let topic_id = TopicService::new(&mut conn)
        .add_topic(&request, &author, &group, None, None, None, &[])
        .expect("creation should succeed");

    let topic = common::topic(&conn, topic_id);
    assert_eq!(topic.title, "first post");
    assert_eq!(topic.group_id, GROUP_GENERAL);
    assert_eq!(topic.section_id, 1);
    assert_eq!(topic.author_id, ALICE);
    assert!(!topic.deleted);
    assert!(!topic.moderated);
    assert!(topic.commit_by.is_none());
    assert!(topic.commit_at.is_none());

    let body = TopicService::new(&mut conn)
        .topic_body(topic_id)
        .expect("body should exist");
    assert_eq!(body.text, "hello world");
    assert!(body.lorcode);
}

#[test]
fn topic_ids_are_allocated_in_sequence() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_GENERAL);

    let mut service = TopicService::new(&mut conn);
    let first = service
        .add_topic(
            &common::new_topic("one", "a"),
            &author,
            &group,
            None,
            None,
            None,
            &[],
        )
        .unwrap();
    let second = service
        .add_topic(
            &common::new_topic("two", "b"),
            &author,
            &group,
            None,
            None,
            None,
            &[],
        )
        .unwrap();

    assert_eq!(second, first + 1);
}

#[test]
fn image_group_rejects_creation_without_store_and_rolls_back() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_SCREENSHOTS);

    let result = TopicService::new(&mut conn).add_topic(
        &common::new_topic("screenshot", "look"),
        &author,
        &group,
        None,
        None,
        None,
        &[],
    );
    assert!(matches!(result, Err(ServiceError::PrecheckFailed(_))));

    let topics: i64 = conn
        .query_row("SELECT COUNT(*) FROM topics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(topics, 0, "failed creation must leave no rows behind");
    let next_id: i64 = conn
        .query_row("SELECT next_id FROM topic_sequence;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(next_id, 1, "rolled back allocation must not burn the id");
}

struct StubGallery;

impl ImageStore for StubGallery {
    fn place(&self, topic_id: TopicId) -> Result<PlacedImage, ImageStoreError> {
        Ok(PlacedImage {
            url: format!("gallery/{topic_id}.png"),
            link_text: "view image".to_string(),
        })
    }
}

#[test]
fn placed_image_overrides_requested_url_and_link_text() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_SCREENSHOTS);

    let mut request = common::new_topic("screenshot", "look");
    request.url = Some("https://elsewhere.example".to_string());
    request.link_text = Some("ignored".to_string());

    let topic_id = TopicService::new(&mut conn)
        .add_topic(&request, &author, &group, Some(&StubGallery), None, None, &[])
        .expect("creation with image store should succeed");

    let topic = common::topic(&conn, topic_id);
    assert_eq!(topic.url.as_deref(), Some(format!("gallery/{topic_id}.png").as_str()));
    assert_eq!(topic.link_text.as_deref(), Some("view image"));
}

#[test]
fn poll_is_created_with_non_blank_variants_in_order() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_GENERAL);

    let poll = NewPoll {
        variants: vec![
            "vim".to_string(),
            "   ".to_string(),
            "emacs".to_string(),
        ],
        multi_select: false,
    };
    let topic_id = TopicService::new(&mut conn)
        .add_topic(
            &common::new_topic("editors", "which one"),
            &author,
            &group,
            None,
            Some(&poll),
            None,
            &[],
        )
        .unwrap();

    let polls = SqlitePollRepository::new(&conn);
    let stored = polls
        .by_topic_id(topic_id)
        .unwrap()
        .expect("poll should exist");
    assert!(!stored.multi_select);

    let variants = polls.variants_of(stored.id).unwrap();
    let labels: Vec<&str> = variants.iter().map(|v| v.label.as_str()).collect();
    assert_eq!(labels, ["vim", "emacs"]);
    assert!(variants[0].display_order < variants[1].display_order);
}

#[test]
fn poll_request_is_ignored_where_group_forbids_polls() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_OTHER_NEWS);

    let poll = NewPoll {
        variants: vec!["yes".to_string(), "no".to_string()],
        multi_select: false,
    };
    let topic_id = TopicService::new(&mut conn)
        .add_topic(
            &common::new_topic("no polls here", "text"),
            &author,
            &group,
            None,
            Some(&poll),
            None,
            &[],
        )
        .unwrap();

    let polls = SqlitePollRepository::new(&conn);
    assert!(polls.by_topic_id(topic_id).unwrap().is_none());
}

#[test]
fn creation_tags_are_normalized_and_counted() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_GENERAL);

    let tags = vec![
        " Linux ".to_string(),
        "kernel".to_string(),
        "".to_string(),
        "linux".to_string(),
    ];
    let topic_id = TopicService::new(&mut conn)
        .add_topic(
            &common::new_topic("tagged", "text"),
            &author,
            &group,
            None,
            None,
            Some(&tags),
            &[],
        )
        .unwrap();

    let stored = TopicService::new(&mut conn).topic_tags(topic_id).unwrap();
    assert_eq!(stored, ["kernel", "linux"]);
    assert_eq!(common::tag_count(&conn, "linux"), 1);
    assert_eq!(common::tag_count(&conn, "kernel"), 1);
}

#[test]
fn user_refs_produce_notification_events() {
    let mut conn = common::test_db();
    let author = common::user(&conn, ALICE);
    let group = common::group(&conn, GROUP_GENERAL);

    TopicService::new(&mut conn)
        .add_topic(
            &common::new_topic("hey", "@bob and @maxcom, look"),
            &author,
            &group,
            None,
            None,
            None,
            &[BOB, MODERATOR],
        )
        .unwrap();

    let events = SqliteEventRepository::new(&conn);
    assert_eq!(events.count_for_user(BOB).unwrap(), 1);
    assert_eq!(events.count_for_user(MODERATOR).unwrap(), 1);
    assert_eq!(events.count_for_user(ALICE).unwrap(), 0);
}
