use serde_json::json;
use tribune_core::{ScrollMode, Section, Topic};

#[test]
fn scroll_mode_serializes_to_the_database_vocabulary() {
    assert_eq!(serde_json::to_value(ScrollMode::Section).unwrap(), json!("section"));
    assert_eq!(serde_json::to_value(ScrollMode::Group).unwrap(), json!("group"));
    assert_eq!(serde_json::to_value(ScrollMode::NoScroll).unwrap(), json!("no_scroll"));
}

#[test]
fn section_round_trips_through_json() {
    let section = Section {
        id: 2,
        title: "News".to_string(),
        moderated: true,
        scroll_mode: ScrollMode::Section,
    };
    let encoded = serde_json::to_string(&section).unwrap();
    let decoded: Section = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, section);
}

#[test]
fn topic_json_keeps_optional_moderation_fields_null_until_commit() {
    let topic = Topic {
        id: 7,
        group_id: 10,
        section_id: 1,
        author_id: 1,
        title: "draft".to_string(),
        url: None,
        link_text: None,
        created_at: 1_700_000_000_000,
        last_modified_at: 1_700_000_000_000,
        sticky: false,
        minor: false,
        no_top: false,
        moderated: false,
        resolved: false,
        deleted: false,
        post_score: 0,
        commit_by: None,
        commit_at: None,
    };

    let value = serde_json::to_value(&topic).unwrap();
    assert_eq!(value["commit_by"], json!(null));
    assert_eq!(value["commit_at"], json!(null));
    assert_eq!(value["title"], json!("draft"));
}
