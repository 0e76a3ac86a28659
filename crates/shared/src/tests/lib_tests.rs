use crate::{
    domain::{ArticleId, AuthContext, Role},
    error::ErrorCode,
    protocol::{format_display_date, Article, PutArticleResponse, RoleChangeForm},
};

#[test]
fn parses_structured_article_representation() {
    let raw = r##"{
        "_id": "a1",
        "_rev": "r1",
        "Type": "Article",
        "Date": "2013-04-02T15:04:05-07:00",
        "Title": "Hello",
        "Author": "alice@x.com",
        "Markdown": "# hi",
        "Public": false,
        "History": null
    }"##;

    let article: Article = serde_json::from_str(raw).expect("article");
    assert_eq!(article.id, ArticleId::from("a1"));
    assert_eq!(article.rev.as_str(), "r1");
    assert_eq!(article.title, "Hello");
    assert_eq!(article.markdown, "# hi");
    assert!(!article.public);
    assert!(article.history.is_empty());
}

#[test]
fn unwritten_article_has_empty_revision() {
    let raw = r#"{"_id":"new-page","Title":"new-page","Markdown":"","Public":false,"History":[]}"#;
    let article: Article = serde_json::from_str(raw).expect("article");
    assert!(article.rev.is_unwritten());
    assert_eq!(article.to_update().rev.as_str(), "");
}

#[test]
fn created_date_prefers_first_history_entry() {
    let raw = r#"{
        "_id": "a1", "_rev": "r3", "Title": "t", "Markdown": "m",
        "Date": "2014-01-05T09:30:00Z",
        "History": [
            {"Date": "2013-12-24T18:07:00Z", "Title": "t0", "Author": "a", "HistoryBodyID": "h0"},
            {"Date": "2014-01-01T00:00:00Z", "Title": "t1", "Author": "a", "HistoryBodyID": "h1"}
        ]
    }"#;
    let article: Article = serde_json::from_str(raw).expect("article");

    let created = article.created_at().expect("created");
    let modified = article.modified_at().expect("modified");
    assert_eq!(format_display_date(&created), "Dec 24, 2013 at 6:07 PM");
    assert_eq!(format_display_date(&modified), "Jan 5, 2014 at 9:30 AM");
}

#[test]
fn article_paths_follow_server_rules() {
    assert_eq!(ArticleId::from_path("/").expect("root").as_str(), "index");
    assert_eq!(
        ArticleId::from_path("/release-2").expect("path").as_str(),
        "release-2"
    );
    assert!(ArticleId::from_path("/Upper").is_err());
    assert!(ArticleId::from_path("no-slash").is_err());
    assert_eq!(ArticleId::from("index").resource_path(), "/");
    assert_eq!(ArticleId::from("notes").resource_path(), "/notes");
}

#[test]
fn conflict_response_decodes_without_revision() {
    let response: PutArticleResponse =
        serde_json::from_str(r#"{"conflict":true}"#).expect("response");
    assert!(response.conflict);
    assert!(!response.ok);
    assert!(response.rev.is_none());
}

#[test]
fn role_capabilities_match_server_mapping() {
    assert!(Role::Admin.capabilities().admin);
    assert!(Role::Write.capabilities().write);
    assert!(!Role::Write.capabilities().admin);
    assert!(Role::Read.capabilities().read);
    assert!(!Role::Pending.capabilities().read);
    assert_eq!("write".parse::<Role>().expect("role"), Role::Write);
    assert_eq!(
        "owner".parse::<Role>().expect_err("unknown").code,
        ErrorCode::Validation
    );
}

#[test]
fn role_form_uses_wire_names() {
    let form = RoleChangeForm {
        email: "bob@x.com".into(),
        role: Role::Write,
    };
    let json = serde_json::to_value(&form).expect("json");
    assert_eq!(json["Email"], "bob@x.com");
    assert_eq!(json["Role"], "Write");
}

#[test]
fn visibility_control_hidden_for_index_and_anonymous() {
    let auth = AuthContext::signed_in("alice@x.com", Role::Write);
    assert!(auth.shows_visibility_for(&ArticleId::from("notes")));
    assert!(!auth.shows_visibility_for(&ArticleId::from("index")));
    assert!(!AuthContext::anonymous().shows_visibility_for(&ArticleId::from("notes")));
}
