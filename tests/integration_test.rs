//! Integration tests for GitInsights
//!
//! Dashboard scenarios run against the in-memory transport; the HTTP
//! transport is exercised against a local axum server.

use gitinsights::config::{InsightsConfig, PrivateScope};
use gitinsights::github::{HttpTransport, MockTransport, Target, Transport, GITHUB_MEDIA_TYPE};
use gitinsights::{AggregatorConfig, ErrorKind, Insights, InsightsError, RepoSource};
use serde_json::{json, Value};
use std::sync::Arc;

const LOGIN: &str = "octocat";

fn user() -> Value {
    json!({
        "login": LOGIN,
        "location": "Lisbon",
        "avatar_url": "https://avatars.example.com/u/583231",
        "created_at": "2011-01-25T18:44:36Z"
    })
}

fn repo(full_name: &str, owner: &str, fork: bool, private: bool, stars: u64, created: &str) -> Value {
    json!({
        "full_name": full_name,
        "owner": {"login": owner},
        "fork": fork,
        "private": private,
        "stargazers_count": stars,
        "created_at": created
    })
}

fn commit(sha: &str, url: &str, author: Option<&str>, date: &str) -> Value {
    json!({
        "sha": sha,
        "url": url,
        "commit": {
            "author": {"name": "Mona", "email": "mona@example.com", "date": date},
            "committer": {"name": "Mona", "email": "mona@example.com", "date": date},
            "message": "work"
        },
        "author": author.map(|login| json!({"login": login}))
    })
}

fn insights_with(mock: MockTransport, agg_config: AggregatorConfig) -> (Arc<MockTransport>, Insights) {
    let mock = Arc::new(mock);
    let insights = Insights::new(mock.clone(), agg_config);
    (mock, insights)
}

mod dashboard_scenarios {
    use super::*;

    /// Two public repositories (one owned with 3 stars, one fork owned by
    /// another account with no stars) and one owned private repository
    /// with 5 stars.
    fn repository_mock() -> MockTransport {
        MockTransport::new()
            .with_json("/user", user())
            .with_json(
                "/users/octocat/repos",
                json!([
                    repo("octocat/hello", LOGIN, false, false, 3, "2016-02-01T00:00:00Z"),
                    repo("upstream/tool", "upstream", true, false, 0, "2017-03-01T00:00:00Z"),
                ]),
            )
            .with_json(
                "/user/repos",
                json!([repo("octocat/secret", LOGIN, false, true, 5, "2018-04-01T00:00:00Z")]),
            )
    }

    #[tokio::test]
    async fn test_repository_counts() {
        let (_, insights) = insights_with(repository_mock(), AggregatorConfig::default());

        assert_eq!(insights.user_count_stars_repositories().await.unwrap(), 8);
        assert_eq!(insights.user_count_forked_repositories().await.unwrap(), 1);
        assert_eq!(insights.user_count_created_repositories().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_personal_repos_is_owned_subset() {
        let (_, insights) = insights_with(repository_mock(), AggregatorConfig::default());

        let all = insights.repos(RepoSource::Public).await.unwrap();
        let personal = insights.personal_repos(RepoSource::Public).await.unwrap();

        assert!(personal.len() <= all.len());
        for repo in &personal {
            assert_eq!(repo.owner.login, LOGIN);
            assert!(all.iter().any(|r| r.full_name == repo.full_name));
        }
    }

    #[tokio::test]
    async fn test_issue_counts_by_state() {
        let mock = MockTransport::new().with_json(
            "/user/issues",
            json!([
                {"state": "open"},
                {"state": "closed"},
                {"state": "open"}
            ]),
        );
        let (mock, insights) = insights_with(mock, AggregatorConfig::default());

        assert_eq!(insights.user_opened_issues().await.unwrap(), 2);
        assert_eq!(insights.user_closed_issues().await.unwrap(), 1);
        assert_eq!(mock.request_count("/user/issues"), 2);
    }

    #[tokio::test]
    async fn test_first_date_takes_older_source() {
        let mock = MockTransport::new()
            .with_json("/user", user())
            .with_json(
                "/users/octocat/repos",
                json!([
                    repo("octocat/b", LOGIN, false, false, 0, "2021-01-01T00:00:00Z"),
                    repo("octocat/a", LOGIN, false, false, 0, "2020-01-01T00:00:00Z"),
                ]),
            )
            .with_json(
                "/user/repos",
                json!([
                    repo("octocat/p", LOGIN, false, true, 0, "2019-06-15T00:00:00Z"),
                    repo("someone/old", "someone", false, true, 0, "2010-01-01T00:00:00Z"),
                ]),
            );
        let (_, insights) = insights_with(mock, AggregatorConfig::default());

        let date = insights.user_first_repository_date().await.unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2019-06-15");
    }

    #[tokio::test]
    async fn test_commit_count_matches_personal_commit_lists() {
        let url = "https://api.github.com/repos/octocat/hello/commits";
        let mock = MockTransport::new()
            .with_json("/user", user())
            .with_json(
                "/users/octocat/repos",
                json!([repo("octocat/hello", LOGIN, false, false, 0, "2016-02-01T00:00:00Z")]),
            )
            .with_json(
                "/user/repos",
                json!([repo("octocat/secret", LOGIN, false, true, 0, "2018-04-01T00:00:00Z")]),
            )
            .with_json(
                "/repos/octocat/hello/commits",
                json!([
                    commit("a1", &format!("{}/a1", url), Some(LOGIN), "2020-01-01T00:00:00Z"),
                    commit("a2", &format!("{}/a2", url), None, "2020-01-02T00:00:00Z"),
                ]),
            )
            .with_json(
                "/repos/octocat/secret/commits",
                json!([
                    commit("b1", &format!("{}/b1", url), Some(LOGIN), "2020-02-01T00:00:00Z"),
                    commit("b2", &format!("{}/b2", url), Some(LOGIN), "2020-02-02T00:00:00Z"),
                    commit("b3", &format!("{}/b3", url), Some("hubot"), "2020-02-03T00:00:00Z"),
                ]),
            );
        let (_, insights) = insights_with(mock, AggregatorConfig::default());

        let public = insights
            .repos_personal_commits(RepoSource::Public)
            .await
            .unwrap();
        let private = insights
            .repos_personal_commits(RepoSource::Private)
            .await
            .unwrap();
        for commit in public.iter().chain(private.iter()) {
            assert_eq!(commit.author_login(), Some(LOGIN));
        }

        let total = insights.user_count_commits().await.unwrap();
        assert_eq!(total, public.len() + private.len());
        assert_eq!(total, 3);

        let first = insights.user_first_commit_date().await.unwrap();
        assert_eq!(first.format("%Y-%m-%d").to_string(), "2020-01-01");
    }

    #[tokio::test]
    async fn test_missing_repository_fails_whole_source() {
        let mock = MockTransport::new()
            .with_json("/user", user())
            .with_json(
                "/users/octocat/repos",
                json!([
                    repo("octocat/hello", LOGIN, false, false, 0, "2016-02-01T00:00:00Z"),
                    repo("octocat/deleted", LOGIN, false, false, 0, "2016-02-01T00:00:00Z"),
                ]),
            )
            .with_json("/repos/octocat/hello/commits", json!([]))
            .with_status(
                "/repos/octocat/deleted/commits",
                404,
                json!({"message": "Not Found"}),
            );
        let (_, insights) = insights_with(mock, AggregatorConfig::default());

        let err = insights
            .repos_personal_commits(RepoSource::Public)
            .await
            .unwrap_err();
        match err {
            InsightsError::RemoteRequest { status, ref body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body["message"], "Not Found");
            }
            other => panic!("expected RemoteRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_auth_error() {
        let mock = MockTransport::new().with_status(
            "/user",
            401,
            json!({"message": "Bad credentials"}),
        );
        let (_, insights) = insights_with(mock, AggregatorConfig::default());

        let err = insights.user_count_created_repositories().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_summary_placeholders_for_empty_dates() {
        let mock = MockTransport::new()
            .with_json("/user", user())
            .with_json("/users/octocat/repos", json!([]))
            .with_json("/user/repos", json!([]))
            .with_json("/user/issues", json!([{"number": 9, "state": "closed"}]));
        let (_, insights) = insights_with(mock, AggregatorConfig::default());

        let summary = insights.summary().await.unwrap();
        assert_eq!(summary.login, LOGIN);
        assert_eq!(summary.first_repository_date, None);
        assert_eq!(summary.first_commit_date, None);
        assert_eq!(summary.closed_issues, 1);
        assert_eq!(summary.opened_issues, 0);
        assert_eq!(summary.commits, 0);
        assert_eq!(summary.coded_lines, 0);
        assert_eq!(summary.stars, 0);
    }
}

mod private_scope {
    use super::*;

    /// `/user/repos` returning public and private repositories together
    fn overlapping_mock() -> MockTransport {
        MockTransport::new()
            .with_json("/user", user())
            .with_json(
                "/users/octocat/repos",
                json!([repo("octocat/hello", LOGIN, false, false, 3, "2016-02-01T00:00:00Z")]),
            )
            .with_json(
                "/user/repos",
                json!([
                    repo("octocat/hello", LOGIN, false, false, 3, "2016-02-01T00:00:00Z"),
                    repo("octocat/secret", LOGIN, false, true, 5, "2018-04-01T00:00:00Z"),
                ]),
            )
    }

    #[tokio::test]
    async fn test_all_visible_counts_public_twice() {
        let (_, insights) = insights_with(overlapping_mock(), AggregatorConfig::default());
        assert_eq!(insights.user_count_stars_repositories().await.unwrap(), 11);
        assert_eq!(insights.user_count_created_repositories().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_private_only_keeps_sources_disjoint() {
        let agg_config = AggregatorConfig::from(
            &InsightsConfig::new().with_private_scope(PrivateScope::PrivateOnly),
        );
        let (_, insights) = insights_with(overlapping_mock(), agg_config);

        assert_eq!(insights.user_count_stars_repositories().await.unwrap(), 8);
        assert_eq!(insights.user_count_created_repositories().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_languages_list_every_visible_repo() {
        let mock = overlapping_mock()
            .with_json("/repos/octocat/hello/languages", json!({"Rust": 1200}))
            .with_json(
                "/repos/octocat/secret/languages",
                json!({"Rust": 300, "Python": 40}),
            );
        let agg_config = AggregatorConfig::from(
            &InsightsConfig::new().with_private_scope(PrivateScope::PrivateOnly),
        );
        let (_, insights) = insights_with(mock, agg_config);

        let languages = insights.user_languages().await.unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0]["Rust"], 1200);
        assert_eq!(languages[1]["Python"], 40);
    }
}

mod http_transport {
    use super::*;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    const TOKEN: &str = "gho_test_token";

    fn authorized(headers: &HeaderMap) -> bool {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
        auth == Some(&format!("token {}", TOKEN)[..]) && accept == Some(GITHUB_MEDIA_TYPE)
    }

    async fn spawn_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let router = Router::new()
            .route(
                "/user",
                get(|headers: HeaderMap| async move {
                    if authorized(&headers) {
                        (StatusCode::OK, Json(user()))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"message": "Bad credentials"})),
                        )
                    }
                }),
            )
            .route(
                "/users/octocat/repos",
                get(|| async {
                    Json(json!([repo("octocat/hello", LOGIN, false, false, 3, "2016-02-01T00:00:00Z")]))
                }),
            )
            .route(
                "/user/repos",
                get(|| async {
                    Json(json!([repo("octocat/secret", LOGIN, false, true, 5, "2018-04-01T00:00:00Z")]))
                }),
            )
            .route(
                "/repos/octocat/hello/commits",
                get(|State(base): State<String>| async move {
                    let url = format!("{}/repos/octocat/hello/commits/c1", base);
                    Json(json!([commit("c1", &url, Some(LOGIN), "2020-01-01T00:00:00Z")]))
                }),
            )
            .route(
                "/repos/octocat/hello/commits/c1",
                get(|| async {
                    Json(json!({"sha": "c1", "stats": {"additions": 42, "deletions": 2, "total": 44}}))
                }),
            )
            .route("/repos/octocat/secret/commits", get(|| async { Json(json!([])) }))
            .route(
                "/broken",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
            )
            .with_state(base_url.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        base_url
    }

    fn transport(base_url: &str, token: &str) -> HttpTransport {
        let config = InsightsConfig::new().with_api_url(base_url);
        HttpTransport::new(&config, token).unwrap()
    }

    #[tokio::test]
    async fn test_sends_token_and_media_type() {
        let base_url = spawn_server().await;
        let transport = transport(&base_url, TOKEN);

        let body = transport.request(&Target::path("/user")).await.unwrap();
        assert_eq!(body["login"], LOGIN);
    }

    #[tokio::test]
    async fn test_bad_token_is_auth_error_with_body() {
        let base_url = spawn_server().await;
        let transport = transport(&base_url, "wrong");

        let err = transport.request(&Target::path("/user")).await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body().unwrap()["message"], "Bad credentials");
        match err {
            InsightsError::Auth { url, .. } => assert_eq!(url, format!("{}/user", base_url)),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_decodes_to_null() {
        let base_url = spawn_server().await;
        let transport = transport(&base_url, TOKEN);

        let err = transport.request(&Target::path("/broken")).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.body(), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_coded_lines_over_http() {
        let base_url = spawn_server().await;
        let insights = Insights::with_defaults(Arc::new(transport(&base_url, TOKEN)));

        assert_eq!(insights.user_count_coded_lines().await.unwrap(), 42);
        assert_eq!(insights.user_count_stars_repositories().await.unwrap(), 8);
    }
}
