//! Integration tests for the label check pipeline against FakeGitHub.

use labelgate_core::fakes::FakeGitHub;
use labelgate_core::{
    fetch_closed_pulls_since, render_report, run_check, ExitStatus, LabelGateError, LabelPool,
    Paging, PullRequest, Release, Repository,
};
use serde_json::{json, Value};

const RELEASE_CREATED_AT: &str = "2024-05-02T09:30:00Z";

fn repo() -> Repository {
    "kyma-project/kyma-environment-broker".parse().unwrap()
}

fn release_fixture() -> Release {
    serde_json::from_value(json!({
        "id": 1,
        "tag_name": "1.5.0",
        "name": "1.5.0",
        "html_url": "https://github.com/kyma-project/kyma-environment-broker/releases/tag/1.5.0",
        "created_at": RELEASE_CREATED_AT,
        "published_at": "2024-05-02T10:00:00Z"
    }))
    .unwrap()
}

fn pr_json(number: u64, merged_at: Value, updated_at: &str, labels: &[&str]) -> Value {
    json!({
        "number": number,
        "state": "closed",
        "html_url": format!("https://github.com/kyma-project/kyma-environment-broker/pull/{number}"),
        "merged_at": merged_at,
        "updated_at": updated_at,
        "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>()
    })
}

fn pulls_fixture(values: Vec<Value>) -> Vec<PullRequest> {
    serde_json::from_value(Value::Array(values)).unwrap()
}

fn pool() -> LabelPool {
    LabelPool::from_labels(["bug", "feature"])
}

/// Scenario: one valid, one with two pool labels, one with none, one merged
/// before the release, one closed without merging.
fn scenario_pulls() -> Vec<PullRequest> {
    pulls_fixture(vec![
        pr_json(1, json!("2024-05-03T08:00:00Z"), "2024-05-06T08:00:00Z", &["bug"]),
        pr_json(
            2,
            json!("2024-05-03T07:00:00Z"),
            "2024-05-05T08:00:00Z",
            &["bug", "feature"],
        ),
        pr_json(3, json!("2024-05-02T12:00:00Z"), "2024-05-04T08:00:00Z", &["chore"]),
        pr_json(5, Value::Null, "2024-05-03T12:00:00Z", &[]),
        pr_json(4, json!("2024-04-30T08:00:00Z"), "2024-05-01T08:00:00Z", &["bug"]),
    ])
}

#[tokio::test]
async fn test_scenario_valid_invalid_and_excluded() {
    let github = FakeGitHub::new(release_fixture(), scenario_pulls());

    let report = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .expect("check failed");

    let c = &report.classification;
    assert_eq!(c.valid, vec![1]);
    assert_eq!(
        c.invalid
            .iter()
            .map(|p| (p.number, p.html_url.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (
                2,
                "https://github.com/kyma-project/kyma-environment-broker/pull/2"
            ),
            (
                3,
                "https://github.com/kyma-project/kyma-environment-broker/pull/3"
            ),
        ]
    );
    assert_eq!(c.exit_status(), ExitStatus::Failure);
    assert_eq!(c.exit_status().code(), 1);
    assert_eq!(report.fetched, 5);
    assert_eq!(report.considered, 3);
    assert_eq!(report.release.tag_name.as_deref(), Some("1.5.0"));

    let text = render_report(c);
    assert!(text.contains("PR #1\n"));
    assert!(!text.contains("PR #4"));
    assert!(!text.contains("PR #5"));
}

#[tokio::test]
async fn test_all_valid_exits_success() {
    let pulls = pulls_fixture(vec![
        pr_json(10, json!("2024-05-04T08:00:00Z"), "2024-05-04T08:00:00Z", &["feature"]),
        pr_json(11, json!("2024-05-03T08:00:00Z"), "2024-05-03T08:00:00Z", &["bug", "docs"]),
    ]);
    let github = FakeGitHub::new(release_fixture(), pulls);

    let report = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap();

    assert_eq!(report.classification.valid, vec![10, 11]);
    assert!(report.classification.passed());
    assert_eq!(report.classification.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_no_prs_since_release_exits_success() {
    let pulls = pulls_fixture(vec![pr_json(
        1,
        json!(RELEASE_CREATED_AT),
        RELEASE_CREATED_AT,
        &["chore"],
    )]);
    let github = FakeGitHub::new(release_fixture(), pulls);

    let report = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap();

    assert_eq!(report.considered, 0);
    assert_eq!(report.classification.exit_status(), ExitStatus::Success);
}

#[tokio::test]
async fn test_running_twice_gives_same_result() {
    let github = FakeGitHub::new(release_fixture(), scenario_pulls());

    let first = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap();
    let second = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap();

    assert_eq!(first.classification, second.classification);
}

// ---- error propagation ----

#[tokio::test]
async fn test_missing_release_is_fatal() {
    let github = FakeGitHub::without_release();

    let err = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LabelGateError::Api { status: 404, .. }));
    assert!(github.requested_pages().is_empty(), "pulls must not be fetched");
}

#[tokio::test]
async fn test_pulls_api_error_is_fatal() {
    let github = FakeGitHub::new(release_fixture(), scenario_pulls()).with_pulls_status(401);

    let err = run_check(&github, &pool(), &repo(), Paging::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LabelGateError::Api { status: 401, .. }));
}

// ---- pagination ----

/// `count` PRs merged after the release, newest first, one hour apart.
fn recent_pulls(count: u64) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let ts = format!("2024-06-{:02}T{:02}:00:00Z", 28 - i / 24, 23 - i % 24);
            pr_json(100 + i, json!(ts), &ts, &["bug"])
        })
        .collect()
}

#[tokio::test]
async fn test_pagination_reads_until_short_page() {
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(recent_pulls(5)));
    let paging = Paging {
        per_page: 2,
        max_pages: 10,
    };

    let since = release_fixture().created_at;
    let pulls = fetch_closed_pulls_since(&github, &repo(), since, paging)
        .await
        .unwrap();

    assert_eq!(pulls.len(), 5);
    assert_eq!(github.requested_pages(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_pagination_stops_past_release_boundary() {
    let mut values = recent_pulls(3);
    values.push(pr_json(
        50,
        json!("2024-04-01T08:00:00Z"),
        "2024-04-01T08:00:00Z",
        &["bug"],
    ));
    values.extend((0..4).map(|i| {
        pr_json(
            40 - i,
            json!("2024-03-01T08:00:00Z"),
            "2024-03-01T08:00:00Z",
            &[],
        )
    }));
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(values));
    let paging = Paging {
        per_page: 2,
        max_pages: 10,
    };

    let report = run_check(&github, &pool(), &repo(), paging).await.unwrap();

    // page 2 ends with PR #50, updated before the release
    assert_eq!(github.requested_pages(), vec![1, 2]);
    assert_eq!(report.fetched, 4);
    assert_eq!(report.classification.valid, vec![100, 101, 102]);
    assert!(report.classification.passed());
}

#[tokio::test]
async fn test_pagination_limit_before_release_is_fatal() {
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(recent_pulls(10)));
    let paging = Paging {
        per_page: 2,
        max_pages: 3,
    };

    let since = release_fixture().created_at;
    let err = fetch_closed_pulls_since(&github, &repo(), since, paging)
        .await
        .unwrap_err();

    assert!(matches!(err, LabelGateError::PageLimitExceeded { max_pages: 3 }));
    assert_eq!(github.requested_pages(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unlabelled_pr_beyond_page_limit_fails_check() {
    let mut values = recent_pulls(6);
    values.push(pr_json(
        99,
        json!("2024-05-10T08:00:00Z"),
        "2024-05-10T08:00:00Z",
        &[],
    ));
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(values));
    let paging = Paging {
        per_page: 2,
        max_pages: 3,
    };

    let err = run_check(&github, &pool(), &repo(), paging)
        .await
        .unwrap_err();

    assert!(matches!(err, LabelGateError::PageLimitExceeded { .. }));
}

#[tokio::test]
async fn test_page_limit_ending_on_release_boundary_passes() {
    let mut values = recent_pulls(5);
    values.push(pr_json(
        60,
        json!("2024-04-01T08:00:00Z"),
        "2024-04-01T08:00:00Z",
        &[],
    ));
    values.push(pr_json(
        59,
        json!("2024-03-01T08:00:00Z"),
        "2024-03-01T08:00:00Z",
        &[],
    ));
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(values));
    let paging = Paging {
        per_page: 2,
        max_pages: 3,
    };

    let report = run_check(&github, &pool(), &repo(), paging).await.unwrap();

    assert_eq!(github.requested_pages(), vec![1, 2, 3]);
    assert_eq!(report.fetched, 6);
    assert_eq!(report.classification.valid.len(), 5);
    assert!(report.classification.passed());
}

#[tokio::test]
async fn test_pagination_exact_multiple_reads_empty_page() {
    let github = FakeGitHub::new(release_fixture(), pulls_fixture(recent_pulls(4)));
    let paging = Paging {
        per_page: 2,
        max_pages: 10,
    };

    let since = release_fixture().created_at;
    let pulls = fetch_closed_pulls_since(&github, &repo(), since, paging)
        .await
        .unwrap();

    assert_eq!(pulls.len(), 4);
    assert_eq!(github.requested_pages(), vec![1, 2, 3]);
}
