use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vagas::db::Database;
use vagas::environment::Config;
use vagas::pipeline::{run_once, RunContext};
use vagas::posting::identity::title_digest;
use vagas::slack::Notifier;
use vagas::Error;

const THREAD_TS: &str = "1749565800.000200";

/// Captures messages instead of talking to Slack. Fails every call once `fail_after`
/// messages went through.
#[derive(Default)]
struct FakeSlack {
    sent: Mutex<Vec<(String, Option<String>)>>,
    fail_after: Option<usize>,
}

#[async_trait]
impl Notifier for FakeSlack {
    async fn post(&self, text: &str, thread: Option<&str>) -> anyhow::Result<Option<String>> {
        let mut sent = self.sent.lock().unwrap();
        if self.fail_after.is_some_and(|n| sent.len() >= n) {
            return Err(anyhow!("webhook returned 500"));
        }
        sent.push((text.to_string(), thread.map(str::to_string)));
        Ok(thread.is_none().then(|| THREAD_TS.to_string()))
    }
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/jobs.rss")
}

fn config(feed_file: &Path, database: &Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("SLACK_WEBHOOK_URL", "https://hooks.slack.invalid/T/B/X".to_string()),
        ("SLACK_BOT_TOKEN", "xoxb-test".to_string()),
        ("FEED_FILE", feed_file.display().to_string()),
        ("DATABASE_PATH", database.display().to_string()),
        ("PACING_DELAY_MS", "0".to_string()),
    ]);
    Config::from_lookup(|key: &str| vars.get(key).cloned()).unwrap()
}

async fn context(dir: &Path, notifier: FakeSlack) -> RunContext<FakeSlack> {
    let config = config(&fixture(), &dir.join("db.sqlite"));
    let db = Database::new(&config.database_path).await.unwrap();
    RunContext {
        db,
        notifier,
        config,
    }
}

#[tokio::test]
async fn first_run_stores_and_announces_then_second_run_is_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path(), FakeSlack::default()).await;

    let summary = run_once(&ctx).await.unwrap();
    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.delivered, 2);

    let java_id = title_digest("Programador Java");
    let sent = ctx.notifier.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![
            (
                "Vagas de trabalho encontradas em *Londrina*. Confira!".to_string(),
                None
            ),
            (
                "*Desenvolvedor PHP* - http://www.indeed.com.br/viewjob?jk=abc123&from=rss"
                    .to_string(),
                Some(THREAD_TS.to_string())
            ),
            (
                "*Programador Java* - http://www.indeed.com.br/rc/clk?t=java".to_string(),
                Some(THREAD_TS.to_string())
            ),
        ]
    );

    let php = ctx.db.find_posting("abc123").await.unwrap().unwrap();
    assert!(php.delivered);
    assert_eq!(php.date, 1_749_565_800);
    assert!(ctx.db.find_posting(&java_id).await.unwrap().unwrap().delivered);
    assert!(ctx.db.find_posting("sell42").await.unwrap().is_none());

    let again = run_once(&ctx).await.unwrap();
    assert_eq!(again.inserted, 0);
    assert_eq!(again.pending, 0);
    assert_eq!(again.delivered, 0);
    assert_eq!(ctx.notifier.sent.lock().unwrap().len(), 3);
    assert_eq!(ctx.db.posting_counts().await.unwrap(), (2, 0));
}

#[tokio::test]
async fn failed_reply_is_retried_on_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let failing = FakeSlack {
        fail_after: Some(2),
        ..Default::default()
    };
    let ctx = context(dir.path(), failing).await;

    let err = run_once(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Notification { .. }));
    assert_eq!(ctx.db.posting_counts().await.unwrap(), (2, 1));
    ctx.db.close().await;

    // Same store, working channel: only the leftover posting goes out.
    let ctx = context(dir.path(), FakeSlack::default()).await;
    let summary = run_once(&ctx).await.unwrap();
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.delivered, 1);

    let sent = ctx.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent[0].0, "Vaga de trabalho encontrada em *Londrina*. Confira!");
    assert!(sent[1].0.starts_with("*Programador Java*"));
}

#[tokio::test]
async fn unreadable_feed_file_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("missing.rss"), &dir.path().join("db.sqlite"));
    let db = Database::new(&config.database_path).await.unwrap();
    let ctx = RunContext {
        db,
        notifier: FakeSlack::default(),
        config,
    };

    let err = run_once(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::FeedsUnavailable(1)));
    assert!(ctx.notifier.sent.lock().unwrap().is_empty());
}
