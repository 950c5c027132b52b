use sqlbench_core::engine::runner::{QueryRunner, MSG_NO_SQL, MSG_SQL_OK};
use sqlbench_core::model::{LogRecord, Query, RunConfig, Severity};
use sqlbench_core::prompt::system_prompt;
use sqlbench_core::providers::llm::fake::{FakeClient, FakeReply};
use sqlbench_core::storage::RunFiles;
use std::sync::Arc;
use std::time::Duration;

fn query(ctx: &str, q: &str, hardness: &str) -> Query {
    Query {
        context: ctx.into(),
        question: q.into(),
        hardness: hardness.into(),
    }
}

fn run_config(dir: &std::path::Path) -> RunConfig {
    RunConfig {
        environment: "anyscale".into(),
        model: "fake-model".into(),
        instruction_size: 5,
        dataset_length: 2,
        target_dir: dir.to_path_buf(),
    }
}

fn runner(client: FakeClient) -> QueryRunner {
    QueryRunner {
        client: Arc::new(client),
        template: system_prompt(5),
        request_timeout: Duration::from_secs(5),
    }
}

fn read_log(files: &RunFiles) -> anyhow::Result<Vec<LogRecord>> {
    std::fs::read_to_string(&files.log)?
        .lines()
        .map(|l| serde_json::from_str::<LogRecord>(l).map_err(anyhow::Error::from))
        .collect()
}

#[tokio::test]
async fn sql_then_apology_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let files = RunFiles::initialize(dir.path())?;
    let client = FakeClient::scripted(
        "fake-model",
        vec![
            FakeReply::Text("select 1".into()),
            FakeReply::Text("I'm sorry, I can't help with that.".into()),
        ],
    );
    let r = runner(client);

    let queries = vec![query("ctx1", "q1", "easy"), query("ctx2", "q2", "hard")];
    let summary = r
        .run_queries(&queries, &files, &run_config(dir.path()))
        .await?;

    assert_eq!(summary.sql, 1);
    assert_eq!(summary.no_sql, 1);
    assert_eq!(summary.errors, 0);

    assert_eq!(
        std::fs::read_to_string(&files.output)?,
        "select 1\n\nI don't know\n\n"
    );

    let metrics = std::fs::read_to_string(&files.metrics)?;
    let lines: Vec<&str> = metrics.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(first.len(), 4);
    assert!(first[0].parse::<f64>()? >= 0.0);
    assert_eq!(first[3], "easy");
    // fake client counts words: "select 1"
    assert_eq!(first[2], "2");
    let second: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(second[0], "0");
    assert_eq!(second[3], "hard");

    let log = read_log(&files)?;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].severity, Severity::Info);
    assert_eq!(log[0].is_sql, 1);
    assert_eq!(log[0].message, MSG_SQL_OK);
    assert_eq!(log[0].sql_response.as_deref(), Some("select 1"));
    assert_eq!(log[1].severity, Severity::Warn);
    assert_eq!(log[1].is_sql, 0);
    assert_eq!(log[1].message, MSG_NO_SQL);
    assert!(log[1].response.is_some());
    Ok(())
}

#[tokio::test]
async fn request_carries_context_in_system_and_question_as_user() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let files = RunFiles::initialize(dir.path())?;
    let client = Arc::new(FakeClient::scripted(
        "fake-model",
        vec![FakeReply::Text("SELECT 1;".into())],
    ));
    let r = QueryRunner {
        client: client.clone(),
        template: "Schema: [context] | Q: [question]".into(),
        request_timeout: Duration::from_secs(5),
    };
    r.run_queries(
        &[query("CREATE TABLE t(a)", "how many?", "easy")],
        &files,
        &run_config(dir.path()),
    )
    .await?;

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 2);
    assert_eq!(calls[0][0].content, "Schema: CREATE TABLE t(a) | Q: ");
    assert_eq!(calls[0][1].content, "how many?");

    let log = read_log(&files)?;
    assert_eq!(log[0].request, calls[0]);
    Ok(())
}

#[tokio::test]
async fn failures_are_absorbed_and_rows_still_emitted() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let files = RunFiles::initialize(dir.path())?;
    let client = FakeClient::scripted(
        "fake-model",
        vec![
            FakeReply::Fail("connection reset".into()),
            FakeReply::Text("SELECT name FROM singer;".into()),
        ],
    );
    let r = runner(client);

    let queries = vec![
        query("c", "q1", "medium"),
        query("c", "q2", "extra"),
        // Script exhausted: fails too.
        query("c", "q3", "easy"),
    ];
    let summary = r
        .run_queries(&queries, &files, &run_config(dir.path()))
        .await?;
    assert_eq!((summary.sql, summary.no_sql, summary.errors), (1, 0, 2));

    let output = std::fs::read_to_string(&files.output)?;
    let blocks: Vec<&str> = output.split_terminator("\n\n").collect();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0], "An error occurred: connection reset");
    assert_eq!(blocks[1], "SELECT name FROM singer;");
    assert!(blocks[2].starts_with("An error occurred: "));

    let metrics = std::fs::read_to_string(&files.metrics)?;
    let lines: Vec<&str> = metrics.lines().collect();
    assert_eq!(lines[0], "0,0,0,medium");
    assert_eq!(lines[2], "0,0,0,easy");

    let log = read_log(&files)?;
    assert_eq!(log[0].severity, Severity::Error);
    assert_eq!(log[0].error.as_deref(), Some("connection reset"));
    Ok(())
}

#[tokio::test]
async fn row_counts_match_query_count() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let files = RunFiles::initialize(dir.path())?;
    let client = FakeClient::from_fn("fake-model", |i, _| match i % 3 {
        0 => FakeReply::Text(format!("SELECT {};", i)),
        1 => FakeReply::Text("no idea".into()),
        _ => FakeReply::Fail("boom".into()),
    });
    let r = runner(client);

    let queries: Vec<Query> = (0..10)
        .map(|i| query("ctx", &format!("q{}", i), "easy"))
        .collect();
    r.run_queries(&queries, &files, &run_config(dir.path()))
        .await?;

    let output = std::fs::read_to_string(&files.output)?;
    assert_eq!(output.split_terminator("\n\n").count(), 10);
    assert!(output.starts_with("SELECT 0;\n\n"));
    assert_eq!(std::fs::read_to_string(&files.metrics)?.lines().count(), 10);
    assert_eq!(read_log(&files)?.len(), 10);
    Ok(())
}

#[tokio::test]
async fn rerun_is_identical_except_timing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let deterministic = |_: usize, msgs: &[sqlbench_core::model::ChatMessage]| {
        if msgs[1].content.contains("count") {
            FakeReply::Text("SELECT count(*) FROM t;".into())
        } else {
            FakeReply::Text("Cannot answer.".into())
        }
    };
    let queries = vec![
        query("CREATE TABLE t(a)", "count rows", "easy"),
        query("CREATE TABLE t(a)", "who is best", "hard"),
    ];

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let files = RunFiles::initialize(&dir.path().join("run"))?;
        let r = runner(FakeClient::from_fn("fake-model", deterministic));
        r.run_queries(&queries, &files, &run_config(dir.path()))
            .await?;
        let output = std::fs::read_to_string(&files.output)?;
        let metrics: Vec<String> = std::fs::read_to_string(&files.metrics)?
            .lines()
            .map(|l| l.split_once(',').map(|(_, rest)| rest.to_string()).unwrap_or_default())
            .collect();
        snapshots.push((output, metrics));
    }
    assert_eq!(snapshots[0], snapshots[1]);
    Ok(())
}

#[tokio::test]
async fn slow_call_times_out_as_error_row() -> anyhow::Result<()> {
    use async_trait::async_trait;
    use sqlbench_core::model::{ChatCompletion, ChatMessage};
    use sqlbench_core::providers::llm::ChatClient;

    struct Hang;

    #[async_trait]
    impl ChatClient for Hang {
        async fn complete(&self, _m: &[ChatMessage]) -> anyhow::Result<ChatCompletion> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            anyhow::bail!("unreachable")
        }
        fn provider_name(&self) -> &'static str {
            "hang"
        }
        fn model(&self) -> &str {
            "hang"
        }
    }

    let dir = tempfile::tempdir()?;
    let files = RunFiles::initialize(dir.path())?;
    let r = QueryRunner {
        client: Arc::new(Hang),
        template: system_prompt(1),
        request_timeout: Duration::from_millis(50),
    };
    let summary = r
        .run_queries(&[query("c", "q", "easy")], &files, &run_config(dir.path()))
        .await?;
    assert_eq!(summary.errors, 1);
    let output = std::fs::read_to_string(&files.output)?;
    assert!(output.starts_with("An error occurred: request timed out"));
    Ok(())
}
