use matics::config::Language;
use matics::session::{RunRequest, Session};

use super::{fixture_source, test_config};

#[tokio::test]
async fn test_history_keeps_every_run() {
    let tmp = tempfile::tempdir().unwrap();
    let mut session = Session::open(test_config(tmp.path())).await.unwrap();

    let requests = [
        (Language::Python, fixture_source("hello.py")),
        (Language::C, fixture_source("compile_error.c")),
        (Language::Java, fixture_source("hello.java")),
    ];

    let mut recorded = Vec::new();
    for (language, source) in &requests {
        let result = session
            .run(RunRequest::batch(*language, source.clone(), ""))
            .await
            .unwrap();
        let at = session.history().latest().unwrap().recorded_at;
        recorded.push((at, source.clone(), result.console_output().to_owned()));
    }

    assert_eq!(session.history().len(), requests.len());
    for (at, source, output) in recorded {
        let entry = session.history().get(&at).unwrap();
        assert_eq!(entry.source, source);
        assert_eq!(entry.output(), output);
    }
}
