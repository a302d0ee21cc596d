use chrono::Local;
use portico::logging::access::{self, LogEntry};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

fn temp_dir(label: &str) -> PathBuf {
    let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "portico-{}-{}-{}",
        label,
        std::process::id(),
        seq
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn read_all_logs(dir: &PathBuf) -> String {
    let mut out = String::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().map(|e| e == "log").unwrap_or(false) {
            out.push_str(&std::fs::read_to_string(path).unwrap());
        }
    }
    out
}

#[tokio::test]
async fn test_logger_writes_formatted_lines() {
    let dir = temp_dir("log-format");
    let (log, task) = access::start(&dir);

    log.record(LogEntry::new("127.0.0.1", "GET", "/index.html"));
    log.record(LogEntry::new("127.0.0.1", "POST", "/submit").with_body("hello".to_string()));
    log.record(
        LogEntry::new("10.1.2.3", "GET", "/gone.html")
            .with_error("Archivo no encontrado".to_string()),
    );

    drop(log);
    task.await.unwrap();

    let contents = read_all_logs(&dir);
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].ends_with("127.0.0.1 - GET /index.html"));
    assert!(lines[1].ends_with("127.0.0.1 - POST /submit - Body: hello"));
    assert!(lines[2].ends_with("10.1.2.3 - GET /gone.html - Error: Archivo no encontrado"));
}

#[tokio::test]
async fn test_logger_file_named_after_current_date() {
    let dir = temp_dir("log-name");
    let (log, task) = access::start(&dir);

    log.record(LogEntry::new("127.0.0.1", "GET", "/"));

    drop(log);
    task.await.unwrap();

    let expected = dir.join(format!("{}.log", Local::now().format("%Y-%m-%d")));
    assert!(expected.exists());
}

#[tokio::test]
async fn test_logger_drains_queue_on_shutdown() {
    let dir = temp_dir("log-drain");
    let (log, task) = access::start(&dir);

    // Everything queued before the last handle drops must reach the file.
    for i in 0..200 {
        log.record(LogEntry::new("127.0.0.1", "GET", &format!("/page-{i}.html")));
    }

    drop(log);
    task.await.unwrap();

    let contents = read_all_logs(&dir);
    assert_eq!(contents.lines().count(), 200);
    assert!(contents.contains("GET /page-0.html"));
    assert!(contents.contains("GET /page-199.html"));
}

#[tokio::test]
async fn test_logger_concurrent_producers_no_lost_or_torn_lines() {
    let dir = temp_dir("log-concurrent");
    let (log, task) = access::start(&dir);

    let mut producers = Vec::new();
    for producer in 0..10 {
        let log = log.clone();
        producers.push(tokio::spawn(async move {
            for i in 0..50 {
                log.record(LogEntry::new(
                    "127.0.0.1",
                    "GET",
                    &format!("/p{producer}-{i}.html"),
                ));
                tokio::task::yield_now().await;
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    drop(log);
    task.await.unwrap();

    let contents = read_all_logs(&dir);
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 500);
    // Every line is complete: well-formed prefix and exactly one path.
    for line in &lines {
        assert!(line.starts_with('['), "torn line: {line}");
        assert!(line.contains("127.0.0.1 - GET /p"), "torn line: {line}");
    }
    // And nothing was lost.
    for producer in 0..10 {
        for i in 0..50 {
            let needle = format!("GET /p{producer}-{i}.html");
            assert!(contents.contains(&needle), "missing {needle}");
        }
    }
}

#[tokio::test]
async fn test_logger_per_producer_order_preserved() {
    let dir = temp_dir("log-order");
    let (log, task) = access::start(&dir);

    for i in 0..20 {
        log.record(LogEntry::new("127.0.0.1", "GET", &format!("/seq-{i}")));
    }

    drop(log);
    task.await.unwrap();

    let contents = read_all_logs(&dir);
    let positions: Vec<usize> = (0..20)
        .map(|i| contents.find(&format!("/seq-{i}\n")).unwrap())
        .collect();

    // A single producer's entries appear in enqueue order.
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}
