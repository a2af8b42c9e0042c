use readstash::application::ImportService;
use readstash::domain::enrichment::{ContentFetcher, EnrichmentOutcome, EntryMetadata};
use readstash::domain::import::{ImportJob, ImportMode, ImportOptions};
use readstash::domain::report::{FailureReason, ImportReport, ImportSummary};
use readstash::infrastructure::queue::MemoryQueue;
use readstash::util::test_context::{TestContext, TEST_USER};
use readstash::util::testing::init_test_env;
use rstest::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const HEADER: &str = "URL,Title,Selection,Folder,Timestamp,Tags\n";

fn export_fixture() -> String {
    fs::read_to_string(init_test_env().resource("instapaper-export.csv")).unwrap()
}

fn summary(report: &ImportReport) -> &ImportSummary {
    report
        .summary()
        .unwrap_or_else(|| panic!("Expected summary, got {:?}", report))
}

/// Fetcher that records calls and returns fixed metadata
#[derive(Debug, Default)]
struct RecordingFetcher {
    calls: AtomicUsize,
}

impl ContentFetcher for RecordingFetcher {
    fn fetch(&self, _url: &str) -> EnrichmentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        EnrichmentOutcome::from_metadata(EntryMetadata {
            title: Some("From the web".to_string()),
            mimetype: Some("text/html".to_string()),
            preview_picture: None,
            language: Some("en".to_string()),
        })
    }
}

#[test]
fn given_valid_file_when_imported_inline_then_every_record_imported() {
    let ctx = TestContext::new();
    let report = ctx.service.import(ctx.request(Some(&export_fixture())));

    let s = summary(&report);
    assert_eq!((s.imported, s.skipped, s.failed, s.queued), (4, 0, 0, 0));
    assert_eq!(s.mode, ImportMode::Inline);
    assert_eq!(ctx.entries().len(), 4);
    assert_eq!(report.notice_key(), "import.notice.summary");
}

#[test]
fn given_same_file_when_imported_twice_then_no_duplicates_and_tags_stable() {
    let ctx = TestContext::new();
    let content = export_fixture();

    ctx.service.import(ctx.request(Some(&content)));
    let tags_before: Vec<String> = ctx.entries().iter().map(|e| e.formatted_tags()).collect();

    let report = ctx.service.import(ctx.request(Some(&content)));
    let s = summary(&report);
    assert_eq!((s.imported, s.skipped), (0, 4));

    let tags_after: Vec<String> = ctx.entries().iter().map(|e| e.formatted_tags()).collect();
    assert_eq!(tags_before, tags_after);
    assert_eq!(ctx.entries().len(), 4);
}

#[test]
fn given_reimport_with_new_tags_when_imported_then_tags_only_grow() {
    let ctx = TestContext::new();
    let url = "https://example.com/a";

    ctx.service.import(ctx.request(Some(&format!("{}{},A,,,,\"x, y\"\n", HEADER, url))));
    ctx.service.import(ctx.request(Some(&format!("{}{},A,,,,z\n", HEADER, url))));

    assert_eq!(ctx.entry(url).unwrap().formatted_tags(), "x,y,z");
}

#[rstest]
#[case(ImportMode::Inline)]
#[case(ImportMode::Redis)]
#[case(ImportMode::Amqp)]
fn given_invalid_or_empty_file_when_imported_then_failure_in_every_mode(#[case] mode: ImportMode) {
    let ctx = TestContext::new();
    ctx.set_mode(mode);

    let inputs: [&[u8]; 5] = [
        b"",
        b"   \n",
        HEADER.as_bytes(),
        b"this is not an export\njust some text\n",
        &[0xff, 0xfe, 0xfd],
    ];
    for content in inputs {
        let report = ctx.service.import(readstash::application::ImportRequest {
            content: Some(content.to_vec()),
            ..ctx.request(None)
        });
        assert!(!report.is_success(), "{:?} in {} mode", content, mode);
        assert_eq!(report.notice_key(), "import.notice.failed");
    }

    assert!(ctx.entries().is_empty());
    assert!(ctx.redis.is_empty());
    assert!(ctx.amqp.is_empty());
}

#[test]
fn given_only_broken_rows_when_imported_then_empty_file_failure() {
    let ctx = TestContext::new();
    let report = ctx
        .service
        .import(ctx.request(Some(&format!("{}not a url,,,,,\nftp://x.org/,,,,,\n", HEADER))));

    assert_eq!(report, ImportReport::Failed(FailureReason::EmptyFile));
}

#[test]
fn given_broken_rows_among_valid_when_imported_then_counted_failed() {
    let ctx = TestContext::new();
    let content = format!(
        "{}https://example.com/a,,,,,\nnot a url,,,,,\nhttps://example.com/b,,,,never,\n",
        HEADER
    );

    let report = ctx.service.import(ctx.request(Some(&content)));
    let s = summary(&report);
    assert_eq!((s.imported, s.failed), (1, 2));
}

#[test]
fn given_mark_as_read_when_imported_then_created_and_matched_entries_archived() {
    let ctx = TestContext::new();
    let existing = format!("{}https://example.com/old,Old,,Unread,,\n", HEADER);
    ctx.service.import(ctx.request(Some(&existing)));
    assert!(!ctx.entry("https://example.com/old").unwrap().is_archived);

    let content = format!(
        "{}https://example.com/old,Old,,Unread,,\nhttps://example.com/new,New,,Unread,,\n",
        HEADER
    );
    let options = ImportOptions {
        mark_as_read: true,
        disable_content_update: false,
    };
    ctx.service.import(ctx.request_with(Some(&content), options));

    assert!(ctx.entries().iter().all(|e| e.is_archived));
}

#[test]
fn given_no_mark_as_read_when_imported_then_archived_follows_read_flag() {
    let ctx = TestContext::new();
    ctx.service.import(ctx.request(Some(&export_fixture())));

    for entry in ctx.entries() {
        let expected = !entry.url.contains("liberation") && !entry.url.contains("reading-list");
        assert_eq!(entry.is_archived, expected, "{}", entry.url);
    }
}

#[rstest]
#[case(ImportMode::Redis)]
#[case(ImportMode::Amqp)]
fn given_queue_mode_when_imported_then_jobs_queued_without_inline_work(#[case] mode: ImportMode) {
    let fetcher = Arc::new(RecordingFetcher::default());
    let ctx = TestContext::with_fetcher(fetcher.clone());
    ctx.set_mode(mode);

    let report = ctx.service.import(ctx.request(Some(&export_fixture())));

    let s = summary(&report);
    assert_eq!((s.imported, s.queued, s.failed), (4, 4, 0));
    assert_eq!(report.notice_key(), "import.notice.summary_with_queue");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    assert!(ctx.entries().is_empty());

    let (target, other) = match mode {
        ImportMode::Redis => (&ctx.redis, &ctx.amqp),
        _ => (&ctx.amqp, &ctx.redis),
    };
    assert_eq!(target.len(), 4);
    assert!(other.is_empty());

    let (queue, payload) = target.pop().unwrap();
    assert_eq!(queue, "import.instapaper");
    let job = ImportJob::from_payload(payload.as_bytes()).unwrap();
    assert_eq!(job.user_id, TEST_USER);
    assert!(job.record.url.contains("liberation.fr"));
}

#[test]
fn given_queued_jobs_when_consumed_then_same_result_as_inline() {
    let fetcher = Arc::new(RecordingFetcher::default());
    let ctx = TestContext::with_fetcher(fetcher.clone());
    ctx.set_mode(ImportMode::Amqp);
    ctx.service.import(ctx.request(Some(&export_fixture())));

    while let Some((_, payload)) = ctx.amqp.pop() {
        ctx.service.process_job(payload.as_bytes()).unwrap();
    }

    let entries = ctx.entries();
    assert_eq!(entries.len(), 4);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
    let untitled = ctx.entry("https://example.com/reading-list").unwrap();
    assert_eq!(untitled.title, "From the web");
    assert_eq!(untitled.language.as_deref(), Some("en"));
}

#[test]
fn given_unavailable_queue_when_imported_then_records_failed_and_run_continues() {
    let ctx = TestContext::with(
        Arc::new(readstash::domain::enrichment::NoopFetcher),
        MemoryQueue::unavailable("import"),
        MemoryQueue::new("import"),
    );
    ctx.set_mode(ImportMode::Redis);

    let report = ctx.service.import(ctx.request(Some(&export_fixture())));

    let s = summary(&report);
    assert_eq!((s.imported, s.queued, s.failed), (0, 0, 4));
    assert!(ctx.entries().is_empty());
}

#[test]
fn given_same_file_when_mode_switched_then_classification_unchanged() {
    let content = export_fixture();
    let broken = format!("{}not a url,,,,,\n", HEADER);

    for mode in [ImportMode::Inline, ImportMode::Redis, ImportMode::Amqp] {
        let ctx = TestContext::new();
        ctx.set_mode(mode);
        assert!(ctx.service.import(ctx.request(Some(&content))).is_success(), "{}", mode);
        assert!(!ctx.service.import(ctx.request(Some(&broken))).is_success(), "{}", mode);
        assert!(!ctx.service.import(ctx.request(None)).is_success(), "{}", mode);
    }
}

#[test]
fn given_two_existing_and_one_new_when_imported_then_one_imported_two_skipped() {
    let ctx = TestContext::new();
    ctx.service.import(ctx.request(Some(&format!(
        "{}https://example.com/1,,,,,\nhttps://example.com/2,,,,,\n",
        HEADER
    ))));
    let before = ctx.entries().len();

    let report = ctx.service.import(ctx.request(Some(&format!(
        "{}https://example.com/1,,,,,\nhttps://example.com/2,,,,,\nhttps://example.com/3,,,,,\n",
        HEADER
    ))));

    let s = summary(&report);
    assert_eq!((s.imported, s.skipped, s.failed), (1, 2, 0));
    assert_eq!(ctx.entries().len(), before + 1);
}

#[test]
fn given_urls_differing_only_in_host_case_when_imported_then_one_entry() {
    let ctx = TestContext::new();
    let report = ctx.service.import(ctx.request(Some(&format!(
        "{}https://Example.COM/x,,,,,\n  https://example.com/x ,,,,,\n",
        HEADER
    ))));

    let s = summary(&report);
    assert_eq!((s.imported, s.skipped), (1, 1));
}

#[test]
fn given_stored_mode_when_changed_mid_session_then_next_run_uses_it() {
    let ctx = TestContext::new();
    let content = format!("{}https://example.com/a,,,,,\n", HEADER);

    let first = ctx.service.import(ctx.request(Some(&content)));
    assert_eq!(summary(&first).mode, ImportMode::Inline);

    ctx.set_mode(ImportMode::Redis);
    let second = ctx.service.import(ctx.request(Some(&content)));
    assert_eq!(summary(&second).mode, ImportMode::Redis);
    assert_eq!(ctx.redis.len(), 1);
}

#[test]
fn given_overlapping_files_imported_concurrently_then_one_entry_per_url_with_all_tags() {
    let ctx = TestContext::new();
    let requests: Vec<_> = (0..6)
        .map(|run| {
            let rows: String = (0..5)
                .map(|n| format!("https://example.com/{},,,,,run{}\n", n, run))
                .collect();
            ctx.request(Some(&format!("{}{}", HEADER, rows)))
        })
        .collect();

    let reports: Vec<ImportReport> = std::thread::scope(|scope| {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| scope.spawn(|| ctx.service.import(request)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let imported: usize = reports.iter().map(|r| summary(r).imported).sum();
    let failed: usize = reports.iter().map(|r| summary(r).failed).sum();
    assert_eq!((imported, failed), (5, 0));

    let entries = ctx.entries();
    assert_eq!(entries.len(), 5);
    for entry in entries {
        assert_eq!(entry.formatted_tags(), "run0,run1,run2,run3,run4,run5", "{}", entry.url);
    }
}
