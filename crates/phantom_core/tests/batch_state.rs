use phantom_core::{
    parse_target_list, sample_targets, sampling::DEFAULT_SAMPLE_SIZE, BatchState, JobExit, JobRecord,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn record(job_id: u64, target: &str, exit: JobExit) -> JobRecord {
    JobRecord {
        job_id,
        target: target.to_string(),
        exit,
    }
}

#[test]
fn start_order_assigns_sequential_ids() {
    init_logging();
    let mut batch = BatchState::new(["a.example", "b.example"]);

    assert_eq!(batch.start_next(), Some((1, "a.example".to_string())));
    assert_eq!(batch.start_next(), Some((2, "b.example".to_string())));
    assert_eq!(batch.start_next(), None);
    assert_eq!(batch.started(), vec![1, 2]);
    assert!(!batch.has_queued());
}

#[test]
fn batch_is_done_when_every_target_completes() {
    init_logging();
    let mut batch = BatchState::new(["a", "b"]);
    let (a, _) = batch.start_next().unwrap();
    let (b, _) = batch.start_next().unwrap();

    assert!(batch.record(record(b, "b", JobExit::Success)));
    assert!(!batch.is_done());
    assert!(batch.record(record(a, "a", JobExit::Success)));
    assert!(batch.is_done());

    let snapshot = batch.snapshot();
    assert!(snapshot.is_done());
    assert_eq!(snapshot.completed_targets(), vec!["b", "a"]);
    assert_eq!(snapshot.exit_code(), 0);
}

#[test]
fn duplicate_and_unknown_records_are_rejected() {
    init_logging();
    let mut batch = BatchState::new(["a", "b"]);
    let (a, _) = batch.start_next().unwrap();

    assert!(batch.record(record(a, "a", JobExit::Success)));
    assert!(!batch.record(record(a, "a", JobExit::Timeout)));
    assert!(!batch.record(record(99, "zz", JobExit::Success)));

    assert_eq!(batch.completed().len(), 1);
    assert!(batch.completed().len() <= batch.started().len());
    assert!(batch.started().len() <= batch.total());
}

#[test]
fn exit_code_is_first_failure_in_completion_order() {
    init_logging();
    let mut batch = BatchState::new(["a", "b", "c"]);
    let ids: Vec<_> = std::iter::from_fn(|| batch.start_next()).map(|(id, _)| id).collect();

    batch.record(record(ids[0], "a", JobExit::Success));
    batch.record(record(ids[2], "c", JobExit::Timeout));
    batch.record(record(ids[1], "b", JobExit::PrintFailed));

    assert_eq!(batch.exit_code(), 1);
}

#[test]
fn empty_batch_is_immediately_done() {
    let batch = BatchState::new(Vec::<String>::new());
    assert!(batch.is_done());
    assert_eq!(batch.exit_code(), 0);
}

#[test]
fn list_file_requires_every_line_to_be_a_target() {
    let text = "# upstream resolvers\nhttps://a.example/x\n\n  https://b.example/y  \nfile:///tmp/t.html\n";
    assert_eq!(
        parse_target_list(text),
        Some(vec![
            "https://a.example/x".to_string(),
            "https://b.example/y".to_string(),
            "file:///tmp/t.html".to_string(),
        ])
    );

    assert_eq!(parse_target_list("<html><body>hi</body></html>"), None);
    assert_eq!(parse_target_list("https://a.example\nnot a url\n"), None);
    assert_eq!(parse_target_list("ftp://a.example/file\n"), None);
    assert_eq!(parse_target_list("\n# only comments\n"), None);
}

#[test]
fn bare_hosts_in_a_list_are_read_as_http() {
    init_logging();
    let text = "https://a.example/\nhttps://b.example/\nc.example\nlocalhost:8080\n";
    assert_eq!(
        parse_target_list(text),
        Some(vec![
            "https://a.example/".to_string(),
            "https://b.example/".to_string(),
            "http://c.example/".to_string(),
            "http://localhost:8080/".to_string(),
        ])
    );

    assert_eq!(parse_target_list("https://a.example/\n<p>c.example</p>\n"), None);
    assert_eq!(parse_target_list("https://a.example/\nhello\n"), None);
}

#[test]
fn sampling_caps_at_sample_size_without_duplicates() {
    let targets: Vec<String> = (0..10).map(|i| format!("https://h{i}.example/")).collect();
    let mut rng = StdRng::seed_from_u64(42);

    let sampled = sample_targets(targets.clone(), DEFAULT_SAMPLE_SIZE, &mut rng);

    assert_eq!(sampled.len(), 4);
    for target in &sampled {
        assert!(targets.contains(target));
    }
    let mut deduped = sampled.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), 4);
}

#[test]
fn sampling_is_deterministic_for_a_seed() {
    let targets: Vec<String> = (0..10).map(|i| format!("https://h{i}.example/")).collect();

    let first = sample_targets(targets.clone(), 4, &mut StdRng::seed_from_u64(9));
    let second = sample_targets(targets, 4, &mut StdRng::seed_from_u64(9));

    assert_eq!(first, second);
}

#[test]
fn short_lists_are_kept_whole() {
    let targets = vec!["https://a.example/".to_string(), "https://b.example/".to_string()];
    let sampled = sample_targets(targets, 4, &mut StdRng::seed_from_u64(3));
    assert_eq!(sampled.len(), 2);
}
