//! Scanner and prompt assembly against fixture repositories.

use helmgen_core::prompt::{self, END_MARKER};
use helmgen_core::scan::{PathFilter, RepoScanner, ScanError, is_special_file};
use helmgen_test_utils::FixtureRepo;
use pretty_assertions::assert_eq;

fn scanner(patterns: &[&str]) -> RepoScanner {
    RepoScanner::new(PathFilter::new(patterns.iter().copied()).unwrap())
}

fn dirs(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test_log::test]
fn test_text_kept_image_and_excluded_dir_dropped() {
    let repo = FixtureRepo::new();
    repo.file("a/foo.py", "print('foo')\n")
        .bytes("a/logo.png", &[0x89, b'P', b'N', b'G', 0xff, 0x00])
        .file("a/deployment/x.yaml", "kind: Deployment\n");

    let mut seen = Vec::new();
    let count = scanner(&["*/deployment"])
        .scan_with(repo.path(), &dirs(&["a"]), &mut |record| seen.push(record))
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].rel_path, "a/foo.py");
    assert_eq!(seen[0].content, "print('foo')\n");
}

#[test]
fn test_excluded_directory_is_never_read() {
    let repo = FixtureRepo::new();
    repo.file("src/app.py", "ok")
        // Invalid UTF-8 would abort the scan if the directory were entered.
        .bytes("src/build/output.txt", &[0xc3, 0x28])
        .bytes("src/build/nested/more.txt", &[0xff]);

    let records = scanner(&["*/build"])
        .scan(repo.path(), &dirs(&["src"]))
        .unwrap();
    let paths: Vec<_> = records.iter().map(|r| r.rel_path.as_str()).collect();
    assert_eq!(paths, vec!["src/app.py"]);
}

#[test]
fn test_empty_subdirectory_yields_zero() {
    let repo = FixtureRepo::new();
    repo.dir("a/empty").bytes("a/only.jpg", b"\xff\xd8\xff");

    let count = scanner(&[])
        .scan_with(repo.path(), &dirs(&["a"]), &mut |_| {})
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_deny_list_is_case_insensitive_and_pattern_independent() {
    let repo = FixtureRepo::new();
    repo.file("docs/README.MD", "# readme")
        .file("docs/Guide.Pdf", "not really a pdf")
        .file("docs/notes.txt", "notes");

    let records = scanner(&[]).scan(repo.path(), &dirs(&["docs"])).unwrap();
    let paths: Vec<_> = records.iter().map(|r| r.rel_path.as_str()).collect();
    assert_eq!(paths, vec!["docs/notes.txt"]);
    assert!(records.iter().all(|r| !is_special_file(&r.rel_path)));
}

#[test]
fn test_relative_file_patterns_apply_to_files() {
    let repo = FixtureRepo::new();
    repo.file("comps/llm/server.py", "serve()")
        .file("comps/llm/requirements.txt", "fastapi")
        .file("comps/llm/tests/test_server.py", "assert True");

    // `*/tests` prunes the directory by its walked path; `*.txt` drops files
    // by their relative path.
    let records = scanner(&["*/tests", "*.txt"])
        .scan(repo.path(), &dirs(&["comps"]))
        .unwrap();
    let paths: Vec<_> = records.iter().map(|r| r.rel_path.as_str()).collect();
    assert_eq!(paths, vec!["comps/llm/server.py"]);
}

#[test]
fn test_prefix_pattern_excludes_by_relative_path() {
    let repo = FixtureRepo::new();
    repo.file("comps/keep.py", "k")
        .file("comps/vendored/lib.py", "v")
        .file("comps/vendored_extra.py", "x");

    let records = scanner(&["comps/vendored"])
        .scan(repo.path(), &dirs(&["comps"]))
        .unwrap();
    let paths: Vec<_> = records.iter().map(|r| r.rel_path.as_str()).collect();
    assert_eq!(paths, vec!["comps/keep.py"]);
}

#[test]
fn test_decode_failure_aborts() {
    let repo = FixtureRepo::new();
    repo.file("src/a.py", "fine").bytes("src/b.dat", &[0xfe, 0xff, 0xfe]);

    let err = scanner(&[]).scan(repo.path(), &dirs(&["src"])).unwrap_err();
    match err {
        ScanError::Decode { path, .. } => assert!(path.ends_with("src/b.dat")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_repeated_scans_produce_identical_prompts() {
    let repo = FixtureRepo::new();
    for name in ["z.py", "m.py", "a.py", "sub/q.py", "sub/b.py", "other/c.py"] {
        repo.file(&format!("src/{name}"), name);
    }

    let build = || {
        let records = scanner(&["*/deployment"])
            .scan(repo.path(), &dirs(&["src"]))
            .unwrap();
        prompt::assemble(&records, "----", "PRE", "EPI").into_string()
    };
    let first = build();
    assert_eq!(first, build());
    assert!(first.ends_with(&format!("\n{END_MARKER}\nEPI\n")));

    let order: Vec<_> = first.lines().filter(|l| l.starts_with("src/")).collect();
    assert_eq!(
        order,
        vec![
            "src/a.py",
            "src/m.py",
            "src/z.py",
            "src/other/c.py",
            "src/sub/b.py",
            "src/sub/q.py"
        ]
    );
}

#[test]
fn test_single_file_prompt_layout() {
    let repo = FixtureRepo::new();
    repo.file("x.txt", "hello");

    let records = scanner(&[]).scan(repo.path(), &dirs(&["."])).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].rel_path, "x.txt");

    let doc = prompt::assemble(&records, "----", "<preamble>", "<epilog>");
    assert_eq!(
        doc.as_str(),
        "<preamble>\n----\nx.txt\nhello\n\n--END--\n<epilog>\n"
    );
}
