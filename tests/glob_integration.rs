use std::fs;

use wildglob::{glob, Config, MatchFlags, Matcher, PatternCache, Walker};

#[cfg(unix)]
use std::os::unix::fs::symlink;

fn build_sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("README.md"), "").unwrap();
    fs::write(dir.path().join("LICENSE.md"), "").unwrap();
    fs::write(dir.path().join(".hidden.md"), "").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs").join("guide.md"), "").unwrap();
    fs::write(dir.path().join("docs").join("faq.md"), "").unwrap();
    fs::create_dir(dir.path().join("docs").join("internal")).unwrap();
    fs::write(
        dir.path().join("docs").join("internal").join("roadmap.md"),
        "",
    )
    .unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src").join("lib.rs"), "").unwrap();
    fs::write(dir.path().join("src").join("lib_test.rs"), "").unwrap();

    #[cfg(unix)]
    {
        let linked_target = dir.path().join("docs");
        let link_path = dir.path().join("docs_link");
        let _ = symlink(&linked_target, &link_path);
    }

    dir
}

#[test]
fn finds_all_markdown_files_recursively() {
    let dir = build_sample_tree();
    let mut results = glob(
        &["**/*.md".to_string()],
        MatchFlags::GLOBSTAR,
        dir.path(),
    )
    .unwrap();
    results.sort();

    let mut expected = vec![
        "LICENSE.md",
        "README.md",
        "docs/faq.md",
        "docs/guide.md",
        "docs/internal/roadmap.md",
    ];
    expected.sort();
    assert_eq!(results, expected);
}

#[test]
fn dotglob_required_to_see_hidden_files() {
    let dir = build_sample_tree();
    let without_dotglob = glob(&["*.md".to_string()], MatchFlags::empty(), dir.path()).unwrap();
    assert!(!without_dotglob.iter().any(|p| p.starts_with('.')));

    let with_dotglob = glob(
        &["*.md".to_string()],
        MatchFlags::DOTGLOB,
        dir.path(),
    )
    .unwrap();
    assert!(with_dotglob.iter().any(|p| p == ".hidden.md"));
}

#[test]
fn exclude_pattern_removes_matches() {
    let dir = build_sample_tree();
    let results = glob(
        &["**/*.rs".to_string(), "!**/*_test.rs".to_string()],
        MatchFlags::GLOBSTAR | MatchFlags::NEGATE,
        dir.path(),
    )
    .unwrap();
    assert_eq!(results, vec!["src/lib.rs".to_string()]);
}

#[test]
fn nodir_flag_omits_directories_from_walk() {
    let dir = build_sample_tree();
    let results = glob(
        &["**".to_string()],
        MatchFlags::GLOBSTAR | MatchFlags::NODIR,
        dir.path(),
    )
    .unwrap();
    assert!(!results.contains(&"docs".to_string()));
    assert!(results.contains(&"src/lib.rs".to_string()));
}

#[test]
#[cfg(unix)]
fn follow_flag_controls_symlink_traversal() {
    let dir = build_sample_tree();
    let config = Config::default();
    let cache = PatternCache::new(config.pattern_cache_capacity.get());

    let no_follow = Matcher::compile(
        &["**/*.md".to_string()],
        MatchFlags::GLOBSTAR,
        &config,
        &cache,
    )
    .unwrap();
    let without_follow = Walker::new(&no_follow, dir.path()).run().unwrap();
    assert!(!without_follow.iter().any(|p| p.starts_with("docs_link/")));

    let follow = Matcher::compile(
        &["**/*.md".to_string()],
        MatchFlags::GLOBSTAR | MatchFlags::FOLLOW,
        &config,
        &cache,
    )
    .unwrap();
    let with_follow = Walker::new(&follow, dir.path()).run().unwrap();
    assert!(with_follow.iter().any(|p| p.starts_with("docs_link/")));
}

#[test]
fn matchbase_matches_basename_at_any_depth() {
    let dir = build_sample_tree();
    let results = glob(
        &["lib.rs".to_string()],
        MatchFlags::MATCHBASE | MatchFlags::GLOBSTAR,
        dir.path(),
    )
    .unwrap();
    assert_eq!(results, vec!["src/lib.rs".to_string()]);
}

#[test]
fn extglob_negation_excludes_matching_alternatives() {
    let dir = build_sample_tree();
    let results = glob(
        &["docs/!(internal)".to_string()],
        MatchFlags::EXTGLOB,
        dir.path(),
    )
    .unwrap();
    let mut sorted = results.clone();
    sorted.sort();
    assert!(sorted.contains(&"docs/faq.md".to_string()));
    assert!(sorted.contains(&"docs/guide.md".to_string()));
    assert!(!sorted.contains(&"docs/internal".to_string()));
}
