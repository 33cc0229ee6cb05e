use std::{fs, path::Path};

use jdwp_bridge::{Error, Notification, Session, SessionConfig, SourceIndex};

mod common;

use common::{MockPositions, MockTransport, Result, ALL_CLASSES, LINE_TABLE, SOURCE_FILE};

fn touch(root: &Path, relative: &str) -> Result {
    let file = root.join(relative);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, "")?;
    Ok(())
}

#[test]
fn scan_collects_sources_only() -> Result {
    let dir = tempfile::tempdir()?;
    touch(dir.path(), "com/example/Test.java")?;
    touch(dir.path(), "com/example/util/Strings.java")?;
    touch(dir.path(), "com/example/Test.class")?;
    touch(dir.path(), "README.md")?;
    fs::create_dir_all(dir.path().join("empty.java"))?;

    let index = SourceIndex::scan(&[dir.path()], "java");

    let mut found: Vec<_> = index
        .iter()
        .map(|file| file.strip_prefix(dir.path()).map(Path::to_path_buf))
        .collect::<std::result::Result<_, _>>()?;
    found.sort();
    assert_eq!(
        found,
        [
            common::path("com/example/Test.java"),
            common::path("com/example/util/Strings.java"),
        ]
    );
    Ok(())
}

#[test]
fn scan_spans_all_roots_and_skips_missing_ones() -> Result {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;
    touch(first.path(), "a/A.java")?;
    touch(second.path(), "b/B.java")?;
    let missing = first.path().join("does-not-exist");

    let index = SourceIndex::scan(&[first.path(), second.path(), missing.as_path()], "java");

    assert_eq!(index.len(), 2);
    Ok(())
}

#[test]
fn same_file_under_two_roots_is_ambiguous() -> Result {
    let first = tempfile::tempdir()?;
    let second = tempfile::tempdir()?;
    touch(first.path(), "com/example/Test.java")?;
    touch(second.path(), "com/example/Test.java")?;

    let index = SourceIndex::scan(&[first.path(), second.path()], "java");

    let err = index
        .resolve("Lcom/example/Test;", "Test.java")
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousPath { candidates, .. } if candidates.len() == 2));
    Ok(())
}

#[tokio::test]
async fn session_resolves_positions_against_its_roots() -> Result {
    common::init_logging();
    let dir = tempfile::tempdir()?;
    touch(dir.path(), "com/example/Test.java")?;
    touch(dir.path(), "com/example/Other.java")?;

    let transport = MockTransport::new()
        .reply(ALL_CLASSES, common::classes(&[(5, "Lcom/example/Test;")]))
        .reply(SOURCE_FILE, common::string("Test.java"))
        .reply(LINE_TABLE, common::line_table(&[(0x00, 3)]));
    let config = SessionConfig {
        source_roots: vec![dir.path().to_path_buf()],
        ..SessionConfig::default()
    };
    let (mut session, mut notifications) = Session::new(
        transport,
        MockPositions::at("com.example.Test", "main"),
        config,
    );
    assert_eq!(session.source_index().len(), 2);

    let packet = common::composite(2, &[common::breakpoint_event(1, 1, 5, 6, 0)]);
    session.handle_event_packet(&packet).await?;

    assert_eq!(
        notifications.try_recv()?,
        Notification::PositionChanged {
            path: dir.path().join("com/example/Test.java"),
            line: 3,
        }
    );
    Ok(())
}
