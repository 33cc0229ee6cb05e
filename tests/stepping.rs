use std::time::Duration;

use jdwp_bridge::{Error, Session, SessionConfig, SourceIndex};

mod common;

use common::{
    Bytes, MockPositions, MockTransport, Result, ALL_CLASSES, LINE_TABLE, RESUME, SET_EVENT,
    SOURCE_FILE,
};

type TestSession = Session<MockTransport, MockPositions>;

fn session(transport: MockTransport) -> TestSession {
    common::init_logging();
    let (session, _notifications) = Session::with_index(
        transport,
        MockPositions::at("com.example.Test", "main"),
        SessionConfig::default(),
        SourceIndex::from_paths(["/src/com/example/Test.java"]),
    );
    session
}

fn step_request(thread: u64, depth: u32) -> Vec<u8> {
    Bytes::new()
        .u8(1) // single step
        .u8(2) // suspend all
        .u32(6)
        .u8(10) // step
        .u64(thread)
        .u32(1) // by line
        .u32(depth)
        .u8(6)
        .str("java.*")
        .u8(6)
        .str("javax.*")
        .u8(6)
        .str("sun.*")
        .u8(6)
        .str("com.sun.*")
        .u8(1) // one-shot
        .u32(1)
        .build()
}

#[tokio::test]
async fn step_in() -> Result {
    let session = session(MockTransport::new());

    session.step_in().await?;

    assert_eq!(session.transport().commands(), ["15.1", "1.9"]);
    assert_eq!(session.transport().payloads(SET_EVENT), [step_request(1, 0)]);
    assert_eq!(session.transport().payloads(RESUME), [Vec::<u8>::new()]);
    Ok(())
}

#[tokio::test]
async fn step_over() -> Result {
    let session = session(MockTransport::new());

    session.step_over().await?;

    assert_eq!(session.transport().commands(), ["15.1", "1.9"]);
    assert_eq!(session.transport().payloads(SET_EVENT), [step_request(1, 1)]);
    Ok(())
}

#[tokio::test]
async fn steps_the_thread_that_last_stopped() -> Result {
    let transport = MockTransport::new()
        .reply(ALL_CLASSES, common::classes(&[(5, "Lcom/example/Test;")]))
        .reply(SOURCE_FILE, common::string("Test.java"))
        .reply(LINE_TABLE, common::line_table(&[(0x00, 12)]));
    let mut session = session(transport);

    let packet = common::composite(2, &[common::breakpoint_event(3, 0x0123_4567, 5, 6, 0)]);
    session.handle_event_packet(&packet).await?;
    session.transport().clear();

    session.step_over().await?;

    assert_eq!(
        session.transport().payloads(SET_EVENT),
        [step_request(0x0123_4567, 1)]
    );
    Ok(())
}

#[tokio::test]
async fn custom_exclusions() -> Result {
    common::init_logging();
    let config = SessionConfig {
        step_exclusions: vec!["kotlin.*".to_owned()],
        ..SessionConfig::default()
    };
    let (session, _notifications) = Session::with_index(
        MockTransport::new(),
        MockPositions::nowhere(),
        config,
        SourceIndex::default(),
    );

    session.step_in().await?;

    let expected = Bytes::new()
        .u8(1)
        .u8(2)
        .u32(3)
        .u8(10)
        .u64(1)
        .u32(1)
        .u32(0)
        .u8(6)
        .str("kotlin.*")
        .u8(1)
        .u32(1)
        .build();
    assert_eq!(session.transport().payloads(SET_EVENT), [expected]);
    Ok(())
}

#[tokio::test]
async fn resume() -> Result {
    let session = session(MockTransport::new());

    session.resume().await?;

    assert_eq!(session.transport().commands(), ["1.9"]);
    Ok(())
}

#[tokio::test]
async fn failed_step_request_does_not_resume() -> Result {
    let session = session(MockTransport::new().reply_error(SET_EVENT, 10));

    let err = session.step_in().await.unwrap_err();

    assert!(matches!(err, Error::Wire { code: 10, .. }), "{err:?}");
    assert_eq!(session.transport().commands(), ["15.1"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn resume_times_out() -> Result {
    let session = session(MockTransport::new().hang(RESUME));

    let err = session.resume().await.unwrap_err();

    assert!(
        matches!(err, Error::TransportTimeout(limit) if limit == Duration::from_secs(5)),
        "{err:?}"
    );
    Ok(())
}
