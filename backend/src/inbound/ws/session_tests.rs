//! WebSocket session handler tests.

use super::*;
use crate::domain::ports::RealtimePublisher;
use crate::domain::{EventKind, StudentId};
use crate::inbound::ws;
use crate::inbound::ws::state::{AllowedOrigins, WsState};
use crate::outbound::realtime::BroadcastHub;
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::StatusCode, http::header};
use awc::error::WsClientError;
use awc::{BoxedSocket, ws::Codec, ws::Frame};
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

struct TestServer {
    url: String,
    hub: BroadcastHub,
    handle: ServerHandle,
}

impl TestServer {
    async fn connect(&self, query: &str) -> Result<Socket, WsClientError> {
        let (_resp, socket) = awc::Client::default()
            .ws(format!("{}/ws{query}", self.url))
            .set_header(header::ORIGIN, "http://localhost:3000")
            .connect()
            .await?;
        Ok(socket)
    }
}

#[fixture]
async fn start_ws_server() -> (String, BroadcastHub, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let hub = BroadcastHub::default();
    let origins = AllowedOrigins::parse(["http://localhost:3000"]).expect("valid origins");
    let ws_state = WsState::new(hub.clone(), origins);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    (format!("http://{addr}"), hub, server)
}

#[fixture]
async fn test_server(#[future] start_ws_server: (String, BroadcastHub, Server)) -> TestServer {
    let (url, hub, server) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);
    TestServer { url, hub, handle }
}

async fn next_text_frame(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn broadcast_events_reach_every_connection(#[future] test_server: TestServer) {
    let server = test_server.await;
    let mut anonymous = server.connect("").await.expect("websocket connect");
    let student = StudentId::random();
    let mut scoped = server
        .connect(&format!("?student={student}"))
        .await
        .expect("websocket connect");

    server.hub.publish(RealtimeEvent::broadcast(
        EventKind::NewNotification,
        "Centre closed on Friday",
    ));

    for socket in [&mut anonymous, &mut scoped] {
        let frame = next_text_frame(socket).await;
        assert_eq!(
            frame,
            json!({
                "event": "new_notification",
                "data": {
                    "message": "Centre closed on Friday",
                    "url": EventKind::NewNotification.url(),
                    "button": EventKind::NewNotification.button(),
                },
            })
        );
    }
    server.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn student_events_only_reach_their_room(#[future] test_server: TestServer) {
    let server = test_server.await;
    let student = StudentId::random();
    let mut socket = server
        .connect(&format!("?student={student}"))
        .await
        .expect("websocket connect");

    server.hub.publish(RealtimeEvent::for_student(
        EventKind::FeeNotification,
        StudentId::random(),
        "someone else's fee",
    ));
    server.hub.publish(RealtimeEvent::for_student(
        EventKind::FeeNotification,
        student,
        "your fee",
    ));

    let frame = next_text_frame(&mut socket).await;
    assert_eq!(frame["event"], "fee_notification");
    assert_eq!(frame["data"]["message"], "your fee");
    server.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn join_message_moves_the_connection_into_a_room(#[future] test_server: TestServer) {
    let server = test_server.await;
    let student = StudentId::random();
    let mut socket = server.connect("").await.expect("websocket connect");
    socket
        .send(awc::ws::Message::Text(
            json!({"type": "join", "studentId": student}).to_string().into(),
        ))
        .await
        .expect("send join");
    // The pong arrives only after the join frame has been handled.
    socket
        .send(awc::ws::Message::Ping("sync".into()))
        .await
        .expect("send ping");
    loop {
        match socket.next().await.expect("frame").expect("frame") {
            Frame::Pong(_) => break,
            Frame::Ping(_) => continue,
            other => panic!("unexpected frame before pong: {other:?}"),
        }
    }

    server.hub.publish(RealtimeEvent::for_student(
        EventKind::FeeNotification,
        student,
        "your fee",
    ));

    let frame = next_text_frame(&mut socket).await;
    assert_eq!(frame["data"]["message"], "your fee");
    server.handle.stop(false).await;
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_json(#[future] test_server: TestServer) {
    let server = test_server.await;
    let mut socket = server.connect("").await.expect("websocket connect");
    socket
        .send(awc::ws::Message::Text("not-json".into()))
        .await
        .expect("send text");

    loop {
        match socket.next().await.expect("response frame").expect("frame") {
            Frame::Ping(_) | Frame::Pong(_) => continue,
            Frame::Close(reason) => {
                assert_eq!(reason.expect("reason").code, CloseCode::Policy);
                break;
            }
            other => panic!("expected close frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn rejects_invalid_student_query(#[future] test_server: TestServer) {
    let server = test_server.await;
    let error = server
        .connect("?student=nobody")
        .await
        .err()
        .expect("upgrade should be refused");
    assert!(matches!(
        error,
        WsClientError::InvalidResponseStatus(StatusCode::BAD_REQUEST)
    ));
}

#[rstest]
#[actix_rt::test]
async fn rejects_unlisted_origin(#[future] test_server: TestServer) {
    let server = test_server.await;
    let error = awc::Client::default()
        .ws(format!("{}/ws", server.url))
        .set_header(header::ORIGIN, "https://evil.example")
        .connect()
        .await
        .err()
        .expect("upgrade should be refused");
    assert!(matches!(
        error,
        WsClientError::InvalidResponseStatus(StatusCode::FORBIDDEN)
    ));
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(#[future] test_server: TestServer) {
    use std::time::Duration;

    let server = test_server.await;
    let mut socket = server.connect("").await.expect("websocket connect");
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
