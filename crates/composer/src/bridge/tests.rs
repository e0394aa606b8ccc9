use super::*;
use crate::msg::{self, ComposerMsg};
use crate::service::ServiceError;
use crate::test_support::{ScriptedService, off_topic, on_topic};

fn draft() -> DocumentSnapshot {
	DocumentSnapshot::new("Seagrass", "Meadows store carbon.")
}

async fn recv_done(rx: &mut msg::MsgReceiver) -> RewriteDoneMsg {
	match rx.recv().await.expect("completion delivered") {
		ComposerMsg::RewriteDone(done) => done,
	}
}

#[tokio::test]
async fn second_request_while_pending_is_busy() {
	let (service, _replies) = ScriptedService::new();
	let (tx, _rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service);

	let first = bridge.start(&draft(), &tx).expect("first request accepted");

	assert_eq!(bridge.start(&draft(), &tx), Err(ComposerError::Busy));
	assert_eq!(bridge.in_flight_ticket(), Some(first));
}

#[tokio::test]
async fn blank_fields_are_refused_without_calling_service() {
	let (service, _replies) = ScriptedService::new();
	let (tx, _rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service.clone());

	let err = bridge
		.start(&DocumentSnapshot::new("Seagrass", "   "), &tx)
		.expect_err("blank content refused");

	assert_eq!(err.code(), "validation_error");
	assert!(!bridge.is_busy());
	tokio::task::yield_now().await;
	assert!(service.calls().is_empty());
}

#[tokio::test]
async fn on_topic_completion_yields_candidate() {
	let (service, replies) = ScriptedService::new();
	let (tx, mut rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service.clone());

	let ticket = bridge.start(&draft(), &tx).expect("accepted");
	replies.send(on_topic("", "Seagrass meadows store carbon.", "Why meadows matter")).expect("script open");

	let completion = bridge.complete(recv_done(&mut rx).await).expect("token matches");
	assert_eq!(completion.ticket, ticket);
	let candidate = completion.verdict.expect("accepted");
	assert_eq!(
		candidate.resolve(&draft()),
		DocumentSnapshot::new("Seagrass", "Seagrass meadows store carbon.")
	);
	assert_eq!(candidate.short_description.as_deref(), Some("Why meadows matter"));
	assert!(!bridge.is_busy());
	assert_eq!(service.calls()[0], RewriteRequest::rewrite("Meadows store carbon."));
}

#[tokio::test]
async fn off_topic_and_transport_failures_are_distinguished() {
	let (service, replies) = ScriptedService::new();
	let (tx, mut rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service);

	bridge.start(&draft(), &tx).expect("accepted");
	replies.send(off_topic("about cooking")).expect("script open");
	let rejected = bridge.complete(recv_done(&mut rx).await).expect("token matches");
	assert_eq!(rejected.verdict.expect_err("rejected").code(), "rejected_off_topic");

	bridge.start(&draft(), &tx).expect("accepted after previous completion");
	replies
		.send(Err(ServiceError::Transport("connection reset".into())))
		.expect("script open");
	let failed = bridge.complete(recv_done(&mut rx).await).expect("token matches");
	assert_eq!(failed.verdict.expect_err("failed").code(), "transport_error");
}

#[tokio::test]
async fn stale_token_is_ignored() {
	let (service, _replies) = ScriptedService::new();
	let (tx, _rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service);

	let ticket = bridge.start(&draft(), &tx).expect("accepted");
	let stale = RewriteDoneMsg {
		token: ticket.token() + 1,
		result: on_topic("x", "y", "z"),
	};

	assert!(bridge.complete(stale).is_none());
	assert!(bridge.is_busy());
}

#[tokio::test]
async fn cancel_drops_the_pending_call() {
	let (service, replies) = ScriptedService::new();
	let (tx, mut rx) = msg::channel();
	let mut bridge = RewriteBridge::new(service);

	let ticket = bridge.start(&draft(), &tx).expect("accepted");
	bridge.cancel();
	for _ in 0..4 {
		tokio::task::yield_now().await;
	}
	let _ = replies.send(on_topic("x", "y", "z"));
	for _ in 0..4 {
		tokio::task::yield_now().await;
	}

	assert!(rx.try_recv().is_err());
	let late = RewriteDoneMsg {
		token: ticket.token(),
		result: on_topic("x", "y", "z"),
	};
	assert!(bridge.complete(late).is_none());
}

#[test]
fn candidate_keeps_present_fields_left_blank() {
	let candidate = RewriteCandidate::from_response(RewriteResponse {
		title: "  ".into(),
		rewritten_text: String::new(),
		..RewriteResponse::default()
	});

	assert_eq!(candidate.resolve(&draft()), draft());
	assert!(candidate.short_description.is_none());
}
