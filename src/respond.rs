/*
 *  Tromo - Discord bot for tracking per-day help counts reported by staff.
 *  Copyright (C) 2026  Tromo contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::errors::{AppError, AppResult, ErrorLog};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/**
 * Closed set of delivery outcomes the platform-facing transport reports.
 *
 * The responder switches on this instead of inspecting opaque platform
 * error codes.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The interaction is expired or already fully acknowledged; the
    /// platform will not accept this payload, now or ever.
    Stale,
    TransientFailure(String),
}

/**
 * The platform-facing side of response delivery.
 */
#[async_trait]
pub trait ResponseTransport: Send {
    /// Deliver the primary payload for this interaction.
    async fn send_initial(&mut self, payload: &str) -> DeliveryOutcome;
    /// Send the placeholder acknowledgment without a visible payload.
    async fn defer(&mut self) -> DeliveryOutcome;
    /// Deliver an additional payload after the primary one.
    async fn follow_up(&mut self, payload: &str) -> DeliveryOutcome;
}

/**
 * Where this interaction stands in its response lifecycle.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ResponderState {
    /// No response sent yet.
    Fresh,
    /// Placeholder acknowledgment sent, final payload pending.
    Deferred,
    /// The primary payload has been delivered.
    Replied,
    /// Additional payloads delivered after the primary one.
    Followed,
}

/**
 * Delivers exactly one user-visible primary response per inbound command,
 * tolerating the platform's transient lifecycle errors.
 *
 * Stale interactions are swallowed (logged, no state change); transient
 * failures are retried once with the transition appropriate to the current
 * state. The primary payload is never delivered twice: once out of `Fresh`,
 * every delivery goes through `follow_up`.
 */
pub struct Responder<T> {
    transport: T,
    state: ResponderState,
    errors: Arc<ErrorLog>,
}

impl<T: ResponseTransport> Responder<T> {
    pub fn new(transport: T, errors: Arc<ErrorLog>) -> Self {
        Self {
            transport,
            state: ResponderState::Fresh,
            errors,
        }
    }

    pub fn state(&self) -> ResponderState {
        self.state
    }

    /**
     * Sends the placeholder acknowledgment. Only meaningful from `Fresh`;
     * anywhere else this is a no-op.
     */
    pub async fn defer(&mut self) -> AppResult<()> {
        if self.state != ResponderState::Fresh {
            return Ok(());
        }
        match self.transport.defer().await {
            DeliveryOutcome::Delivered => {
                self.state = ResponderState::Deferred;
                Ok(())
            }
            DeliveryOutcome::Stale => {
                warn!("Deferral hit a stale interaction; dropping it.");
                Ok(())
            }
            DeliveryOutcome::TransientFailure(first) => match self.transport.defer().await {
                DeliveryOutcome::Delivered => {
                    self.state = ResponderState::Deferred;
                    Ok(())
                }
                DeliveryOutcome::Stale => {
                    warn!("Deferral retry hit a stale interaction; dropping it.");
                    Ok(())
                }
                DeliveryOutcome::TransientFailure(retry) => {
                    self.errors
                        .push("responder", &format!("defer failed: {}; retry: {}", first, retry));
                    Err(AppError::Delivery(first))
                }
            },
        }
    }

    /**
     * Delivers a payload: the primary response when still `Fresh`, a
     * follow-up otherwise.
     */
    pub async fn send(&mut self, payload: &str) -> AppResult<()> {
        match self.attempt(payload).await {
            DeliveryOutcome::Delivered => {
                self.advance();
                Ok(())
            }
            DeliveryOutcome::Stale => {
                warn!("Response hit a stale interaction; dropping the payload.");
                Ok(())
            }
            DeliveryOutcome::TransientFailure(first) => match self.attempt(payload).await {
                DeliveryOutcome::Delivered => {
                    self.advance();
                    Ok(())
                }
                DeliveryOutcome::Stale => {
                    warn!("Response retry hit a stale interaction; dropping the payload.");
                    Ok(())
                }
                DeliveryOutcome::TransientFailure(retry) => {
                    self.errors
                        .push("responder", &format!("send failed: {}; retry: {}", first, retry));
                    Err(AppError::Delivery(first))
                }
            },
        }
    }

    async fn attempt(&mut self, payload: &str) -> DeliveryOutcome {
        match self.state {
            ResponderState::Fresh => self.transport.send_initial(payload).await,
            _ => self.transport.follow_up(payload).await,
        }
    }

    fn advance(&mut self) {
        self.state = match self.state {
            ResponderState::Fresh => ResponderState::Replied,
            _ => ResponderState::Followed,
        };
    }
}

/* Discord-facing transport: */

/**
 * Classifies a serenity error into a delivery outcome. Discord reports a
 * dead interaction as JSON error 10062 (unknown interaction) or 40060
 * (interaction already acknowledged).
 */
pub fn classify(err: serenity::Error) -> DeliveryOutcome {
    if let serenity::Error::Http(serenity::all::HttpError::UnsuccessfulRequest(resp)) = &err {
        if resp.error.code == 10062 || resp.error.code == 40060 {
            return DeliveryOutcome::Stale;
        }
    }
    DeliveryOutcome::TransientFailure(err.to_string())
}

/**
 * Transport over a poise command context. The first delivery is a direct
 * reply; later ones go out as follow-up messages.
 */
pub struct PoiseTransport<'a> {
    ctx: crate::Context<'a>,
}

impl<'a> PoiseTransport<'a> {
    pub fn new(ctx: crate::Context<'a>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ResponseTransport for PoiseTransport<'_> {
    async fn send_initial(&mut self, payload: &str) -> DeliveryOutcome {
        match self.ctx.reply(payload.to_string()).await {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify(e),
        }
    }

    async fn defer(&mut self) -> DeliveryOutcome {
        match self.ctx.defer().await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => classify(e),
        }
    }

    async fn follow_up(&mut self, payload: &str) -> DeliveryOutcome {
        let reply = poise::CreateReply::default().content(payload.to_string());
        match self.ctx.send(reply).await {
            Ok(_) => DeliveryOutcome::Delivered,
            Err(e) => classify(e),
        }
    }
}

/**
 * Builds a responder for a command invocation, wired to the shared error
 * log.
 */
pub fn from_ctx(ctx: crate::Context<'_>) -> Responder<PoiseTransport<'_>> {
    Responder::new(PoiseTransport::new(ctx), ctx.data().errors.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Initial,
        Defer,
        FollowUp,
    }

    struct MockTransport {
        script: VecDeque<DeliveryOutcome>,
        calls: Vec<Call>,
    }

    impl MockTransport {
        fn scripted(outcomes: Vec<DeliveryOutcome>) -> Self {
            Self {
                script: outcomes.into(),
                calls: Vec::new(),
            }
        }

        fn next(&mut self) -> DeliveryOutcome {
            self.script.pop_front().unwrap_or(DeliveryOutcome::Delivered)
        }
    }

    #[async_trait]
    impl ResponseTransport for MockTransport {
        async fn send_initial(&mut self, _payload: &str) -> DeliveryOutcome {
            self.calls.push(Call::Initial);
            self.next()
        }

        async fn defer(&mut self) -> DeliveryOutcome {
            self.calls.push(Call::Defer);
            self.next()
        }

        async fn follow_up(&mut self, _payload: &str) -> DeliveryOutcome {
            self.calls.push(Call::FollowUp);
            self.next()
        }
    }

    fn responder(outcomes: Vec<DeliveryOutcome>) -> Responder<MockTransport> {
        Responder::new(MockTransport::scripted(outcomes), Arc::new(ErrorLog::default()))
    }

    #[tokio::test]
    async fn fresh_send_delivers_primary_and_moves_to_replied() {
        let mut r = responder(vec![DeliveryOutcome::Delivered]);
        r.send("xin chào").await.unwrap();
        assert_eq!(r.state(), ResponderState::Replied);
        assert_eq!(r.transport.calls, vec![Call::Initial]);
    }

    #[tokio::test]
    async fn stale_interaction_is_swallowed_without_state_change() {
        let mut r = responder(vec![DeliveryOutcome::Stale]);
        r.send("payload").await.unwrap();
        assert_eq!(r.state(), ResponderState::Fresh);
        assert_eq!(r.transport.calls, vec![Call::Initial]); // no retry for stale
    }

    #[tokio::test]
    async fn transient_failure_retries_once_then_succeeds() {
        let mut r = responder(vec![
            DeliveryOutcome::TransientFailure(String::from("hiccup")),
            DeliveryOutcome::Delivered,
        ]);
        r.send("payload").await.unwrap();
        assert_eq!(r.state(), ResponderState::Replied);
        assert_eq!(r.transport.calls, vec![Call::Initial, Call::Initial]);
    }

    #[tokio::test]
    async fn stale_on_retry_is_swallowed_too() {
        let mut r = responder(vec![
            DeliveryOutcome::TransientFailure(String::from("hiccup")),
            DeliveryOutcome::Stale,
        ]);
        r.send("payload").await.unwrap();
        assert_eq!(r.state(), ResponderState::Fresh);
    }

    #[tokio::test]
    async fn double_transient_failure_propagates_original_and_records_it() {
        let errors = Arc::new(ErrorLog::default());
        let transport = MockTransport::scripted(vec![
            DeliveryOutcome::TransientFailure(String::from("first")),
            DeliveryOutcome::TransientFailure(String::from("second")),
        ]);
        let mut r = Responder::new(transport, errors.clone());

        let err = r.send("payload").await.unwrap_err();
        assert!(matches!(err, AppError::Delivery(ref msg) if msg == "first"));
        assert_eq!(errors.len(), 1);
        assert_eq!(r.state(), ResponderState::Fresh);
    }

    #[tokio::test]
    async fn defer_then_send_goes_through_follow_up() {
        let mut r = responder(vec![DeliveryOutcome::Delivered, DeliveryOutcome::Delivered]);
        r.defer().await.unwrap();
        assert_eq!(r.state(), ResponderState::Deferred);
        r.send("báo cáo").await.unwrap();
        assert_eq!(r.state(), ResponderState::Followed);
        assert_eq!(r.transport.calls, vec![Call::Defer, Call::FollowUp]);
    }

    #[tokio::test]
    async fn primary_is_never_delivered_twice() {
        let mut r = responder(vec![
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Delivered,
        ]);
        r.send("one").await.unwrap();
        r.send("two").await.unwrap();
        r.send("three").await.unwrap();
        assert_eq!(r.state(), ResponderState::Followed);
        assert_eq!(
            r.transport.calls,
            vec![Call::Initial, Call::FollowUp, Call::FollowUp]
        );
    }

    #[tokio::test]
    async fn defer_is_a_no_op_after_a_reply() {
        let mut r = responder(vec![DeliveryOutcome::Delivered]);
        r.send("payload").await.unwrap();
        r.defer().await.unwrap();
        assert_eq!(r.state(), ResponderState::Replied);
        assert_eq!(r.transport.calls, vec![Call::Initial]);
    }

    #[tokio::test]
    async fn retry_uses_the_transition_for_the_current_state() {
        // Already replied: the retry after a transient failure must be a
        // follow-up again, not a second primary.
        let mut r = responder(vec![
            DeliveryOutcome::Delivered,
            DeliveryOutcome::TransientFailure(String::from("hiccup")),
            DeliveryOutcome::Delivered,
        ]);
        r.send("one").await.unwrap();
        r.send("two").await.unwrap();
        assert_eq!(
            r.transport.calls,
            vec![Call::Initial, Call::FollowUp, Call::FollowUp]
        );
        assert_eq!(r.state(), ResponderState::Followed);
    }
}
