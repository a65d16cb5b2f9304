//! # End-to-End Correlation Flows
//!
//! Exercises the full send → transport → reply → callback path with a
//! loopback transport, including the interleavings the registry lock has
//! to survive: replies racing the send call itself, and replies racing an
//! aggressive purge timer.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::Mutex;
    use stanza_client::{
        ClientError, InboundDispatch, StanzaClient, StanzaSender, TransportSession,
    };
    use stanza_types::{Stanza, TransportError};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Transport that synchronously echoes every outgoing stanza back into
    /// the client as a reply carrying the same id.
    ///
    /// Because the echo happens *inside* `send`, a callback that is not yet
    /// registered at send time would be lost; this is the tightest possible
    /// reply race.
    #[derive(Default)]
    struct EchoSession {
        client: Mutex<Option<Arc<StanzaClient>>>,
    }

    impl EchoSession {
        fn attach(&self, client: Arc<StanzaClient>) {
            *self.client.lock() = Some(client);
        }
    }

    impl TransportSession for EchoSession {
        fn send(&self, stanza: &Stanza) -> Result<(), TransportError> {
            let client = self.client.lock().clone();
            let Some(client) = client else {
                return Err(TransportError::LinkDown);
            };

            let mut reply = Stanza::new(stanza.name.clone(), stanza.namespace.clone())
                .with_payload("<echo/>");
            if let Some(id) = stanza.id() {
                reply.set_id(id);
            }
            client.dispatch(&reply);
            Ok(())
        }
    }

    fn echo_client() -> (Arc<StanzaClient>, Arc<EchoSession>) {
        let client = Arc::new(StanzaClient::new("flow"));
        let session = Arc::new(EchoSession::default());
        session.attach(client.clone());
        client.handle_connect(session.clone());
        (client, session)
    }

    fn iq() -> Stanza {
        Stanza::new("iq", "jabber:client").with_payload("<query/>")
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[test]
    fn test_reply_racing_the_send_call_finds_the_callback() {
        let (client, _session) = echo_client();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        // The echo reply arrives before send_with_callback returns; the
        // callback must already be registered by then
        let id = client
            .send_with_callback(
                iq(),
                Box::new(move |_: &Stanza| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                5000,
            )
            .unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!client.registry().contains(&id));
    }

    #[test]
    fn test_at_most_once_under_reply_purge_race() {
        let client = Arc::new(StanzaClient::new("race"));

        const CALLBACKS: usize = 200;
        let fired = Arc::new(AtomicUsize::new(0));

        for i in 0..CALLBACKS {
            let counter = fired.clone();
            client.registry().register(
                &format!("race-{i}"),
                Box::new(move |_: &Stanza| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                1, // expires almost immediately
            );
        }

        // One thread replays replies for every id, another purges with a
        // far-future clock so every entry is permanently purge-eligible
        let replier = {
            let client = client.clone();
            std::thread::spawn(move || {
                for i in 0..CALLBACKS {
                    let mut reply = Stanza::new("iq", "jabber:client");
                    reply.set_id(format!("race-{i}"));
                    client.dispatch(&reply);
                }
            })
        };
        let purger = {
            let client = client.clone();
            std::thread::spawn(move || {
                for _ in 0..CALLBACKS {
                    client.registry().purge_expired(u64::MAX);
                }
            })
        };

        replier.join().unwrap();
        purger.join().unwrap();

        // Every callback was consumed exactly once, by a reply or a purge,
        // and only replies fire handlers
        let stats = client.registry().stats();
        let resolved = stats.resolved.load(Ordering::Relaxed) as usize;
        let purged = stats.purged.load(Ordering::Relaxed) as usize;

        assert_eq!(resolved + purged, CALLBACKS);
        assert_eq!(fired.load(Ordering::SeqCst), resolved);
        assert!(client.registry().is_empty());
    }

    #[test]
    fn test_callback_reentering_the_client_does_not_deadlock() {
        let (client, _session) = echo_client();

        let inner_id: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let slot = inner_id.clone();
        let reentrant_client = client.clone();

        // The fired callback immediately sends another stanza through the
        // same client; no registry or session lock may still be held
        client
            .send_with_callback(
                iq(),
                Box::new(move |_: &Stanza| {
                    let id = reentrant_client.send(Stanza::new("message", "jabber:client"));
                    *slot.lock() = id.ok();
                }),
                5000,
            )
            .unwrap();

        assert!(inner_id.lock().is_some());
    }

    #[test]
    fn test_send_without_session_is_a_connectivity_error() {
        let client = StanzaClient::new("flow");
        assert!(matches!(
            client.send(iq()),
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            client.send_with_callback(iq(), Box::new(|_: &Stanza| {}), 1000),
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_purge_task_expires_unanswered_requests() {
        use std::time::Duration;

        let (client, _session) = echo_client();

        // Bypass the echo by registering directly: this id never gets a reply
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        client.registry().register(
            "unanswered-1",
            Box::new(move |_: &Stanza| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            10,
        );

        let task = tokio::spawn(stanza_client::domain::purge_task(
            client.registry().clone(),
            Duration::from_millis(20),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(client.registry().is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        task.abort();
    }
}
