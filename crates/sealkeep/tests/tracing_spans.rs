//! Instrumented operations produce the expected spans and events.

use std::sync::{Arc, Mutex};

use tracing::{Level, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

use sealkeep::acl::AccessEntry;
use sealkeep::core::Keypair;
use sealkeep::store::{MemoryStore, Persistence};
use sealkeep::{Sealkeep, SealkeepConfig};
use sealkeep_testkit::{identity, TestFixture};

// ─────────────────────────────────────────────────────────────────────────────
// Collecting layer
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Collector {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<Level>>>,
}

impl<S> tracing_subscriber::Layer<S> for Collector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        _attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            self.spans.lock().unwrap().push(span.name().to_owned());
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        self.events.lock().unwrap().push(*event.metadata().level());
    }
}

fn install() -> (Collector, tracing::subscriber::DefaultGuard) {
    let collector = Collector::default();
    let subscriber = tracing_subscriber::registry().with(collector.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (collector, guard)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_viewer_creates_span() {
    let (collector, _guard) = install();

    let fixture = TestFixture::new();
    let acl = fixture.master("docs", None);
    let viewer = fixture.viewer().await;
    acl.add_viewer(&viewer.url()).await.unwrap();

    let spans = collector.spans.lock().unwrap();
    assert!(spans.iter().any(|s| s == "add_viewer"), "got: {:?}", spans);
}

#[tokio::test]
async fn resolve_creates_open_and_fetch_spans() {
    let store = Arc::new(MemoryStore::new());
    let owner = Sealkeep::new(identity(), store.clone(), SealkeepConfig::default());
    let viewer = Sealkeep::new(identity(), store.clone(), SealkeepConfig::default());
    viewer.publish_identity().await.unwrap();

    let acl = owner.create_acl("docs", None).await.unwrap();
    owner.grant(&acl, &viewer.identity().url()).await.unwrap();
    let envelope = owner.seal(&acl, "text").await.unwrap();

    let (collector, _guard) = install();
    viewer.resolve(envelope.to_value().unwrap()).await.unwrap();

    let spans = collector.spans.lock().unwrap();
    assert!(spans.iter().any(|s| s == "open"), "got: {:?}", spans);
    assert!(spans.iter().any(|s| s == "fetch"), "got: {:?}", spans);
}

#[tokio::test]
async fn dropped_entry_is_warned() {
    let fixture = TestFixture::new();
    let acl = fixture.master("docs", None);
    let url = acl.publish_and_wait().await.unwrap();

    let forged = AccessEntry::new(identity().url(), vec![0; 8])
        .sign(&Keypair::generate())
        .unwrap();
    fixture.store.append(&acl.list_id(), &forged).await.unwrap();

    let (collector, _guard) = install();
    let copy = fixture.fetch(&url).await;
    assert_eq!(copy.materialize().await.unwrap(), 0);

    let events = collector.events.lock().unwrap();
    assert!(events.contains(&Level::WARN), "got: {:?}", events);
}
