//! Drives a whole session through the line interface: audit, contact gate,
//! result and the specialist form, against a SQLite-backed lead cache.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use margin_core::lead::LeadCache;
use margin_core::store::StoreConfig;
use margin_core::tracking::BrowserContext;
use margin_funnel::app::build_registry;
use margin_funnel::repl::run_session;
use margin_funnel::webhook::{DeliveryStrategy, TransportError, WebhookSubmitter};
use margin_funnel::Funnel;
use pretty_assertions::assert_eq;
use serde_json::Value;

type Sent = Arc<Mutex<Vec<Value>>>;

struct Capture(Sent);

#[async_trait]
impl DeliveryStrategy for Capture {
    fn name(&self) -> &'static str {
        "capture"
    }

    async fn deliver(
        &self,
        _url: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        let value = serde_json::from_str(body).map_err(|e| TransportError::Other(e.to_string()))?;
        self.0.lock().unwrap().push(value);
        Ok(())
    }
}

async fn sqlite_cache() -> LeadCache {
    let store = build_registry()
        .create(&StoreConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        })
        .await
        .expect("sqlite store");
    LeadCache::new(Arc::from(store))
}

const AWAIT_DELAY: Duration = Duration::from_millis(20);

const SCRIPT: &str = "\
start
set fixed_cost 3.000,00
set open_hours 160
next
set procedure_name Limpeza de pele
set procedure_price 200,00
set procedure_minutes 90
next
set taxes_percent 10
set commission_percent 10
set materials_cost 20

contact name Ana Souza
contact phone (11) 98765-4321
contact email ana@clinica.com

specialist
answer challenge Precificação
answer team Somente eu
answer uses_system Sim
next
answer area Estética
answer subscriber Não
answer investment Sim
next
submit
";

#[tokio::test]
async fn full_session_sends_both_leads() {
    let cache = sqlite_cache().await;
    let sent = Sent::default();
    let webhook = WebhookSubmitter::with_strategies(
        "https://hooks.example/lead",
        vec![Box::new(Capture(sent.clone()))],
    );
    let context = BrowserContext {
        source_url: "https://clinica.example/?utm_source=ig&utm_medium=stories".to_string(),
        ..Default::default()
    };
    let (funnel, events) = Funnel::new(cache.clone(), webhook, context, AWAIT_DELAY);

    let mut output = Vec::new();
    run_session(funnel, events, SCRIPT.as_bytes(), &mut output)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let text = String::from_utf8(output).unwrap();
    let result_at = text.find("=== Seu Diagnóstico ===").expect("result view");
    let specialist_at = text.find("--- Fale com um especialista ---").expect("specialist form");
    let thanks_at = text.find("=== Tudo certo ===").expect("thank-you view");
    assert!(result_at < specialist_at && specialist_at < thanks_at);

    let sent = sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);

    assert_eq!(sent[0]["name"], "Ana Souza");
    assert_eq!(sent[0]["phone"], "5511987654321");
    assert_eq!(sent[0]["email"], "ana@clinica.com");

    assert_eq!(sent[1]["event"], "diagnostico");
    assert_eq!(sent[1]["area"], "aesthetic");
    assert_eq!(sent[1]["utm_medium"], "stories");
    assert_eq!(sent[1]["phone"], "5511987654321");
    assert_eq!(sent[1]["event_id"], cache.event_id().await.as_str());

    let cached = cache.cached().await.expect("contact cached");
    assert_eq!(cached.name, "Ana Souza");
}

#[tokio::test]
async fn input_ending_while_waiting_still_shows_result() {
    let (funnel, events) = Funnel::new(
        sqlite_cache().await,
        WebhookSubmitter::with_strategies("", Vec::new()),
        BrowserContext::default(),
        AWAIT_DELAY,
    );
    let script = SCRIPT.split("specialist").next().unwrap();

    let mut output = Vec::new();
    run_session(funnel, events, script.as_bytes(), &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("=== Aguarde ==="));
    assert!(text.contains("=== Seu Diagnóstico ==="));
    assert!(!text.contains("Fale com um especialista"));
}
