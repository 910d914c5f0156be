//! Behavioural tests for AnchorService with scripted signer and ledger fakes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anchor_core::{
    AnchorAccount, DecisionRecord, DecisionTimestamp, FailureKind, Finality, Network,
    DISABLED_MESSAGE,
};
use anchor_ledger::{ConfirmationPolicy, LedgerClient, LedgerError};
use anchor_service::{AnchorConfig, AnchorError, AnchorService, RatePolicy, Sleeper};
use anchor_signer::{RemoteSigner, SignerError};
use async_trait::async_trait;

const ADDRESS: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

// ── Fakes ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeSigner {
    frozen: bool,
    missing: bool,
    submits: Mutex<VecDeque<Result<String, SignerError>>>,
    fetch_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    amounts: Mutex<Vec<u64>>,
}

impl FakeSigner {
    fn scripted(results: Vec<Result<String, SignerError>>) -> Self {
        Self {
            submits: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn calls(&self) -> (usize, usize) {
        (
            self.fetch_calls.load(Ordering::SeqCst),
            self.submit_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl RemoteSigner for FakeSigner {
    fn handle(&self) -> &str {
        "ops-bot"
    }

    async fn fetch_account(&self, handle: &str) -> Result<AnchorAccount, SignerError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing {
            return Err(SignerError::AccountNotFound {
                handle: handle.to_string(),
            });
        }
        Ok(AnchorAccount {
            handle: handle.to_string(),
            address: ADDRESS.to_string(),
            network: Network::Devnet,
            frozen: self.frozen,
            created_at: None,
        })
    }

    async fn submit_self_transfer(
        &self,
        account: &AnchorAccount,
        amount: u64,
    ) -> Result<String, SignerError> {
        assert_eq!(account.address, ADDRESS);
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.amounts.lock().unwrap().push(amount);
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("sig-{n}")))
    }
}

#[derive(Default)]
struct FakeLedger {
    confirms: Mutex<VecDeque<Result<(), LedgerError>>>,
    known: Vec<String>,
    lookup_down: bool,
    confirm_calls: AtomicUsize,
    finalities: Mutex<Vec<Finality>>,
    policies: Mutex<Vec<ConfirmationPolicy>>,
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn await_confirmation(
        &self,
        _reference: &str,
        finality: Finality,
        policy: &ConfirmationPolicy,
    ) -> Result<(), LedgerError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        self.finalities.lock().unwrap().push(finality);
        self.policies.lock().unwrap().push(*policy);
        self.confirms.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn lookup(&self, reference: &str) -> Result<bool, LedgerError> {
        if self.lookup_down {
            return Err(LedgerError::Transport {
                method: "getTransaction".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(self.known.iter().any(|k| k == reference))
    }

    async fn balance(&self, _address: &str) -> Result<u64, LedgerError> {
        Ok(1_500_000_000)
    }
}

#[derive(Default)]
struct RecordingSleeper(Mutex<Vec<Duration>>);

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

fn decision(id: &str, cost: f64, score: f64) -> DecisionRecord {
    DecisionRecord::builder(id)
        .label(format!("Route {id}"))
        .origin("Shanghai")
        .destination("Rotterdam")
        .cost(cost)
        .score(score)
        .duration_hours(720.0)
        .decided_at(DecisionTimestamp::parse("2024-01-01T00:00:00.000Z").unwrap())
        .build()
        .unwrap()
}

fn service(
    signer: Arc<FakeSigner>,
    ledger: Arc<FakeLedger>,
    config: AnchorConfig,
) -> (AnchorService, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let svc = AnchorService::new(signer, ledger, config)
        .with_rate_policy(RatePolicy::new(config.min_interval).with_sleeper(sleeper.clone()));
    (svc, sleeper)
}

// ── anchor_decision ──────────────────────────────────────────────────

#[tokio::test]
async fn anchor_success_yields_reference_and_explorer_url() {
    let signer = Arc::new(FakeSigner::scripted(vec![Ok("5sig".into())]));
    let ledger = Arc::new(FakeLedger::default());
    let (svc, _) = service(signer.clone(), ledger.clone(), AnchorConfig::default());

    let receipt = svc.anchor_decision(&decision("route-42", 1523.50, 87.5)).await;

    assert!(receipt.success());
    assert_eq!(receipt.transaction_ref(), Some("5sig"));
    assert_eq!(
        receipt.explorer_url(),
        Some("https://explorer.solana.com/tx/5sig?cluster=devnet")
    );
    assert!(receipt.error().is_none());
    assert!(receipt.failure().is_none());
    assert!(receipt.unconfirmed_ref().is_none());
    assert_eq!(receipt.record().decision_id, "route-42");
    assert!(receipt.record().hash_matches());
    assert_eq!(signer.calls(), (1, 1));
    assert_eq!(*signer.amounts.lock().unwrap(), vec![1]);
    assert_eq!(*ledger.finalities.lock().unwrap(), vec![Finality::Confirmed]);
}

#[tokio::test]
async fn success_and_failure_carry_identical_record() {
    let d = decision("route-42", 1523.50, 87.5);

    let ok_signer = Arc::new(FakeSigner::default());
    let (ok_svc, _) = service(ok_signer, Arc::new(FakeLedger::default()), AnchorConfig::default());
    let ok = ok_svc.anchor_decision(&d).await;

    let bad_signer = Arc::new(FakeSigner::scripted(vec![Err(SignerError::SigningRejected {
        endpoint: "wallets/ops-bot/actions/transfer".into(),
        status: 400,
        body: "insufficient funds".into(),
    })]));
    let (bad_svc, _) = service(bad_signer, Arc::new(FakeLedger::default()), AnchorConfig::default());
    let bad = bad_svc.anchor_decision(&d).await;

    assert!(ok.success());
    assert!(!bad.success());
    assert_eq!(ok.record(), bad.record());
    assert_eq!(bad.failure(), Some(FailureKind::SigningRejected));
    assert!(bad.error().unwrap().contains("insufficient funds"));
    assert!(bad.transaction_ref().is_none());
}

#[tokio::test]
async fn disabled_returns_failure_without_network_calls() {
    let signer = Arc::new(FakeSigner::default());
    let ledger = Arc::new(FakeLedger::default());
    let (svc, _) = service(signer.clone(), ledger.clone(), AnchorConfig::disabled());

    let d = decision("route-7", 900.0, 92.0);
    let receipt = svc.anchor_decision(&d).await;

    assert!(!receipt.success());
    assert_eq!(receipt.error(), Some(DISABLED_MESSAGE));
    assert_eq!(receipt.failure(), Some(FailureKind::Disabled));
    assert_eq!(receipt.record().decision_hash, d.hash());
    assert_eq!(signer.calls(), (0, 0));
    assert_eq!(ledger.confirm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(svc.metrics().snapshot().disabled, 1);
    assert_eq!(svc.metrics().snapshot().attempts, 0);
}

#[tokio::test]
async fn frozen_account_fails_fast_without_submission() {
    let signer = Arc::new(FakeSigner {
        frozen: true,
        ..FakeSigner::default()
    });
    let ledger = Arc::new(FakeLedger::default());
    let (svc, _) = service(signer.clone(), ledger.clone(), AnchorConfig::default());

    let receipt = svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;

    assert!(!receipt.success());
    assert_eq!(receipt.failure(), Some(FailureKind::AccountFrozen));
    assert!(receipt.error().unwrap().contains("frozen"));
    assert_eq!(signer.calls(), (1, 0));
    assert_eq!(ledger.confirm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(svc.metrics().snapshot().frozen_rejections, 1);
}

#[tokio::test]
async fn missing_account_is_account_not_found() {
    let signer = Arc::new(FakeSigner {
        missing: true,
        ..FakeSigner::default()
    });
    let (svc, _) = service(signer.clone(), Arc::new(FakeLedger::default()), AnchorConfig::default());

    let receipt = svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;
    assert_eq!(receipt.failure(), Some(FailureKind::AccountNotFound));
    assert_eq!(signer.calls(), (1, 0));
}

#[tokio::test]
async fn confirmation_timeout_is_ambiguous_and_not_retried() {
    let signer = Arc::new(FakeSigner::scripted(vec![Ok("5sig".into())]));
    let ledger = Arc::new(FakeLedger {
        confirms: Mutex::new(
            vec![Err(LedgerError::ConfirmationTimeout {
                reference: "5sig".into(),
                waited_ms: 30_000,
            })]
            .into(),
        ),
        ..FakeLedger::default()
    });
    let (svc, _) = service(signer.clone(), ledger, AnchorConfig::default());

    let receipt = svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;

    let kind = receipt.failure().unwrap();
    assert_eq!(kind, FailureKind::ConfirmationTimeout);
    assert!(kind.is_ambiguous());
    assert!(receipt.error().unwrap().contains("5sig"));
    assert_eq!(receipt.unconfirmed_ref(), Some("5sig"));
    assert!(receipt.transaction_ref().is_none());
    assert_eq!(signer.calls(), (1, 1));
}

#[tokio::test]
async fn no_reference_returned_skips_confirmation() {
    let signer = Arc::new(FakeSigner::scripted(vec![Err(
        SignerError::NoReferenceReturned {
            endpoint: "wallets/ops-bot/actions/transfer".into(),
            detail: "response has no txHash".into(),
        },
    )]));
    let ledger = Arc::new(FakeLedger::default());
    let (svc, _) = service(signer, ledger.clone(), AnchorConfig::default());

    let receipt = svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;
    assert_eq!(receipt.failure(), Some(FailureKind::NoReferenceReturned));
    assert_eq!(ledger.confirm_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn requested_finality_is_passed_to_ledger() {
    let ledger = Arc::new(FakeLedger::default());
    let config = AnchorConfig::default().with_finality(Finality::Finalized);
    let (svc, _) = service(Arc::new(FakeSigner::default()), ledger.clone(), config);

    svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;
    assert_eq!(*ledger.finalities.lock().unwrap(), vec![Finality::Finalized]);
}

#[tokio::test]
async fn configured_confirmation_policy_reaches_ledger() {
    let ledger = Arc::new(FakeLedger::default());
    let policy = ConfirmationPolicy {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(250),
    };
    let config = AnchorConfig::default().with_confirmation(policy);
    let (svc, _) = service(Arc::new(FakeSigner::default()), ledger.clone(), config);

    svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;
    assert_eq!(*ledger.policies.lock().unwrap(), vec![policy]);
}

#[tokio::test]
async fn each_attempt_gets_a_fresh_id() {
    let (svc, _) = service(
        Arc::new(FakeSigner::default()),
        Arc::new(FakeLedger::default()),
        AnchorConfig::default(),
    );
    let d = decision("route-42", 1.0, 2.0);
    let a = svc.anchor_decision(&d).await;
    let b = svc.anchor_decision(&d).await;
    assert_ne!(a.attempt_id(), b.attempt_id());
    assert_eq!(a.record(), b.record());
}

#[tokio::test]
async fn receipt_serializes_for_audit_log() {
    let (svc, _) = service(
        Arc::new(FakeSigner::scripted(vec![Ok("5sig".into())])),
        Arc::new(FakeLedger::default()),
        AnchorConfig::default(),
    );
    let receipt = svc.anchor_decision(&decision("route-42", 1523.5, 87.5)).await;
    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["transaction_ref"], "5sig");
    assert_eq!(json["record"]["decided_at"], "2024-01-01T00:00:00.000Z");
    assert!(json.get("error").is_none());
}

// ── anchor_alternatives ──────────────────────────────────────────────

#[tokio::test]
async fn batch_preserves_order_and_partial_failures() {
    let signer = Arc::new(FakeSigner::scripted(vec![
        Ok("sig-a".into()),
        Err(SignerError::UpstreamUnavailable {
            endpoint: "wallets/ops-bot/actions/transfer".into(),
            reason: "HTTP 503".into(),
        }),
        Ok("sig-c".into()),
    ]));
    let (svc, sleeper) = service(signer.clone(), Arc::new(FakeLedger::default()), AnchorConfig::default());

    let decisions = vec![
        decision("a", 100.0, 90.0),
        decision("b", 200.0, 80.0),
        decision("c", 300.0, 70.0),
    ];
    let receipts = svc.anchor_alternatives(&decisions).await;

    assert_eq!(receipts.len(), 3);
    let ids: Vec<_> = receipts.iter().map(|r| r.record().decision_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(receipts[0].transaction_ref(), Some("sig-a"));
    assert_eq!(receipts[1].failure(), Some(FailureKind::UpstreamUnavailable));
    assert!(receipts[1].failure().unwrap().is_transient());
    assert_eq!(receipts[2].transaction_ref(), Some("sig-c"));
    assert_eq!(signer.calls(), (3, 3));

    assert_eq!(*sleeper.0.lock().unwrap(), vec![Duration::from_secs(1); 2]);

    let snap = svc.metrics().snapshot();
    assert_eq!((snap.attempts, snap.anchored, snap.failed), (3, 2, 1));
}

#[tokio::test]
async fn empty_batch_returns_empty() {
    let (svc, sleeper) = service(
        Arc::new(FakeSigner::default()),
        Arc::new(FakeLedger::default()),
        AnchorConfig::default(),
    );
    assert!(svc.anchor_alternatives(&[]).await.is_empty());
    assert!(sleeper.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn batch_uses_configured_interval() {
    let config = AnchorConfig::default().with_min_interval(Duration::from_millis(250));
    let (svc, sleeper) = service(
        Arc::new(FakeSigner::default()),
        Arc::new(FakeLedger::default()),
        config,
    );
    svc.anchor_alternatives(&[decision("a", 1.0, 1.0), decision("b", 2.0, 2.0)])
        .await;
    assert_eq!(*sleeper.0.lock().unwrap(), vec![Duration::from_millis(250)]);
}

#[tokio::test]
async fn disabled_batch_does_not_pause() {
    let (svc, sleeper) = service(
        Arc::new(FakeSigner::default()),
        Arc::new(FakeLedger::default()),
        AnchorConfig::disabled(),
    );
    let receipts = svc
        .anchor_alternatives(&[decision("a", 1.0, 1.0), decision("b", 2.0, 2.0)])
        .await;
    assert_eq!(receipts.len(), 2);
    assert!(receipts.iter().all(|r| r.failure() == Some(FailureKind::Disabled)));
    assert!(sleeper.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_callers_are_serialized() {
    let signer = Arc::new(FakeSigner::default());
    let (svc, _) = service(signer.clone(), Arc::new(FakeLedger::default()), AnchorConfig::default());
    let svc = Arc::new(svc);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move {
                svc.anchor_decision(&decision(&format!("r{i}"), i as f64, 1.0))
                    .await
            })
        })
        .collect();

    let mut refs = Vec::new();
    for h in handles {
        let receipt = h.await.unwrap();
        assert!(receipt.success());
        refs.push(receipt.transaction_ref().unwrap().to_string());
    }
    refs.sort();
    assert_eq!(refs, ["sig-0", "sig-1", "sig-2", "sig-3"]);
}

// ── verify_decision ──────────────────────────────────────────────────

#[tokio::test]
async fn verify_known_reference() {
    let ledger = Arc::new(FakeLedger {
        known: vec!["5sig".into()],
        ..FakeLedger::default()
    });
    let (svc, _) = service(Arc::new(FakeSigner::default()), ledger, AnchorConfig::default());
    assert!(svc.verify_decision("5sig").await);
    assert!(!svc.verify_decision("unknown").await);
    assert!(!svc.verify_decision("").await);
}

#[tokio::test]
async fn verify_transport_failure_is_false() {
    let ledger = Arc::new(FakeLedger {
        known: vec!["5sig".into()],
        lookup_down: true,
        ..FakeLedger::default()
    });
    let (svc, _) = service(Arc::new(FakeSigner::default()), ledger, AnchorConfig::default());
    assert!(!svc.verify_decision("5sig").await);
}

// ── status / initialize ──────────────────────────────────────────────

#[tokio::test]
async fn status_reads_through_account_and_balance() {
    let signer = Arc::new(FakeSigner {
        frozen: true,
        ..FakeSigner::default()
    });
    let (svc, _) = service(signer, Arc::new(FakeLedger::default()), AnchorConfig::default());

    let status = svc.status().await.unwrap();
    assert!(status.enabled);
    assert!(status.frozen);
    assert_eq!(status.address, ADDRESS);
    assert_eq!(status.network, Network::Devnet);
    assert_eq!(status.balance_lamports, 1_500_000_000);
    assert!((status.balance - 1.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn status_reports_disabled_but_still_reads_account() {
    let signer = Arc::new(FakeSigner::default());
    let (svc, _) = service(signer.clone(), Arc::new(FakeLedger::default()), AnchorConfig::disabled());
    let status = svc.status().await.unwrap();
    assert!(!status.enabled);
    assert_eq!(signer.calls(), (1, 0));
}

#[tokio::test]
async fn status_propagates_signer_errors() {
    let signer = Arc::new(FakeSigner {
        missing: true,
        ..FakeSigner::default()
    });
    let (svc, _) = service(signer, Arc::new(FakeLedger::default()), AnchorConfig::default());
    let err = svc.status().await.unwrap_err();
    assert!(matches!(err, AnchorError::Signer(SignerError::AccountNotFound { .. })));
    assert_eq!(err.kind(), FailureKind::AccountNotFound);
}

#[tokio::test]
async fn initialize_with_frozen_account_stays_usable() {
    let signer = Arc::new(FakeSigner {
        frozen: true,
        ..FakeSigner::default()
    });
    let (svc, _) = service(signer, Arc::new(FakeLedger::default()), AnchorConfig::default());
    let status = svc.initialize().await.unwrap();
    assert!(status.frozen);
    // Still callable; the attempt is refused per-attempt.
    let receipt = svc.anchor_decision(&decision("route-42", 1.0, 2.0)).await;
    assert_eq!(receipt.failure(), Some(FailureKind::AccountFrozen));
}
