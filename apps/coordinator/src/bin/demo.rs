// [apps/coordinator/src/bin/demo.rs]
//! Demo CLI: drives one complete evidence lifecycle in-process, against
//! the same engines `main.rs` wires up behind HTTP, without opening a
//! socket. Exists to exercise the three terminal scenarios from
//! spec.md §8 end-to-end for a human reading the output, not as a
//! supported integration surface — per spec.md §1 this is deliberately
//! thin and out of scope for the core design.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use whistlechain_core_wallet::Wallet;
use whistlechain_domain_models::{AuditTxReferences, Category, EvidenceItem, LifecycleStatus, Verdict};
use whistlechain_inspector_registry::{InspectorRegistry, NewInspector};
use whistlechain_ledger_client::LedgerClient;
use whistlechain_object_store::ObjectStoreClient;
use whistlechain_publication::PublishRequest;
use whistlechain_resolution::ResolutionEngine;
use whistlechain_sealed_bundle::{new_key, seal, SealedFile};
use whistlechain_submission_store::SubmissionStore;
use whistlechain_verification::VerificationEngine;
use whistlechain_audit::AuditEngine;
use whistlechain_bounty::BountyEngine;

#[derive(Copy, Clone, ValueEnum)]
enum Scenario {
    /// Unanimous AUTHENTIC panel: stake released, bounty paid, case published.
    Verified,
    /// Unanimous FAKE panel: stake forfeited, no bounty.
    Rejected,
    /// Split panel: no threshold reached, stake locked.
    Disputed,
}

#[derive(Parser)]
#[command(about = "Runs one complete evidence lifecycle against the in-process coordinator engines")]
struct Args {
    #[arg(value_enum, default_value = "verified")]
    scenario: Scenario,
}

#[tokio::main]
async fn main() -> ExitCode {
    whistlechain_telemetry::init_tracing("whistlechain_demo");
    let args = Args::parse();

    match run(args.scenario).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("demo run failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(scenario: Scenario) -> anyhow::Result<()> {
    let ledger = LedgerClient::new(1);
    let object_store = ObjectStoreClient::new(None);
    let submissions = SubmissionStore::new();
    let inspectors = InspectorRegistry::new();
    let verification = VerificationEngine::new();
    let resolution = ResolutionEngine::new();
    let bounty = BountyEngine::new();
    let audit = AuditEngine::new();
    let publication = whistlechain_publication::PublicationEngine::new();

    println!("== registering three FINANCIAL-specialized inspectors ==");
    let mut panel_wallets = Vec::new();
    for i in 0..3 {
        let wallet = Wallet::generate();
        let address = wallet.address();
        inspectors.register(NewInspector {
            wallet: address.clone(),
            display_name: format!("Inspector {i}"),
            specializations: vec![Category::Financial],
            department: "Oversight Bureau".into(),
            employee_id: format!("EMP-{i:03}"),
            jurisdiction: "National".into(),
            experience_years: 5,
        })?;
        panel_wallets.push(address);
        println!("  registered {}", panel_wallets[i].as_str());
    }

    println!("== submitting evidence ==");
    let submitter = Wallet::generate();
    let stake_micro = 25_000_000u64;
    let files = vec![SealedFile {
        name: "statement.pdf".into(),
        content: b"alleged misappropriation of public funds".to_vec(),
    }];
    let key = new_key();
    let bundle = seal(&key, &files)?;
    let pin = object_store.put("evidence-bundle.bin", &bundle).await;

    let submitted_at = chrono::Utc::now();
    let receipt = ledger
        .submit_with_stake(
            2026,
            "FINANCIAL",
            &pin.content_id,
            &submitter.address(),
            submitter.verifying_key().as_bytes(),
            stake_micro,
            submitted_at.timestamp(),
        )
        .await?;
    let evidence_id = receipt.evidence_id.clone();
    println!("  evidence id {evidence_id}, tx {}", receipt.tx_id);

    let evidence = EvidenceItem {
        id: evidence_id.clone(),
        category: Category::Financial,
        target_organization: "Acme Municipal Works".into(),
        description: "Invoices inflated by 40% over three fiscal quarters".into(),
        submitter_wallet: submitter.address(),
        stake_micro,
        content_id: pin.content_id,
        content_id_is_real: pin.is_real,
        submitted_at,
        status: LifecycleStatus::Pending,
        submission_tx_id: Some(receipt.tx_id),
        on_chain_error: None,
    };
    submissions.insert(evidence.clone())?;

    println!("== opening verification ==");
    let session = verification.begin_verification(&evidence_id, Category::Financial, &inspectors)?;
    submissions.advance_status(&evidence_id, LifecycleStatus::UnderVerification)?;
    ledger.begin_verification(&evidence_id, &session.panel).await?;

    let verdicts: [Verdict; 3] = match scenario {
        Scenario::Verified => [Verdict::Authentic, Verdict::Authentic, Verdict::Authentic],
        Scenario::Rejected => [Verdict::Fake, Verdict::Fake, Verdict::Fake],
        Scenario::Disputed => [Verdict::Authentic, Verdict::Fake, Verdict::Inconclusive],
    };

    println!("== commit phase ==");
    let now = chrono::Utc::now();
    for (i, wallet) in session.panel.iter().enumerate() {
        let nonce = format!("nonce-{i}-{evidence_id}");
        let hash = whistlechain_verification::generate_commit_hash(verdicts[i], &nonce);
        verification.commit(&evidence_id, wallet, hash, now)?;
        ledger.commit(&evidence_id, wallet, &hash).await?;
    }

    println!("== reveal phase ==");
    for (i, wallet) in session.panel.iter().enumerate() {
        let nonce = format!("nonce-{i}-{evidence_id}");
        verification.reveal(&evidence_id, wallet, verdicts[i], &nonce, "cid-justification-detail", now)?;
        ledger.reveal(&evidence_id, wallet, verdicts[i].code(), &nonce).await?;
    }

    println!("== finalizing ==");
    let (session, verdict) = verification.finalize(&evidence_id, &inspectors)?;
    ledger.finalize(&evidence_id, &verdict.to_string()).await?;
    submissions.advance_status(&evidence_id, LifecycleStatus::Finalized { verdict })?;
    println!("  final verdict: {verdict:?}");

    println!("== resolving ==");
    let resolution_record = resolution.resolve(&evidence_id, verdict, &submissions, &ledger).await?;
    submissions.advance_status(&evidence_id, LifecycleStatus::Resolved)?;
    println!("  action: {:?}, refund: {} micro", resolution_record.action, resolution_record.refund_micro);

    println!("== bounty ==");
    let bounty_record = bounty.register(
        &evidence_id,
        evidence.submitter_wallet.clone(),
        evidence.category,
        verdict,
        evidence.stake_micro,
    )?;
    println!("  payout: {} micro, status {:?}", bounty_record.payout_micro, bounty_record.status);

    if matches!(scenario, Scenario::Verified) {
        println!("== publishing audit + public notice ==");
        let tx_references = AuditTxReferences {
            submission_tx_id: evidence.submission_tx_id.clone(),
            verification_tx_id: None,
            finalize_tx_id: None,
            resolution_tx_id: resolution_record.ledger_tx_id.clone(),
            publish_tx_id: None,
            audit_summary_tx_id: None,
        };
        let audit_record = audit.publish(&evidence, &session, &resolution_record, &inspectors, tx_references)?;
        ledger.publish(&evidence_id, &serde_json::to_vec(&audit_record)?).await?;
        submissions.advance_status(&evidence_id, LifecycleStatus::Published)?;

        let publication_record = publication.publish_all(PublishRequest {
            evidence_id: &evidence_id,
            category: evidence.category,
            organization: &evidence.target_organization,
            description: &evidence.description,
            content_id: &evidence.content_id,
            verdict,
        })?;
        println!("  filed under {}", publication_record.rti_reference);
    }

    println!("== done ==");
    Ok(())
}
