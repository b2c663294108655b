//! End-to-end tests for the AI pipeline over in-memory fakes.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use ticket_ai::{AiConfig, AiError, AiService, Embedder, TextGenerator, VectorSearch};
use ticket_store::{
    Category, CreateTicket, HandleType, InMemoryTicketStore, Priority, Status, SystemSource,
    Ticket,
};
use vector_index::ScoredTicket;

const DIM: usize = 16;

/// Deterministic bag-of-words embedding: overlapping token sets produce
/// high cosine similarity, which is all these tests need.
fn bow(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for token in text.to_lowercase().split_whitespace() {
        let mut h = DefaultHasher::new();
        token.hash(&mut h);
        v[(h.finish() as usize) % DIM] += 1.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

struct BagOfWordsEmbedder;

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(bow(text))
    }
}

struct SlowEmbedder;

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![0.0; DIM])
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("embedding provider unreachable")
    }
}

/// In-memory vector index with real cosine ranking.
#[derive(Default)]
struct MemoryIndex {
    points: RwLock<HashMap<String, Vec<f32>>>,
}

impl MemoryIndex {
    async fn len(&self) -> usize {
        self.points.read().await.len()
    }
}

#[async_trait]
impl VectorSearch for MemoryIndex {
    async fn upsert(&self, ticket_id: &str, vector: Vec<f32>) -> anyhow::Result<()> {
        self.points
            .write()
            .await
            .insert(ticket_id.to_string(), vector);
        Ok(())
    }

    async fn search(&self, vector: Vec<f32>, top_k: usize) -> anyhow::Result<Vec<ScoredTicket>> {
        let points = self.points.read().await;
        let mut hits: Vec<ScoredTicket> = points
            .iter()
            .map(|(id, v)| ScoredTicket {
                ticket_id: id.clone(),
                score: cosine(&vector, v),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn delete(&self, ticket_id: &str) -> anyhow::Result<()> {
        self.points.write().await.remove(ticket_id);
        Ok(())
    }
}

struct SlowIndex;

#[async_trait]
impl VectorSearch for SlowIndex {
    async fn upsert(&self, _ticket_id: &str, _vector: Vec<f32>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn search(&self, _vector: Vec<f32>, _top_k: usize) -> anyhow::Result<Vec<ScoredTicket>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }

    async fn delete(&self, _ticket_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

struct CannedGenerator(String);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("generation provider unreachable")
    }
}

fn short_timeouts() -> AiConfig {
    AiConfig {
        embedding_timeout: Duration::from_millis(50),
        vector_timeout: Duration::from_millis(50),
        generation_timeout: Duration::from_millis(50),
        generation_buffer: Duration::from_millis(10),
        reindex_concurrency: 2,
    }
}

fn resolved_ticket(id: &str, description: &str, handle_detail: &str) -> Ticket {
    let mut t = Ticket::new(
        id.to_string(),
        CreateTicket {
            system_source: SystemSource::OMS,
            category: Category::SystemFailure,
            description: description.to_string(),
            handle_type: HandleType::Dev,
            handle_detail: handle_detail.to_string(),
            priority: Priority::P1,
            tags: vec![],
            solution_template: None,
            assigned_to: None,
            created_by: None,
        },
    );
    t.status = Status::Completed;
    t
}

#[tokio::test]
async fn stored_ticket_is_found_by_similar_description() {
    let repo = Arc::new(InMemoryTicketStore::new());
    repo.seed([
        resolved_ticket(
            "AS-20250101-01",
            "order sync fails between WMS and OMS",
            "restarted the sync job and replayed the queue",
        ),
        resolved_ticket(
            "AS-20250101-02",
            "printer label layout broken",
            "updated the label template",
        ),
    ])
    .await;

    let index = Arc::new(MemoryIndex::default());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        None,
        repo,
    );

    assert!(
        svc.store_embedding("AS-20250101-01", "order sync fails between WMS and OMS")
            .await
    );
    assert!(
        svc.store_embedding("AS-20250101-02", "printer label layout broken")
            .await
    );

    let hits = svc
        .find_similar_tickets("order sync failure OMS WMS", 5)
        .await
        .unwrap();

    assert!(
        hits.iter().any(|c| c.ticket_id == "AS-20250101-01"),
        "stored ticket should be among the results"
    );
    let top = &hits[0];
    assert_eq!(top.ticket_id, "AS-20250101-01");
    assert!(top.score.is_some());
}

#[tokio::test]
async fn repeated_upserts_leave_one_entry() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let index = Arc::new(MemoryIndex::default());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        None,
        repo,
    );

    for _ in 0..3 {
        assert!(svc.store_embedding("AS-20250101-01", "order sync fails").await);
    }

    assert_eq!(index.len().await, 1);
}

#[tokio::test]
async fn results_are_capped_and_eligible() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let mut seed = Vec::new();
    for i in 1..=4 {
        seed.push(resolved_ticket(
            &format!("AS-20250101-0{i}"),
            "order sync fails",
            "restarted the sync job",
        ));
    }
    // Ineligible: completed but no resolution detail.
    seed.push(resolved_ticket("AS-20250101-05", "order sync fails", ""));
    // Ineligible: still open.
    let mut open = resolved_ticket("AS-20250101-06", "order sync fails", "wip");
    open.status = Status::Open;
    seed.push(open);
    repo.seed(seed).await;

    let index = Arc::new(MemoryIndex::default());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        None,
        repo,
    );
    for i in 1..=6 {
        svc.store_embedding(&format!("AS-20250101-0{i}"), "order sync fails")
            .await;
    }

    let hits = svc.find_similar_tickets("order sync fails", 2).await.unwrap();
    assert!(hits.len() <= 2);
    assert!(!hits.is_empty());
    for c in &hits {
        assert!(!c.handle_detail.is_empty());
        assert_ne!(c.ticket_id, "AS-20250101-05");
        assert_ne!(c.ticket_id, "AS-20250101-06");
    }
}

#[tokio::test]
async fn embedding_timeout_is_distinguishable() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(
        short_timeouts(),
        Some(Arc::new(SlowEmbedder)),
        Some(Arc::new(MemoryIndex::default())),
        None,
        repo,
    );

    let err = svc
        .find_similar_tickets("order sync fails", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::EmbeddingTimeout(_)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn vector_timeout_is_distinguishable() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(
        short_timeouts(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(Arc::new(SlowIndex)),
        None,
        repo,
    );

    let err = svc
        .find_similar_tickets("order sync fails", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::SearchTimeout(_)));
}

#[tokio::test]
async fn provider_failure_degrades_to_empty() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(FailingEmbedder)),
        Some(Arc::new(MemoryIndex::default())),
        None,
        repo,
    );

    let hits = svc.find_similar_tickets("order sync fails", 5).await.unwrap();
    assert!(hits.is_empty());
    assert!(!svc.store_embedding("AS-20250101-01", "order sync fails").await);
}

#[tokio::test]
async fn unconfigured_service_degrades_everywhere() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(AiConfig::default(), None, None, None, repo);

    assert!(!svc.store_embedding("AS-20250101-01", "order sync fails").await);
    assert!(!svc.remove_embedding("AS-20250101-01").await);
    assert!(
        svc.find_similar_tickets("order sync fails", 5)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(svc.generate_recommendation("AS-20250101-01").await.is_none());
    assert!(
        svc.generate_tags("order sync fails", "SYSTEM_FAILURE", "OMS")
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn empty_description_short_circuits() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(SlowEmbedder)),
        Some(Arc::new(MemoryIndex::default())),
        None,
        repo,
    );

    // A slow embedder would hang if it were called; the empty input must
    // never reach it.
    assert!(svc.find_similar_tickets("", 5).await.unwrap().is_empty());
    assert!(!svc.store_embedding("AS-20250101-01", "  ").await);
}

#[tokio::test]
async fn recommendation_returns_none_for_unknown_ticket() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(Arc::new(MemoryIndex::default())),
        Some(Arc::new(CannedGenerator("步骤".into()))),
        repo,
    );

    assert!(svc.generate_recommendation("AS-19990101-01").await.is_none());
}

#[tokio::test]
async fn recommendation_strips_fabricated_citations() {
    let repo = Arc::new(InMemoryTicketStore::new());
    repo.seed([
        resolved_ticket(
            "AS-20250101-01",
            "order sync fails between WMS and OMS",
            "restarted the sync job",
        ),
        {
            let mut current = resolved_ticket(
                "AS-20250102-01",
                "order sync fails again between WMS and OMS",
                "",
            );
            current.status = Status::Processing;
            current
        },
    ])
    .await;

    let index = Arc::new(MemoryIndex::default());
    let generated = "1. 重启同步任务\n\n**参考工单：**\n- AS-20250101-01\n- AS-19990909-09";
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        Some(Arc::new(CannedGenerator(generated.into()))),
        repo,
    );
    svc.store_embedding("AS-20250101-01", "order sync fails between WMS and OMS")
        .await;

    let text = svc.generate_recommendation("AS-20250102-01").await.unwrap();
    assert!(text.contains("AS-20250101-01"));
    assert!(!text.contains("AS-19990909-09"));
}

#[tokio::test]
async fn recommendation_survives_generator_failure() {
    let repo = Arc::new(InMemoryTicketStore::new());
    repo.seed([resolved_ticket(
        "AS-20250101-01",
        "order sync fails",
        "restarted the sync job",
    )])
    .await;

    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(Arc::new(MemoryIndex::default())),
        Some(Arc::new(FailingGenerator)),
        repo,
    );

    assert!(svc.generate_recommendation("AS-20250101-01").await.is_none());
}

#[tokio::test]
async fn tags_are_bounded_even_for_noisy_output() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let noisy = "1. 订单异常\n2. 接口超时\n3. 紧急\n4. 库存问题\n5. 数据不一致\n6. 多余标签\n这一行实在是太长了不可能当标签";
    let svc = AiService::new(
        AiConfig::default(),
        None,
        None,
        Some(Arc::new(CannedGenerator(noisy.into()))),
        repo,
    );

    let tags = svc.generate_tags("订单无法同步", "TICKET_PROCESS", "OMS").await;
    assert_eq!(tags.len(), 5);
    assert!(tags.iter().all(|t| t.chars().count() <= 10));
}

#[tokio::test]
async fn reindex_counts_outcomes() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let mut no_description = resolved_ticket("AS-20250101-03", "", "done");
    no_description.description.clear();
    repo.seed([
        resolved_ticket("AS-20250101-01", "order sync fails", "restarted"),
        resolved_ticket("AS-20250101-02", "label layout broken", "fixed template"),
        no_description,
    ])
    .await;

    let index = Arc::new(MemoryIndex::default());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        None,
        repo,
    );

    let report = svc.reindex_all().await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.indexed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(index.len().await, 2);

    // Rerunning converges on the same state.
    let report = svc.reindex_all().await.unwrap();
    assert_eq!(report.indexed, 2);
    assert_eq!(index.len().await, 2);
}

#[tokio::test]
async fn deleting_removes_from_index() {
    let repo = Arc::new(InMemoryTicketStore::new());
    let index = Arc::new(MemoryIndex::default());
    let svc = AiService::new(
        AiConfig::default(),
        Some(Arc::new(BagOfWordsEmbedder)),
        Some(index.clone()),
        None,
        repo,
    );

    svc.store_embedding("AS-20250101-01", "order sync fails").await;
    assert_eq!(index.len().await, 1);
    assert!(svc.remove_embedding("AS-20250101-01").await);
    assert_eq!(index.len().await, 0);
}
