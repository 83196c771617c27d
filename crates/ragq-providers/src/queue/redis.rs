//! Redis-backed priority job queue (§4.A, §6).
//!
//! Storage layout is bit-exact with the published Redis key schema so a
//! polyglot worker reading the same keys sees the same vocabulary:
//! `job:<id>` hashes, `queue:<class>` sorted sets, `running:<workerId>`
//! hashes.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use ragq_domain::entities::{
    Job, JobPayload, JobState, JobStatus, JobSummary, QueueClass, TaskType,
};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::{ClaimOutcome, EnqueueOutcome, QueueClient, QueueStats};

const UNKNOWN: u8 = 0;
const UP: u8 = 1;
const DOWN: u8 = 2;

/// Redis-backed implementation of [`QueueClient`].
///
/// Availability is tracked with an edge-triggered tri-state (§4.A, §9):
/// a fresh connection starts `unknown`, a successful command flips it
/// `up`, any connection-level error flips it `down`. The HTTP surface
/// reads `healthy()` rather than retrying Redis itself.
pub struct RedisQueueClient {
    conn: ConnectionManager,
    health: AtomicU8,
}

impl RedisQueueClient {
    /// Connect eagerly so construction fails fast if Redis is unreachable
    /// at startup; subsequent outages are handled by the health flag
    /// instead of propagating as connection errors.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::internal(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
        Ok(Self {
            conn,
            health: AtomicU8::new(UP),
        })
    }

    fn mark_up(&self) {
        self.health.store(UP, Ordering::Relaxed);
    }

    fn mark_down(&self) {
        self.health.store(DOWN, Ordering::Relaxed);
    }

    async fn probe(&self) -> bool {
        let mut conn = self.conn.clone();
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        let ok = pong.is_ok();
        self.health.store(if ok { UP } else { DOWN }, Ordering::Relaxed);
        ok
    }

    /// Job ids held in a `running:<workerId>` hash whose last heartbeat (or
    /// `started_at`, absent one) is older than `stale_after_secs`. Read-only:
    /// nothing reaps automatically. A worker that dies mid-job leaks its
    /// claim until an operator acts on this list.
    pub async fn reap_candidates(&self, stale_after_secs: i64) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let cutoff = now_secs() - stale_after_secs;

        let mut iter: redis::AsyncIter<'_, String> = conn
            .scan_match("running:*")
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
        let mut running_keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            running_keys.push(key);
        }
        drop(iter);

        let mut candidates = Vec::new();
        for key in running_keys {
            let job_ids: Vec<String> = conn.hkeys(&key).await.map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
            for job_id in job_ids {
                let Some(job) = read_job(&mut conn, &job_id).await? else {
                    continue;
                };
                let last_seen = job.state.last_heartbeat.or(job.state.started_at).unwrap_or(0);
                if !job.state.status.is_terminal() && last_seen < cutoff {
                    candidates.push(job_id);
                }
            }
        }
        Ok(candidates)
    }
}

#[async_trait]
impl QueueClient for RedisQueueClient {
    async fn enqueue(&self, job: &Job) -> Result<EnqueueOutcome> {
        if !self.healthy().await {
            return Ok(EnqueueOutcome::Unavailable);
        }

        let mut conn = self.conn.clone();
        let result = write_job_hash(&mut conn, job).await;
        match result {
            Ok(()) => {
                let score = -(job.priority as f64);
                let zadd: redis::RedisResult<()> = conn
                    .zadd(job.requires.queue_key(), job.id.clone(), score)
                    .await;
                match zadd {
                    Ok(()) => {
                        self.mark_up();
                        Ok(EnqueueOutcome::Enqueued(job.id.clone()))
                    }
                    Err(e) => {
                        self.mark_down();
                        Err(Error::UnavailableQueue {
                            message: e.to_string(),
                        })
                    }
                }
            }
            Err(e) => {
                self.mark_down();
                Err(e)
            }
        }
    }

    async fn claim(&self, worker_type: QueueClass, worker_id: &str) -> Result<ClaimOutcome> {
        if !self.healthy().await {
            return Ok(ClaimOutcome::Unavailable);
        }

        let mut conn = self.conn.clone();
        for queue_key in [worker_type.queue_key(), QueueClass::Any.queue_key()] {
            loop {
                // ZPOPMIN on a `-priority` score pops the numerically
                // smallest score, i.e. the largest original priority.
                // See DESIGN.md for why this uses ZPOPMIN over ZPOPMAX.
                let popped: redis::RedisResult<Vec<(String, f64)>> =
                    conn.zpopmin(&queue_key, 1).await;
                let popped = match popped {
                    Ok(p) => p,
                    Err(e) => {
                        self.mark_down();
                        return Err(Error::UnavailableQueue {
                            message: e.to_string(),
                        });
                    }
                };
                self.mark_up();
                let Some((job_id, _score)) = popped.into_iter().next() else {
                    break;
                };

                match read_job(&mut conn, &job_id).await? {
                    Some(mut job) => {
                        let now = now_secs();
                        job.state.status = JobStatus::Running;
                        job.state.started_at = Some(now);
                        job.state.worker_id = Some(worker_id.to_owned());

                        let _: () = conn
                            .hset_multiple(
                                format!("job:{job_id}"),
                                &[
                                    ("status", "running".to_owned()),
                                    ("started_at", now.to_string()),
                                    ("worker_id", worker_id.to_owned()),
                                ],
                            )
                            .await
                            .map_err(|e| Error::UnavailableQueue {
                                message: e.to_string(),
                            })?;
                        let _: () = conn
                            .hset(format!("running:{worker_id}"), &job_id, now)
                            .await
                            .map_err(|e| Error::UnavailableQueue {
                                message: e.to_string(),
                            })?;

                        return Ok(ClaimOutcome::Claimed(job));
                    }
                    // Job hash missing: cancelled/expired between enqueue
                    // and claim. Skip it and keep draining this queue.
                    None => continue,
                }
            }
        }

        Ok(ClaimOutcome::Empty)
    }

    async fn heartbeat(&self, job_id: &str, _worker_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset(format!("job:{job_id}"), "last_heartbeat", now_secs())
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })
    }

    async fn update_progress(
        &self,
        job_id: &str,
        progress: u8,
        chunks_processed: usize,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = format!("job:{job_id}");
        let current: Option<u8> = conn
            .hget(&key, "progress")
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
        let clamped = progress.max(current.unwrap_or(0));
        conn.hset_multiple(
            &key,
            &[
                ("progress", clamped.to_string()),
                ("chunks_processed", chunks_processed.to_string()),
            ],
        )
        .await
        .map_err(|e| Error::UnavailableQueue {
            message: e.to_string(),
        })
    }

    async fn complete(&self, job_id: &str, worker_id: &str, result: serde_json::Value) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(
            format!("job:{job_id}"),
            &[
                ("status".to_owned(), "completed".to_owned()),
                ("completed_at".to_owned(), now_secs().to_string()),
                ("result".to_owned(), result.to_string()),
            ],
        )
        .await
        .map_err(|e| Error::UnavailableQueue {
            message: e.to_string(),
        })?;
        conn.hdel(format!("running:{worker_id}"), job_id)
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })
    }

    async fn fail(&self, job_id: &str, worker_id: &str, error: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(
            format!("job:{job_id}"),
            &[
                ("status".to_owned(), "failed".to_owned()),
                ("failed_at".to_owned(), now_secs().to_string()),
                ("error".to_owned(), error.to_owned()),
            ],
        )
        .await
        .map_err(|e| Error::UnavailableQueue {
            message: e.to_string(),
        })?;
        conn.hdel(format!("running:{worker_id}"), job_id)
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })
    }

    async fn status(&self, job_id: &str) -> Result<Option<JobSummary>> {
        let mut conn = self.conn.clone();
        Ok(read_job(&mut conn, job_id)
            .await?
            .map(|job| JobSummary::from(&job)))
    }

    async fn stats(&self) -> Result<QueueStats> {
        let mut conn = self.conn.clone();
        let mut queued_by_class = std::collections::HashMap::new();
        for class in [QueueClass::Cpu, QueueClass::Gpu, QueueClass::Rag, QueueClass::Any] {
            let depth: u64 = conn
                .zcard(class.queue_key())
                .await
                .map_err(|e| Error::UnavailableQueue {
                    message: e.to_string(),
                })?;
            queued_by_class.insert(class, depth);
        }

        let mut running = 0u64;
        let mut iter: redis::AsyncIter<'_, String> = conn
            .scan_match("running:*")
            .await
            .map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        drop(iter);
        for key in keys {
            let len: u64 = conn.hlen(&key).await.map_err(|e| Error::UnavailableQueue {
                message: e.to_string(),
            })?;
            running += len;
        }

        Ok(QueueStats {
            queued_by_class,
            running,
        })
    }

    async fn healthy(&self) -> bool {
        match self.health.load(Ordering::Relaxed) {
            UP => true,
            DOWN => false,
            _ => self.probe().await,
        }
    }
}

async fn write_job_hash(conn: &mut ConnectionManager, job: &Job) -> Result<()> {
    let payload_json = serde_json::to_string(&job.payload)
        .map_err(|e| Error::internal(format!("failed to encode job payload: {e}")))?;
    let metadata_json = serde_json::json!({
        "source": "rag-api",
        "created_at": chrono::DateTime::from_timestamp(job.created_at, 0)
            .unwrap_or_default()
            .to_rfc3339(),
    })
    .to_string();

    conn.hset_multiple(
        format!("job:{}", job.id),
        &[
            ("task_type", task_type_wire(job.task_type)),
            ("requires", job.requires.as_str().to_owned()),
            ("priority", job.priority.to_string()),
            ("payload", payload_json),
            ("metadata", metadata_json),
            ("status", "queued".to_owned()),
            ("created_at", job.created_at.to_string()),
            ("timeout_ms", job.timeout_ms.to_string()),
            ("progress", "0".to_owned()),
            ("chunks_processed", "0".to_owned()),
        ],
    )
    .await
    .map_err(|e| Error::UnavailableQueue {
        message: e.to_string(),
    })
}

async fn read_job(conn: &mut ConnectionManager, job_id: &str) -> Result<Option<Job>> {
    let fields: std::collections::HashMap<String, String> = conn
        .hgetall(format!("job:{job_id}"))
        .await
        .map_err(|e| Error::UnavailableQueue {
            message: e.to_string(),
        })?;
    if fields.is_empty() {
        return Ok(None);
    }

    let get = |k: &str| fields.get(k).cloned();
    let payload: JobPayload = serde_json::from_str(&get("payload").unwrap_or_default())
        .map_err(|e| Error::internal(format!("malformed job payload in redis: {e}")))?;

    let job = Job {
        id: job_id.to_owned(),
        task_type: parse_task_type(&get("task_type").unwrap_or_default())?,
        requires: parse_queue_class(&get("requires").unwrap_or_default())?,
        priority: get("priority").and_then(|v| v.parse().ok()).unwrap_or(0),
        payload,
        timeout_ms: get("timeout_ms").and_then(|v| v.parse().ok()).unwrap_or(0),
        created_at: get("created_at").and_then(|v| v.parse().ok()).unwrap_or(0),
        state: JobState {
            status: parse_status(&get("status").unwrap_or_default()),
            progress: get("progress").and_then(|v| v.parse().ok()).unwrap_or(0),
            chunks_processed: get("chunks_processed")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            started_at: get("started_at").and_then(|v| v.parse().ok()),
            last_heartbeat: get("last_heartbeat").and_then(|v| v.parse().ok()),
            completed_at: get("completed_at").and_then(|v| v.parse().ok()),
            failed_at: get("failed_at").and_then(|v| v.parse().ok()),
            worker_id: get("worker_id"),
            error: get("error"),
            result: get("result").and_then(|v| serde_json::from_str(&v).ok()),
        },
    };
    Ok(Some(job))
}

fn task_type_wire(task_type: TaskType) -> String {
    match task_type {
        TaskType::RagQuery => "RAG_QUERY",
        TaskType::RagQueryFile => "RAG_QUERY_FILE",
        TaskType::ProcessFile => "PROCESS_FILE",
    }
    .to_owned()
}

fn parse_task_type(raw: &str) -> Result<TaskType> {
    match raw {
        "RAG_QUERY" => Ok(TaskType::RagQuery),
        "RAG_QUERY_FILE" => Ok(TaskType::RagQueryFile),
        "PROCESS_FILE" => Ok(TaskType::ProcessFile),
        other => Err(Error::internal(format!("unknown task_type in redis: {other}"))),
    }
}

fn parse_queue_class(raw: &str) -> Result<QueueClass> {
    match raw {
        "cpu" => Ok(QueueClass::Cpu),
        "gpu" => Ok(QueueClass::Gpu),
        "rag" => Ok(QueueClass::Rag),
        "any" => Ok(QueueClass::Any),
        other => Err(Error::internal(format!("unknown requires in redis: {other}"))),
    }
}

fn parse_status(raw: &str) -> JobStatus {
    match raw {
        "running" => JobStatus::Running,
        "completed" => JobStatus::Completed,
        "failed" => JobStatus::Failed,
        _ => JobStatus::Queued,
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as i64
}
