//! 定时维护任务
//!
//! 三个周期任务：清理过期验证记录、把模板/挂件批量刷进搜索索引。
//! 每个任务独立 interval 循环，上一轮没跑完就跳过本次 tick，
//! 单轮受配置的超时约束。失败只记日志，下个 tick 重试，无退避、
//! 无抖动、任务间无顺序要求。索引刷新是幂等 upsert，不删除库里
//! 已不存在的文档（压缩留给将来的任务）。

use config::SchedulerConfig;
use domain::{DomainResult, Template, Widget};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::context::OpContext;
use crate::repository::{TemplateRepository, VerificationRepository, WidgetRepository};
use crate::search::{SearchIndex, TEMPLATES_INDEX, WIDGETS_INDEX};

/// 批量索引的分页大小
const BULK_PAGE: i64 = 500;

pub struct SchedulerDependencies {
    pub verification_repository: Arc<dyn VerificationRepository>,
    pub template_repository: Arc<dyn TemplateRepository>,
    pub widget_repository: Arc<dyn WidgetRepository>,
    pub search_index: Arc<dyn SearchIndex>,
    pub clock: Arc<dyn Clock>,
    pub config: SchedulerConfig,
}

/// 周期任务调度器，随引导流程显式装配
pub struct Scheduler {
    deps: Arc<SchedulerDependencies>,
}

impl Scheduler {
    pub fn new(deps: SchedulerDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
        }
    }

    /// 启动全部任务，返回句柄供关闭时 abort
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        let timeout = self.deps.config.job_timeout();

        let purge_deps = self.deps.clone();
        let purge = spawn_job(
            "verification.purge",
            self.deps.config.purge_period(),
            timeout,
            move || {
                let deps = purge_deps.clone();
                async move { purge_expired(&deps).await }
            },
        );

        let tpl_deps = self.deps.clone();
        let bulk_templates = spawn_job(
            "bulk.templates",
            self.deps.config.bulk_period(),
            timeout,
            move || {
                let deps = tpl_deps.clone();
                async move { bulk_index_templates(&deps).await }
            },
        );

        let widget_deps = self.deps.clone();
        let bulk_widgets = spawn_job(
            "bulk.widgets",
            self.deps.config.bulk_period(),
            timeout,
            move || {
                let deps = widget_deps.clone();
                async move { bulk_index_widgets(&deps).await }
            },
        );

        vec![purge, bulk_templates, bulk_widgets]
    }
}

/// 通用任务循环：interval + skip-if-still-running + 超时
fn spawn_job<F, Fut>(
    name: &'static str,
    period: Duration,
    job_timeout: Duration,
    make_job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = DomainResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let running = Arc::new(Mutex::new(()));

        loop {
            interval.tick().await;

            let guard = match running.clone().try_lock_owned() {
                Ok(guard) => guard,
                Err(_) => {
                    tracing::warn!(job = name, "previous run still in progress, skipping tick");
                    continue;
                }
            };

            let fut = make_job();
            tokio::spawn(async move {
                let _running = guard;
                match tokio::time::timeout(job_timeout, fut).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::warn!(job = name, error = %err, "job failed, retrying next tick");
                    }
                    Err(_) => tracing::warn!(job = name, "job timed out"),
                }
            });
        }
    })
}

async fn purge_expired(deps: &SchedulerDependencies) -> DomainResult<()> {
    let now = deps.clock.now();
    let purged = deps
        .verification_repository
        .purge_expired(&OpContext::new(), now)
        .await?;
    if purged > 0 {
        tracing::info!(purged, "removed expired verifications");
    }
    Ok(())
}

pub(crate) async fn bulk_index_templates(deps: &SchedulerDependencies) -> DomainResult<()> {
    let ctx = OpContext::new();
    let mut offset = 0i64;
    loop {
        let batch = deps
            .template_repository
            .page_all(&ctx, BULK_PAGE, offset)
            .await?;
        if batch.is_empty() {
            break;
        }
        let count = batch.len();
        let docs = batch.iter().map(template_doc).collect();
        deps.search_index.upsert(TEMPLATES_INDEX, docs).await?;
        if (count as i64) < BULK_PAGE {
            break;
        }
        offset += BULK_PAGE;
    }
    Ok(())
}

pub(crate) async fn bulk_index_widgets(deps: &SchedulerDependencies) -> DomainResult<()> {
    let ctx = OpContext::new();
    let mut offset = 0i64;
    loop {
        let batch = deps
            .widget_repository
            .page_all(&ctx, BULK_PAGE, offset)
            .await?;
        if batch.is_empty() {
            break;
        }
        let count = batch.len();
        let docs = batch.iter().map(widget_doc).collect();
        deps.search_index.upsert(WIDGETS_INDEX, docs).await?;
        if (count as i64) < BULK_PAGE {
            break;
        }
        offset += BULK_PAGE;
    }
    Ok(())
}

fn template_doc(template: &Template) -> serde_json::Value {
    json!({
        "id": template.id,
        "title": template.title,
        "description": template.description,
    })
}

fn widget_doc(widget: &Widget) -> serde_json::Value {
    json!({
        "id": widget.id,
        "title": widget.title,
        "description": widget.description,
        "widget_type": widget.widget_type,
        "tags": widget.tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::SystemClock;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn deps(
        verifications: Arc<InMemoryVerifications>,
        templates: Arc<InMemoryTemplates>,
        widgets: Arc<InMemoryWidgets>,
        search: Arc<RecordingSearch>,
    ) -> SchedulerDependencies {
        SchedulerDependencies {
            verification_repository: verifications,
            template_repository: templates,
            widget_repository: widgets,
            search_index: search,
            clock: Arc::new(SystemClock),
            config: SchedulerConfig {
                purge_period_secs: 3_600,
                bulk_period_secs: 300,
                job_timeout_secs: 60,
            },
        }
    }

    #[tokio::test]
    async fn test_bulk_index_templates_upserts_all_docs() {
        let owner = Uuid::new_v4();
        let templates = Arc::new(InMemoryTemplates::with(vec![
            sample_template(owner, "one"),
            sample_template(owner, "two"),
        ]));
        let search = Arc::new(RecordingSearch::default());
        let deps = deps(
            Arc::new(InMemoryVerifications::default()),
            templates,
            Arc::new(InMemoryWidgets::default()),
            search.clone(),
        );

        bulk_index_templates(&deps).await.unwrap();

        let upserts = search.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let (index, docs) = &upserts[0];
        assert_eq!(index, TEMPLATES_INDEX);
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.get("id").is_some()));
    }

    #[tokio::test]
    async fn test_bulk_index_widgets_carries_type_and_tags() {
        let widgets = Arc::new(InMemoryWidgets::with(vec![sample_widget("stats")]));
        let search = Arc::new(RecordingSearch::default());
        let deps = deps(
            Arc::new(InMemoryVerifications::default()),
            Arc::new(InMemoryTemplates::default()),
            widgets,
            search.clone(),
        );

        bulk_index_widgets(&deps).await.unwrap();

        let upserts = search.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].0, WIDGETS_INDEX);
        assert_eq!(upserts[0].1[0]["widget_type"], "stats");
    }

    #[tokio::test]
    async fn test_purge_removes_expired_keeps_live() {
        let verifications = Arc::new(InMemoryVerifications::default());
        let now = Utc::now();
        {
            let mut rows = verifications.rows.lock().unwrap();
            for (email, offset_hours) in
                [("a@x.io", -2), ("b@x.io", -1), ("c@x.io", -3), ("d@x.io", 2), ("e@x.io", 4)]
            {
                rows.insert(
                    email.to_string(),
                    domain::Verification {
                        email: email.to_string(),
                        login: email.to_string(),
                        nickname: email.to_string(),
                        password: vec![],
                        code: vec![],
                        expired_time: now + ChronoDuration::hours(offset_hours),
                        attempts: 3,
                    },
                );
            }
        }
        let deps = deps(
            verifications.clone(),
            Arc::new(InMemoryTemplates::default()),
            Arc::new(InMemoryWidgets::default()),
            Arc::new(RecordingSearch::default()),
        );

        purge_expired(&deps).await.unwrap();

        // 三条过期的删除，两条存活的保留
        assert_eq!(verifications.len(), 2);
        assert!(verifications.get("d@x.io").is_some());
        assert!(verifications.get("e@x.io").is_some());
    }

    #[tokio::test]
    async fn test_slow_job_never_overlaps_itself() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        let (flight, max, count) = (in_flight.clone(), max_seen.clone(), runs.clone());
        let handle = spawn_job(
            "test.slow",
            Duration::from_millis(20),
            Duration::from_secs(5),
            move || {
                let flight = flight.clone();
                let max = max.clone();
                let count = count.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    let current = flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max.fetch_max(current, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(70)).await;
                    flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        // tick 比任务快得多，但任何时刻都只有一个实例在跑
        assert!(runs.load(Ordering::SeqCst) >= 2);
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }
}
