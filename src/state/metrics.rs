use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by every query of an inferrer
#[derive(Debug, Default)]
pub struct InferenceMetrics {
    pub queries: AtomicUsize,
    pub expressions_inferred: AtomicUsize,
    pub guard_hits: AtomicUsize,
    pub depth_limit_hits: AtomicUsize,
    pub cancellations: AtomicUsize,
    pub module_resolutions: AtomicUsize,
    pub module_failures: AtomicUsize,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.queries.store(0, Ordering::SeqCst);
        self.expressions_inferred.store(0, Ordering::SeqCst);
        self.guard_hits.store(0, Ordering::SeqCst);
        self.depth_limit_hits.store(0, Ordering::SeqCst);
        self.cancellations.store(0, Ordering::SeqCst);
        self.module_resolutions.store(0, Ordering::SeqCst);
        self.module_failures.store(0, Ordering::SeqCst);
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_expression(&self) {
        self.expressions_inferred.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_guard_hit(&self) {
        self.guard_hits.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_depth_limit(&self) {
        self.depth_limit_hits.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_module_resolution(&self, resolved: bool) {
        self.module_resolutions.fetch_add(1, Ordering::SeqCst);
        if !resolved {
            self.module_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn module_hit_rate(&self) -> f64 {
        let total = self.module_resolutions.load(Ordering::SeqCst);
        if total == 0 {
            return 1.0;
        }
        let failures = self.module_failures.load(Ordering::SeqCst);
        (total - failures) as f64 / total as f64
    }

    pub fn summary(&self) -> MetricSummary {
        MetricSummary {
            queries: self.queries.load(Ordering::SeqCst),
            expressions_inferred: self.expressions_inferred.load(Ordering::SeqCst),
            guard_hits: self.guard_hits.load(Ordering::SeqCst),
            depth_limit_hits: self.depth_limit_hits.load(Ordering::SeqCst),
            cancellations: self.cancellations.load(Ordering::SeqCst),
            module_resolutions: self.module_resolutions.load(Ordering::SeqCst),
            module_hit_rate: self.module_hit_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub queries: usize,
    pub expressions_inferred: usize,
    pub guard_hits: usize,
    pub depth_limit_hits: usize,
    pub cancellations: usize,
    pub module_resolutions: usize,
    pub module_hit_rate: f64,
}

impl MetricSummary {
    pub fn format(&self) -> String {
        format!(
            r#"=== Inference Metrics ===
Queries: {}
Expressions Inferred: {}
Recursion Guard Hits: {}
Depth Limit Hits: {}
Cancelled Queries: {}
Module Resolutions: {} (hit rate: {:.1}%)"#,
            self.queries,
            self.expressions_inferred,
            self.guard_hits,
            self.depth_limit_hits,
            self.cancellations,
            self.module_resolutions,
            self.module_hit_rate * 100.0
        )
    }
}
