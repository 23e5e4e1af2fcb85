// Scripted report source for controller and shell tests
use crate::application::report_source::ReportSource;
use crate::domain::error::FetchError;
use crate::domain::report::{ReportKind, ReportPayload};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct Step {
    delay: Duration,
    result: Result<ReportPayload, FetchError>,
}

/// Answers each fetch with the next scripted step for that report, or with
/// an immediate empty payload (or failure, for reports marked failing) once
/// the script runs out.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<HashMap<ReportKind, VecDeque<Step>>>,
    failing: Mutex<HashSet<ReportKind>>,
    calls: Mutex<HashMap<ReportKind, usize>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(
        &self,
        kind: ReportKind,
        delay: Duration,
        result: Result<ReportPayload, FetchError>,
    ) {
        self.steps
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(Step { delay, result });
    }

    pub fn fail_always(&self, kind: ReportKind) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn calls(&self, kind: ReportKind) -> usize {
        self.calls.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ReportSource for ScriptedSource {
    async fn fetch(&self, kind: ReportKind) -> Result<ReportPayload, FetchError> {
        *self.calls.lock().unwrap().entry(kind).or_default() += 1;

        let step = self
            .steps
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(|steps| steps.pop_front());

        match step {
            Some(step) => {
                tokio::time::sleep(step.delay).await;
                step.result
            }
            None if self.failing.lock().unwrap().contains(&kind) => {
                Err(FetchError::Network("connection refused".to_string()))
            }
            None => Ok(ReportPayload::empty(kind)),
        }
    }
}
