//! Scripted in-memory repositories for unit tests

use async_trait::async_trait;
use ilab_client::{ClientError, Result};
use ilab_core::domain::pipeline::{Pipeline, PipelineId};
use ilab_core::domain::run::{Run, RunError, RunId, RuntimeState};
use ilab_core::dto::run::CreateRun;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::repository::{PipelineRepository, RunRepository};

pub fn pipeline(id: &str, name: &str, created_at: Option<&str>) -> Pipeline {
    Pipeline {
        id: PipelineId::new(id),
        display_name: name.to_string(),
        description: None,
        created_at: created_at.map(|ts| ts.parse().unwrap()),
    }
}

pub fn run(id: &str, state: RuntimeState) -> Run {
    Run {
        run_id: RunId::new(id),
        display_name: None,
        pipeline_version_reference: None,
        state,
        created_at: None,
        finished_at: None,
        error: None,
    }
}

pub struct FakePipelines {
    pipelines: Vec<Pipeline>,
    failure: Option<u16>,
    pub calls: AtomicUsize,
}

impl FakePipelines {
    pub fn new(pipelines: Vec<Pipeline>) -> Self {
        Self {
            pipelines,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl PipelineRepository for FakePipelines {
    async fn find_by_display_name(&self, name: &str) -> Result<Vec<Pipeline>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failure {
            return Err(ClientError::api_error(status, "listing failed"));
        }
        Ok(self
            .pipelines
            .iter()
            .filter(|p| p.display_name == name)
            .cloned()
            .collect())
    }
}

/// One scripted answer to a status read
#[derive(Debug, Clone)]
pub enum Read {
    State(RuntimeState),
    Failed(&'static str),
    Transient,
    Api(u16),
}

/// Scripted run server
///
/// Creation answers are consumed in order. Reads are consumed in order, and
/// the last one repeats forever.
pub struct FakeRuns {
    creates: Mutex<VecDeque<std::result::Result<&'static str, (u16, &'static str)>>>,
    reads: Mutex<VecDeque<Read>>,
    pub created: Mutex<Vec<CreateRun>>,
    pub read_calls: AtomicUsize,
}

impl FakeRuns {
    pub fn new(
        creates: Vec<std::result::Result<&'static str, (u16, &'static str)>>,
        reads: Vec<Read>,
    ) -> Self {
        Self {
            creates: Mutex::new(creates.into()),
            reads: Mutex::new(reads.into()),
            created: Mutex::new(Vec::new()),
            read_calls: AtomicUsize::new(0),
        }
    }

    pub fn reads(reads: Vec<Read>) -> Self {
        Self::new(Vec::new(), reads)
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

#[async_trait]
impl RunRepository for FakeRuns {
    async fn create_run(&self, req: &CreateRun) -> Result<Run> {
        self.created.lock().unwrap().push(req.clone());
        let next = self.creates.lock().unwrap().pop_front();
        match next {
            Some(Ok(id)) => Ok(run(id, RuntimeState::Pending)),
            Some(Err((status, body))) => Err(ClientError::api_error(status, body)),
            None => Err(ClientError::api_error(500, "no scripted create")),
        }
    }

    async fn get_run(&self, run_id: &RunId) -> Result<Run> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut reads = self.reads.lock().unwrap();
            if reads.len() > 1 {
                reads.pop_front()
            } else {
                reads.front().cloned()
            }
        };

        match step {
            Some(Read::State(state)) => Ok(run(run_id.as_str(), state)),
            Some(Read::Failed(message)) => {
                let mut failed = run(run_id.as_str(), RuntimeState::Failed);
                failed.error = Some(RunError {
                    code: Some(2),
                    message: Some(message.to_string()),
                });
                Ok(failed)
            }
            Some(Read::Transient) => Err(ClientError::ParseError("connection reset".into())),
            Some(Read::Api(status)) => Err(ClientError::api_error(status, "read rejected")),
            None => Err(ClientError::NotFound(run_id.to_string())),
        }
    }
}
