use std::time::{Duration, Instant};

use log::{info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// The first failing step aborts the job.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step executes successfully
    /// - `Err(BatchError)` with the error of the first failing step
    fn run(&self) -> JobResult<JobExecution>;
}

/// Represents the execution of a job.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
    /// One entry per executed step, in execution order
    pub step_executions: Vec<StepExecution>,
}

/// Represents an instance of a job.
///
/// A job instance is created through the `JobBuilder` and executed by calling
/// the `run` method. The steps are executed in the order they were added.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
}

impl JobInstance<'_> {
    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Job for JobInstance<'_> {
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        let mut step_executions = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);
            step_executions.push(step_execution);

            // If a step fails, abort the job and return its error
            if let Err(error) = result {
                warn!("Job {} aborted: {}", self.name, error);
                return Err(error);
            }
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            step_executions,
        })
    }
}

/// Builder for creating a job instance.
///
/// # Example
///
/// ```
/// use markup_batch_rs::core::job::{Job, JobBuilder};
/// use markup_batch_rs::core::payload::Payload;
/// use markup_batch_rs::core::step::StepBuilder;
/// use markup_batch_rs::tasklet::xml::{DeserializeXmlTaskletBuilder, SerializeXmlTaskletBuilder};
///
/// let payload = Payload::new().with_register("doc", "<r><id>1</id></r>");
///
/// let read = DeserializeXmlTaskletBuilder::new()
///     .register("doc")
///     .payload(&payload)
///     .build()
///     .unwrap();
/// let write = SerializeXmlTaskletBuilder::new()
///     .register("doc")
///     .root_name("record")
///     .payload(&payload)
///     .build()
///     .unwrap();
///
/// let read_step = StepBuilder::new("read").tasklet(&read).build();
/// let write_step = StepBuilder::new("write").tasklet(&write).build();
///
/// let job = JobBuilder::new()
///     .name("rewrap".to_string())
///     .start(&read_step)
///     .next(&write_step)
///     .build();
///
/// let execution = job.run().unwrap();
/// assert_eq!(execution.step_executions.len(), 2);
/// assert_eq!(payload.get("doc").as_text(), Some("<record>\n  <id>1</id>\n</record>\n"));
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    /// Sets the name of the job.
    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// This method is semantically identical to `next()` but provides better readability
    /// when constructing the initial step of a job.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Builds the job. If no name has been provided, a random name is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
        }
    }
}
