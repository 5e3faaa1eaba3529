use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::build_name;

/// Status of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step has been created but not started yet
    Starting,
    /// The step is running
    Started,
    /// The step completed successfully
    Success,
    /// The tasklet returned an error
    Failed,
}

/// Runtime information about one execution of a step.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step execution
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    pub duration: Option<Duration>,
    /// Number of times the tasklet has been invoked
    pub repeat_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: None,
            end_time: None,
            duration: None,
            repeat_count: 0,
        }
    }
}

/// A phase of a job.
pub trait Step {
    fn get_name(&self) -> &str;

    /// Executes the step, recording progress in `step_execution`.
    ///
    /// # Returns
    /// - `Ok(())`: The step completed successfully
    /// - `Err(BatchError)`: The step failed
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}

/// Tells a tasklet step whether to call the tasklet again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet can continue to execute.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// A single task run by a [`TaskletStep`], as opposed to item-by-item processing.
pub trait Tasklet {
    fn execute(&self, step_execution: &StepExecution) -> Result<RepeatStatus, BatchError>;
}

/// A step running a tasklet until it reports [`RepeatStatus::Finished`].
pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl Step for TaskletStep<'_> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.start_time = Some(start_time);
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = loop {
            step_execution.repeat_count += 1;

            match self.tasklet.execute(step_execution) {
                Ok(RepeatStatus::Continuable) => {
                    debug!("Tasklet of step {} continues", step_execution.name);
                }
                Ok(RepeatStatus::Finished) => break Ok(()),
                Err(error) => {
                    warn!("Error in step {}: {}", step_execution.name, error);
                    break Err(BatchError::Step(format!("{}: {}", self.name, error)));
                }
            }
        };

        step_execution.status = if result.is_ok() {
            StepStatus::Success
        } else {
            StepStatus::Failed
        };
        step_execution.end_time = Some(Instant::now());
        step_execution.duration = Some(start_time.elapsed());

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        result
    }
}

/// Entry point for building steps.
///
/// # Examples
///
/// ```
/// use markup_batch_rs::core::step::{RepeatStatus, Step, StepBuilder, StepExecution, StepStatus, Tasklet};
/// use markup_batch_rs::BatchError;
///
/// struct Hello;
///
/// impl Tasklet for Hello {
///     fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
///         Ok(RepeatStatus::Finished)
///     }
/// }
///
/// let step = StepBuilder::new("hello").tasklet(&Hello).build();
///
/// let mut step_execution = StepExecution::new(step.get_name());
/// step.execute(&mut step_execution).unwrap();
/// assert_eq!(step_execution.status, StepStatus::Success);
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Steps created without a name get a random one.
    pub fn unnamed() -> Self {
        Self { name: build_name() }
    }

    pub fn tasklet(self, tasklet: &dyn Tasklet) -> TaskletStepBuilder<'_> {
        TaskletStepBuilder {
            name: self.name,
            tasklet,
        }
    }
}

pub struct TaskletStepBuilder<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl<'a> TaskletStepBuilder<'a> {
    pub fn build(self) -> TaskletStep<'a> {
        TaskletStep {
            name: self.name,
            tasklet: self.tasklet,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingTasklet {
        calls: Cell<usize>,
        finish_after: usize,
    }

    impl Tasklet for CountingTasklet {
        fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() >= self.finish_after {
                Ok(RepeatStatus::Finished)
            } else {
                Ok(RepeatStatus::Continuable)
            }
        }
    }

    struct FailingTasklet;

    impl Tasklet for FailingTasklet {
        fn execute(&self, _step_execution: &StepExecution) -> Result<RepeatStatus, BatchError> {
            Err(BatchError::Register("boom".to_string()))
        }
    }

    #[test]
    fn tasklet_step_repeats_until_finished() {
        let tasklet = CountingTasklet {
            calls: Cell::new(0),
            finish_after: 3,
        };
        let step = StepBuilder::new("count").tasklet(&tasklet).build();
        let mut step_execution = StepExecution::new(step.get_name());

        step.execute(&mut step_execution).unwrap();

        assert_eq!(tasklet.calls.get(), 3);
        assert_eq!(step_execution.repeat_count, 3);
        assert_eq!(step_execution.status, StepStatus::Success);
        assert!(step_execution.duration.is_some());
    }

    #[test]
    fn failing_tasklet_marks_step_failed() {
        let step = StepBuilder::new("fail").tasklet(&FailingTasklet).build();
        let mut step_execution = StepExecution::new(step.get_name());

        let result = step.execute(&mut step_execution);

        match result {
            Err(BatchError::Step(message)) => {
                assert!(message.starts_with("fail"));
                assert!(message.contains("boom"));
            }
            other => panic!("Expected step error, got {:?}", other),
        }
        assert_eq!(step_execution.status, StepStatus::Failed);
        assert!(step_execution.end_time.is_some());
    }

    #[test]
    fn unnamed_step_gets_random_name() {
        let step = StepBuilder::unnamed().tasklet(&FailingTasklet).build();

        assert_eq!(step.get_name().len(), 8);
    }
}
