#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartExecutionRequest {
    pub state_machine_arn: String,
    pub name: String,
    pub input: String,
}

/// Reference returned by the orchestrator once an execution is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReference {
    pub execution_arn: String,
    pub start_date: String,
}

pub trait ExecutionStarter {
    fn start_execution(
        &self,
        request: &StartExecutionRequest,
    ) -> Result<ExecutionReference, String>;
}
