use aws_config::meta::region::RegionProviderChain;
use aws_sdk_sfn::error::DisplayErrorContext;
use aws_sdk_sfn::primitives::DateTimeFormat;
use chain_lambda::adapters::orchestrator::{
    ExecutionReference, ExecutionStarter, StartExecutionRequest,
};
use chain_lambda::config::{TriggerConfig, DEFAULT_REGION};
use chain_lambda::handlers::trigger::{handle_trigger_event, ApiGatewayResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct SfnExecutionStarter {
    sfn_client: aws_sdk_sfn::Client,
}

impl ExecutionStarter for SfnExecutionStarter {
    fn start_execution(
        &self,
        request: &StartExecutionRequest,
    ) -> Result<ExecutionReference, String> {
        let client = self.sfn_client.clone();
        let request = request.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .start_execution()
                    .state_machine_arn(request.state_machine_arn)
                    .name(request.name)
                    .input(request.input)
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to start step functions execution: {}",
                            DisplayErrorContext(&error)
                        )
                    })?;

                let start_date = output
                    .start_date()
                    .fmt(DateTimeFormat::DateTime)
                    .map_err(|error| format!("failed to format execution start date: {error}"))?;

                Ok::<_, String>(ExecutionReference {
                    execution_arn: output.execution_arn().to_string(),
                    start_date,
                })
            })
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // required to enable CloudWatch error logging by the runtime
    lambda_runtime::tracing::init_default_subscriber();

    let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    let starter = SfnExecutionStarter {
        sfn_client: aws_sdk_sfn::Client::new(&aws_config),
    };
    let config = TriggerConfig::from_env();
    if config.state_machine_arn.is_none() {
        tracing::error!("STATE_MACHINE_ARN environment variable is not set");
    }

    let starter = &starter;
    let config = &config;
    lambda_runtime::run(service_fn(|event: LambdaEvent<Value>| async move {
        tracing::debug!(payload = %event.payload, "event received");
        Ok::<ApiGatewayResponse, Error>(handle_trigger_event(event.payload, config, starter))
    }))
    .await
}
