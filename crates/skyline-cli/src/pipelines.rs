//! The production pipeline definitions.
//!
//! Each builder assembles the chain for one deployed state machine. Function
//! references stay logical here; the caller supplies the resolver that turns
//! them into stable resource identifiers.

use std::num::NonZeroU32;

use skyline_sfn::prelude::*;

/// Iteration bound for the post-publisher event map.
const POST_PUBLISHER_CONCURRENCY: NonZeroU32 = NonZeroU32::new(2).unwrap();

/// A deployable Skyline pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Pipeline {
    /// Crawl ingestion: fetch crawler datasets and store every event.
    EventsProcessor,
    /// Scoring and enrichment of stored events, then search indexing.
    UpdatesProcessor,
    /// Periodic selection and publication of events to the social network.
    PostPublisher,
}

/// Builds the chain for the given pipeline.
pub fn build(pipeline: Pipeline, resolver: &dyn TargetResolver) -> GraphResult<Chain> {
    match pipeline {
        Pipeline::EventsProcessor => events_processor(resolver),
        Pipeline::UpdatesProcessor => updates_processor(resolver),
        Pipeline::PostPublisher => post_publisher(resolver),
    }
}

/// Selector lifting the invocation output into a `result` field.
fn lambda_result(selector: &str) -> PayloadTemplate {
    PayloadTemplate::new().path("result", selector)
}

/// Backoff applied to steps calling rate-limited upstreams.
fn standard_retry() -> RetryPolicy {
    RetryPolicy::new()
        .interval_seconds(10)
        .max_attempts(4)
        .backoff_rate(10.0)
        .max_delay_seconds(20)
}

/// Crawl ingestion: retrieve crawler datasets, then save each event to the
/// all-events table, strictly sequentially to respect table write limits.
fn events_processor(resolver: &dyn TargetResolver) -> GraphResult<Chain> {
    let retrieve = State::task(
        "RetrieveFromApifyLambda",
        TaskParams::lambda_invoke(resolver.resolve("RetrieveFromApifyFunction"))
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.RetrieveFromApify")
            .with_timeout_seconds(10),
    );

    let save = State::task(
        "SaveToAllLambda",
        TaskParams::lambda_invoke(resolver.resolve("SaveToAllFunction"))
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.RetrieveFromApify")
            .with_timeout_seconds(10),
    )
    .with_retry(standard_retry())?;

    let iterate = save.next(State::succeed("IterateSuccess"))?;
    let map = State::map(
        "IterateEventsMap",
        MapParams::new("$.RetrieveFromApify.result.events", iterate)
            .with_max_concurrency(NonZeroU32::MIN),
    );

    retrieve.next(map)?.next(State::pass("Finish"))
}

/// Scoring and enrichment: extract features for an updated event with the
/// language model, then process them into the search index.
fn updates_processor(resolver: &dyn TargetResolver) -> GraphResult<Chain> {
    let extract = State::task(
        "ExtractFeaturesLambda",
        TaskParams::lambda_invoke(resolver.resolve("ExtractFeaturesFunction"))
            .with_payload(PayloadTemplate::new().path("event", "$"))
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.ExtractFeatures")
            .with_timeout_seconds(10),
    )
    .with_retry(standard_retry())?;

    let process = State::task(
        "ProcessFeaturesLambda",
        TaskParams::lambda_invoke(resolver.resolve("ProcessFeaturesFunction"))
            .with_payload(
                PayloadTemplate::new()
                    .path("event", "$")
                    .path("eventScores", "$.ExtractFeatures.result.eventScores")
                    .path("eventHighlights", "$.ExtractFeatures.result.eventHighlights"),
            )
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.ProcessFeatures")
            .with_timeout_seconds(10),
    )
    .with_retry(standard_retry())?;

    extract.next(process)?.next(State::pass("Finish"))
}

/// Publication: select relevant events from the index, then per event
/// generate a post with the language model and send it to the social
/// network, two events in flight at a time.
fn post_publisher(resolver: &dyn TargetResolver) -> GraphResult<Chain> {
    let retrieve = State::task(
        "RetrieveRelevantEventsLambda",
        TaskParams::lambda_invoke(resolver.resolve("RetrieveRelevantEventsFunction"))
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.RetrieveRelevantEvents")
            .with_timeout_seconds(30),
    );

    let generate = State::task(
        "GenerateTweetEventLambda",
        TaskParams::lambda_invoke(resolver.resolve("GenerateTweetEventFunction"))
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.GenerateTweetEvent")
            .with_timeout_seconds(30),
    );

    let post = State::task(
        "PostTweetEventLambda",
        TaskParams::lambda_invoke(resolver.resolve("PostTweetEventFunction"))
            .with_payload(
                PayloadTemplate::new().path("tweetEvent", "$.GenerateTweetEvent.result.tweetEvent"),
            )
            .with_result_selector(lambda_result("$.Payload"))
            .with_result_path("$.PostTweetEvent")
            .with_timeout_seconds(30),
    )
    .with_retry(standard_retry())?;

    let iterate = generate.next(post)?;
    let map = State::map(
        "IterateEventsMap",
        MapParams::new("$.RetrieveRelevantEvents.result.events", iterate)
            .with_max_concurrency(POST_PUBLISHER_CONCURRENCY),
    );

    retrieve.next(map)?.next(State::pass("Finish"))
}

#[cfg(test)]
mod tests {
    use skyline_sfn::compile::compile;

    use super::*;

    fn resolver() -> PrefixResolver {
        PrefixResolver::new("arn:aws:lambda:us-east-1:0:function:")
    }

    #[test]
    fn every_pipeline_compiles() {
        for pipeline in [
            Pipeline::EventsProcessor,
            Pipeline::UpdatesProcessor,
            Pipeline::PostPublisher,
        ] {
            let chain = build(pipeline, &resolver()).expect("pipeline builds");
            compile(&chain).expect("pipeline compiles");
        }
    }

    #[test]
    fn events_processor_iterates_sequentially() {
        let chain = events_processor(&resolver()).expect("pipeline builds");
        let compiled = compile(&chain).expect("pipeline compiles");
        let value = serde_json::to_value(&compiled.definition).expect("definition serializes");

        assert_eq!(value["StartAt"], "RetrieveFromApifyLambda");
        assert_eq!(value["States"]["IterateEventsMap"]["MaxConcurrency"], 1);
        assert_eq!(
            value["States"]["IterateEventsMap"]["Iterator"]["StartAt"],
            "SaveToAllLambda"
        );
        assert_eq!(value["States"]["Finish"]["End"], true);
    }

    #[test]
    fn post_publisher_grants_one_permission_per_function() {
        let chain = post_publisher(&resolver()).expect("pipeline builds");
        let compiled = compile(&chain).expect("pipeline compiles");

        let resources: Vec<_> = compiled
            .permissions
            .statements()
            .iter()
            .flat_map(|p| p.resources().to_vec())
            .collect();
        assert_eq!(
            resources,
            [
                "arn:aws:lambda:us-east-1:0:function:RetrieveRelevantEventsFunction",
                "arn:aws:lambda:us-east-1:0:function:GenerateTweetEventFunction",
                "arn:aws:lambda:us-east-1:0:function:PostTweetEventFunction",
            ]
        );
    }

    #[test]
    fn updates_processor_passes_extracted_features_forward() {
        let chain = updates_processor(&resolver()).expect("pipeline builds");
        let compiled = compile(&chain).expect("pipeline compiles");
        let value = serde_json::to_value(&compiled.definition).expect("definition serializes");

        let payload = &value["States"]["ProcessFeaturesLambda"]["Parameters"]["Payload"];
        assert_eq!(payload["eventScores.$"], "$.ExtractFeatures.result.eventScores");
        assert_eq!(
            payload["eventHighlights.$"],
            "$.ExtractFeatures.result.eventHighlights"
        );
    }
}
